// src/uplink.rs

//! Composes one [`SensorPoller`] and one [`TelemetryPublisher`] around a
//! shared measurement record, the way a firmware main loop drives them.

use crate::common::{
    error::UplinkError,
    hal_traits::{MeasurementSink, MillisClock, SensorBus, TelemetryTransport},
    measurement::Measurement,
    timing::Millis,
};
use crate::poller::{PollOutcome, SensorPoller};
use crate::publisher::{PublishOutcome, TelemetryPublisher};
use core::fmt::Debug;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport<E: Debug> {
    pub poll: Result<PollOutcome, UplinkError<E>>,
    /// `None` when publishing was suppressed because no valid sample exists.
    pub publish: Option<Result<PublishOutcome, UplinkError>>,
}

impl<E: Debug> TickReport<E> {
    /// Returns `true` if the sensor was read successfully this tick.
    pub fn sampled(&self) -> bool {
        matches!(self.poll, Ok(PollOutcome::Sampled))
    }

    /// Returns `true` if the remote accepted a write this tick.
    pub fn published(&self) -> bool {
        matches!(self.publish, Some(Ok(PublishOutcome::Accepted(_))))
    }
}

/// Owns both components plus the measurement they share.
///
/// Each tick polls first and publishes second, so the publisher always sees
/// the freshest sample available at that tick. After a failed read the
/// record is invalid and nothing is published until a read succeeds again;
/// the publisher's interval is not consumed while suppressed.
pub struct Uplink<B, T, S = ()>
where
    B: SensorBus,
    T: TelemetryTransport,
    S: MeasurementSink,
{
    poller: SensorPoller<B, S>,
    publisher: TelemetryPublisher<T>,
    measurement: Measurement,
    valid: bool,
}

impl<B, T, S> Uplink<B, T, S>
where
    B: SensorBus,
    T: TelemetryTransport,
    S: MeasurementSink,
{
    pub fn new(poller: SensorPoller<B, S>, publisher: TelemetryPublisher<T>) -> Self {
        Uplink {
            poller,
            publisher,
            measurement: Measurement::default(),
            valid: false,
        }
    }

    /// Runs one iteration of the driving loop at time `now`.
    pub fn tick(&mut self, now: Millis) -> TickReport<B::Error> {
        let poll = self.poller.poll(&mut self.measurement, now);
        match poll {
            Ok(PollOutcome::Sampled) => self.valid = true,
            Ok(PollOutcome::Skipped) => {}
            Err(_) => self.valid = false,
        }

        let publish = if self.valid {
            Some(self.publisher.publish(&self.measurement, now))
        } else {
            debug!("no valid sample at {=u32} ms, publish suppressed", now.as_u32());
            None
        };

        TickReport { poll, publish }
    }

    /// Reads `clock` and runs one tick.
    pub fn step<C: MillisClock>(&mut self, clock: &C) -> TickReport<B::Error> {
        self.tick(clock.now())
    }

    /// The latest sample, if the last read attempt succeeded.
    pub fn measurement(&self) -> Option<&Measurement> {
        self.valid.then_some(&self.measurement)
    }

    pub fn poller(&self) -> &SensorPoller<B, S> {
        &self.poller
    }

    /// Mutable access, e.g. to change sensor settings between ticks.
    pub fn poller_mut(&mut self) -> &mut SensorPoller<B, S> {
        &mut self.poller
    }

    pub fn publisher(&self) -> &TelemetryPublisher<T> {
        &self.publisher
    }

    pub fn into_parts(self) -> (SensorPoller<B, S>, TelemetryPublisher<T>) {
        (self.poller, self.publisher)
    }
}
