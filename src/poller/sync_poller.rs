// src/poller/sync_poller.rs

use crate::common::{
    error::UplinkError,
    hal_traits::{MeasurementSink, SensorBus},
    measurement::Measurement,
    settings::{BusAddress, SensorMode, SensorSettings, SettingsMask},
    timing::{IntervalGate, Millis},
};

/// What a call to [`SensorPoller::poll`] did.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// Interval not elapsed; neither the measurement nor the timestamp changed.
    Skipped,
    /// A bus transaction ran and the measurement was overwritten.
    Sampled,
}

impl PollOutcome {
    #[inline]
    pub const fn is_sampled(&self) -> bool {
        matches!(self, PollOutcome::Sampled)
    }
}

/// Samples the sensor no more often than a configured interval.
///
/// Owns the bus and the device handle exclusively. A poller can only be
/// obtained through [`SensorPoller::configure`], so there is no way to
/// poll an uninitialized device.
#[derive(Debug)]
pub struct SensorPoller<B, S = ()>
where
    B: SensorBus,
    S: MeasurementSink,
{
    bus: B,
    handle: B::Handle,
    settings: SensorSettings,
    gate: IntervalGate,
    sink: S,
}

impl<B> SensorPoller<B, ()>
where
    B: SensorBus,
{
    /// Creates the device handle for `address` and initializes the sensor.
    ///
    /// `settings` travel with the handle; push them to the device with
    /// [`apply_settings`](Self::apply_settings).
    pub fn configure(
        mut bus: B,
        address: BusAddress,
        settings: SensorSettings,
        interval_millis: u32,
    ) -> Result<Self, UplinkError<B::Error>> {
        let mut handle = bus.create_device_handle(address, settings);
        if let Err(e) = bus.init(&mut handle) {
            error!("sensor at {=u8:#x} did not acknowledge init", address.as_u8());
            return Err(UplinkError::Init(e));
        }
        debug!(
            "sensor at {=u8:#x} ready, sampling every {=u32} ms",
            address.as_u8(),
            interval_millis
        );

        Ok(SensorPoller {
            bus,
            handle,
            settings,
            gate: IntervalGate::new(interval_millis),
            sink: (),
        })
    }
}

impl<B, S> SensorPoller<B, S>
where
    B: SensorBus,
    S: MeasurementSink,
{
    /// Attaches a consumer that sees every successful sample.
    pub fn with_sink<S2: MeasurementSink>(self, sink: S2) -> SensorPoller<B, S2> {
        SensorPoller {
            bus: self.bus,
            handle: self.handle,
            settings: self.settings,
            gate: self.gate,
            sink,
        }
    }

    /// Pushes the stored settings selected by `mask` to the sensor.
    pub fn apply_settings(&mut self, mask: SettingsMask) -> Result<(), UplinkError<B::Error>> {
        self.bus
            .set_settings(&mut self.handle, &self.settings, mask)
            .map_err(|e| {
                warn!("sensor rejected settings mask {=u8:#x}", mask.bits());
                UplinkError::Config(e)
            })
    }

    /// Replaces the stored settings and pushes the fields selected by `mask`.
    ///
    /// If the sensor rejects them the previous settings are kept.
    pub fn set_settings(
        &mut self,
        settings: SensorSettings,
        mask: SettingsMask,
    ) -> Result<(), UplinkError<B::Error>> {
        self.bus
            .set_settings(&mut self.handle, &settings, mask)
            .map_err(|e| {
                warn!("sensor rejected settings mask {=u8:#x}", mask.bits());
                UplinkError::Config(e)
            })?;
        self.settings = settings;
        Ok(())
    }

    /// Switches the sensor's power mode.
    pub fn apply_mode(&mut self, mode: SensorMode) -> Result<(), UplinkError<B::Error>> {
        self.bus.set_mode(&mut self.handle, mode).map_err(|e| {
            warn!("sensor rejected mode {=u8}", mode as u8);
            UplinkError::Config(e)
        })
    }

    /// Samples the sensor into `out` if the interval has elapsed.
    ///
    /// The timestamp is stamped as soon as the bus transaction finishes,
    /// before its result is inspected, so a failing sensor is retried only
    /// on the next interval. On `Err` the contents of `out` must not be
    /// treated as a valid sample.
    pub fn poll(&mut self, out: &mut Measurement, now: Millis) -> Result<PollOutcome, UplinkError<B::Error>> {
        if !self.gate.is_due(now) {
            return Ok(PollOutcome::Skipped);
        }

        let result = nb::block!(self.bus.read_all(&mut self.handle));
        self.gate.stamp(now);

        let sample = match result {
            Ok(sample) => sample,
            Err(e) => {
                warn!("sensor read failed at {=u32} ms", now.as_u32());
                return Err(UplinkError::Read(e));
            }
        };

        *out = sample;
        info!("{=str}", sample.status_line().as_str());
        self.sink.on_measurement(out);

        Ok(PollOutcome::Sampled)
    }

    /// Returns `true` if the next [`poll`](Self::poll) at `now` would sample.
    #[inline]
    pub fn is_due(&self, now: Millis) -> bool {
        self.gate.is_due(now)
    }

    /// Time of the last attempted read, `None` before the first one.
    #[inline]
    pub fn last_updated(&self) -> Option<Millis> {
        self.gate.last_updated()
    }

    #[inline]
    pub fn interval_millis(&self) -> u32 {
        self.gate.interval_millis()
    }

    #[inline]
    pub fn settings(&self) -> &SensorSettings {
        &self.settings
    }

    #[inline]
    pub fn handle(&self) -> &B::Handle {
        &self.handle
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Gives back the bus and device handle.
    pub fn release(self) -> (B, B::Handle) {
        (self.bus, self.handle)
    }
}
