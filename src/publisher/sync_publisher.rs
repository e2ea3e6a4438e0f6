// src/publisher/sync_publisher.rs

use crate::common::{
    error::UplinkError,
    hal_traits::TelemetryTransport,
    measurement::{Measurement, Quantity},
    telemetry::{ApiKey, ChannelId, FieldMap, StatusCode},
    timing::{IntervalGate, Millis, DEFAULT_PUBLISH_INTERVAL_SECS},
};

/// What a successful call to [`TelemetryPublisher::publish`] did.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishOutcome {
    /// Interval not elapsed; nothing was sent.
    Skipped,
    /// The remote accepted the write with this code.
    Accepted(StatusCode),
}

impl PublishOutcome {
    /// The raw status: `0` when skipped, the success code otherwise.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            PublishOutcome::Skipped => StatusCode::SKIPPED,
            PublishOutcome::Accepted(code) => *code,
        }
    }
}

/// Flattens a publish result into the single integer status convention:
/// `0` skipped, the success code when accepted, anything else is the
/// remote or transport error code.
pub fn status_code_of(result: &Result<PublishOutcome, UplinkError>) -> StatusCode {
    match result {
        Ok(outcome) => outcome.status_code(),
        Err(e) => e.status_code().unwrap_or(StatusCode::UNEXPECTED_FAIL),
    }
}

/// Ships the current measurement to a remote channel no more often than a
/// configured interval.
///
/// Every attempt is stamped, successful or not, and nothing is retried. A
/// failing endpoint is therefore contacted at most once per interval.
#[derive(Debug)]
pub struct TelemetryPublisher<T>
where
    T: TelemetryTransport,
{
    transport: T,
    api_key: ApiKey,
    channel: ChannelId,
    fields: FieldMap,
    gate: IntervalGate,
}

impl<T> TelemetryPublisher<T>
where
    T: TelemetryTransport,
{
    /// Stores the publishing parameters and starts the transport session.
    ///
    /// Uses the default [`FieldMap`]; see [`with_field_map`](Self::with_field_map).
    pub fn configure(
        mut transport: T,
        connection: T::Connection,
        api_key: ApiKey,
        channel: ChannelId,
        interval_secs: u32,
    ) -> Self {
        transport.begin_session(connection);
        debug!(
            "publishing to channel {=u32} every {=u32} s",
            channel.0,
            interval_secs
        );

        TelemetryPublisher {
            transport,
            api_key,
            channel,
            fields: FieldMap::default(),
            gate: IntervalGate::from_secs(interval_secs),
        }
    }

    /// Same as [`configure`](Self::configure) with the five-minute default cadence.
    pub fn configure_default_interval(
        transport: T,
        connection: T::Connection,
        api_key: ApiKey,
        channel: ChannelId,
    ) -> Self {
        Self::configure(transport, connection, api_key, channel, DEFAULT_PUBLISH_INTERVAL_SECS)
    }

    /// Replaces the quantity-to-field mapping.
    pub fn with_field_map(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    /// Sends `measurement` if the interval has elapsed.
    ///
    /// All three quantities are converted to physical units, staged on
    /// their mapped fields and written in one request. The attempt is
    /// stamped whatever the outcome; a rejected write comes back as
    /// [`UplinkError::Publish`] carrying the remote code verbatim.
    pub fn publish(&mut self, measurement: &Measurement, now: Millis) -> Result<PublishOutcome, UplinkError> {
        if !self.gate.is_due(now) {
            return Ok(PublishOutcome::Skipped);
        }

        for quantity in Quantity::ALL {
            self.transport
                .set_field(self.fields.field_for(quantity), measurement.physical(quantity));
        }
        let code = self.transport.write_fields(self.channel, &self.api_key);
        self.gate.stamp(now);

        if code == T::SUCCESS {
            trace!("channel {=u32} accepted update", self.channel.0);
            Ok(PublishOutcome::Accepted(code))
        } else {
            warn!(
                "channel {=u32} update failed: {=i32} ({=str})",
                self.channel.0,
                code.as_i32(),
                code.describe()
            );
            Err(UplinkError::Publish(code))
        }
    }

    /// Returns `true` if the next [`publish`](Self::publish) at `now` would send.
    #[inline]
    pub fn is_due(&self, now: Millis) -> bool {
        self.gate.is_due(now)
    }

    /// Time of the last attempted write, `None` before the first one.
    #[inline]
    pub fn last_updated(&self) -> Option<Millis> {
        self.gate.last_updated()
    }

    #[inline]
    pub fn interval_millis(&self) -> u32 {
        self.gate.interval_millis()
    }

    #[inline]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    #[inline]
    pub fn field_map(&self) -> &FieldMap {
        &self.fields
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gives back the transport.
    pub fn release(self) -> T {
        self.transport
    }
}
