// src/common/error.rs

use super::telemetry::StatusCode;

/// Every failure the poller and publisher can report.
///
/// `E` is the bus collaborator's error type. Errors that cannot involve the
/// bus (configuration validation, remote rejections) use the default `E = ()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UplinkError<E = ()>
where
    E: core::fmt::Debug, // Need Debug for the generic bus error
{
    /// The sensor did not acknowledge initialization. Fatal at startup.
    #[error("sensor initialization failed: {0:?}")]
    Init(E),

    /// The sensor rejected a settings or mode change.
    #[error("sensor rejected configuration: {0:?}")]
    Config(E),

    /// A single sampling cycle failed. The next cycle is unaffected.
    #[error("sensor read failed: {0:?}")]
    Read(E),

    /// The remote channel rejected the write, or the transport failed.
    /// The code is surfaced verbatim.
    #[error("publish failed with status {0}")]
    Publish(StatusCode),

    /// Bus address outside the 7-bit range.
    #[error("invalid bus address: {0:#04x}")]
    InvalidBusAddress(u8),

    /// Remote field slot outside 1..=8.
    #[error("invalid field index: {0}")]
    InvalidFieldIndex(u8),

    /// Two quantities were mapped onto the same remote field.
    #[error("field index {0} mapped more than once")]
    DuplicateFieldIndex(u8),

    /// Credential token empty or longer than the storage allows.
    #[error("invalid API key length {len} (max {max})")]
    InvalidApiKey { len: usize, max: usize },
}

impl<E: core::fmt::Debug> UplinkError<E> {
    /// Returns `true` for failures that should abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UplinkError::Init(_))
    }

    /// The raw remote status code, if this is a publish failure.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            UplinkError::Publish(code) => Some(*code),
            _ => None,
        }
    }

    /// Converts the bus error type, mapping bus-carrying variants through `f`.
    pub fn map_bus<F, E2>(self, f: F) -> UplinkError<E2>
    where
        F: FnOnce(E) -> E2,
        E2: core::fmt::Debug,
    {
        match self {
            UplinkError::Init(e) => UplinkError::Init(f(e)),
            UplinkError::Config(e) => UplinkError::Config(f(e)),
            UplinkError::Read(e) => UplinkError::Read(f(e)),
            UplinkError::Publish(code) => UplinkError::Publish(code),
            UplinkError::InvalidBusAddress(a) => UplinkError::InvalidBusAddress(a),
            UplinkError::InvalidFieldIndex(i) => UplinkError::InvalidFieldIndex(i),
            UplinkError::DuplicateFieldIndex(i) => UplinkError::DuplicateFieldIndex(i),
            UplinkError::InvalidApiKey { len, max } => UplinkError::InvalidApiKey { len, max },
        }
    }
}

// Classify native I2C failures (e.g. the device NACKing its address).
#[cfg(feature = "impl-native")]
impl<E: embedded_hal::i2c::Error> UplinkError<E> {
    /// The embedded-hal error kind behind a bus-carrying variant.
    pub fn i2c_kind(&self) -> Option<embedded_hal::i2c::ErrorKind> {
        match self {
            UplinkError::Init(e) | UplinkError::Config(e) | UplinkError::Read(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Returns `true` if the device did not acknowledge.
    pub fn is_no_acknowledge(&self) -> bool {
        matches!(
            self.i2c_kind(),
            Some(embedded_hal::i2c::ErrorKind::NoAcknowledge(_))
        )
    }
}
