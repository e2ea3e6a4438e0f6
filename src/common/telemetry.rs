// src/common/telemetry.rs

//! Remote channel vocabulary: field slots, the quantity-to-field mapping,
//! channel and credential identifiers, and the status codes a write returns.

use super::error::UplinkError;
use super::measurement::Quantity;
use core::fmt;

/// Number of field slots a remote channel offers.
pub const MAX_FIELDS: u8 = 8;
/// Longest credential token accepted.
pub const API_KEY_CAPACITY: usize = 32;

/// One field slot (1-based) on the remote channel.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldIndex(u8);

impl FieldIndex {
    /// Creates a new `FieldIndex` if `index` is within `1..=MAX_FIELDS`.
    pub fn new(index: u8) -> Result<Self, UplinkError> {
        if (1..=MAX_FIELDS).contains(&index) {
            Ok(FieldIndex(index))
        } else {
            Err(UplinkError::InvalidFieldIndex(index))
        }
    }

    #[inline]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for FieldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field{}", self.0)
    }
}

/// Binds each measured quantity to a field slot of the remote channel schema.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldMap {
    temperature: FieldIndex,
    humidity: FieldIndex,
    pressure: FieldIndex,
}

impl FieldMap {
    /// Builds a mapping; each quantity must get its own slot.
    pub fn new(temperature: u8, humidity: u8, pressure: u8) -> Result<Self, UplinkError> {
        let temperature = FieldIndex::new(temperature)?;
        let humidity = FieldIndex::new(humidity)?;
        let pressure = FieldIndex::new(pressure)?;

        if temperature == humidity || temperature == pressure {
            return Err(UplinkError::DuplicateFieldIndex(temperature.get()));
        }
        if humidity == pressure {
            return Err(UplinkError::DuplicateFieldIndex(humidity.get()));
        }

        Ok(FieldMap {
            temperature,
            humidity,
            pressure,
        })
    }

    pub const fn field_for(&self, quantity: Quantity) -> FieldIndex {
        match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
            Quantity::Pressure => self.pressure,
        }
    }
}

impl Default for FieldMap {
    /// Temperature on field 1, humidity on 2, pressure on 3.
    fn default() -> Self {
        FieldMap {
            temperature: FieldIndex(1),
            humidity: FieldIndex(2),
            pressure: FieldIndex(3),
        }
    }
}

/// Identifier of the remote channel receiving writes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub u32);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Write credential for the remote channel.
///
/// `Debug` is implemented by hand so the token never ends up in logs.
#[derive(Clone, Eq, PartialEq)]
pub struct ApiKey(heapless::String<API_KEY_CAPACITY>);

impl ApiKey {
    pub fn new(token: &str) -> Result<Self, UplinkError> {
        let invalid = UplinkError::InvalidApiKey {
            len: token.len(),
            max: API_KEY_CAPACITY,
        };
        if token.is_empty() {
            return Err(invalid);
        }
        let mut buf = heapless::String::new();
        buf.push_str(token).map_err(|_| invalid)?;
        Ok(ApiKey(buf))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Result code of a remote write, passed through verbatim.
///
/// `0` is reserved for "no write attempted". Positive values mirror HTTP
/// status codes; negative values are transport-side failures.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const SKIPPED: StatusCode = StatusCode(0);
    pub const OK_SUCCESS: StatusCode = StatusCode(200);
    pub const BAD_API_KEY: StatusCode = StatusCode(400);
    pub const BAD_URL: StatusCode = StatusCode(404);
    pub const OUT_OF_RANGE: StatusCode = StatusCode(-101);
    pub const INVALID_FIELD_NUM: StatusCode = StatusCode(-201);
    pub const SETFIELD_NOT_CALLED: StatusCode = StatusCode(-210);
    pub const CONNECT_FAILED: StatusCode = StatusCode(-301);
    pub const UNEXPECTED_FAIL: StatusCode = StatusCode(-302);
    pub const BAD_RESPONSE: StatusCode = StatusCode(-303);
    pub const TIMEOUT: StatusCode = StatusCode(-304);
    pub const NOT_INSERTED: StatusCode = StatusCode(-401);

    #[inline]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Human-readable meaning of the well-known codes.
    pub const fn describe(&self) -> &'static str {
        match self.0 {
            0 => "skipped",
            200 => "ok",
            400 => "incorrect API key or invalid request",
            404 => "incorrect server address",
            -101 => "value out of range or not a number",
            -201 => "invalid field number",
            -210 => "no field set before write",
            -301 => "failed to connect",
            -302 => "unexpected failure during write",
            -303 => "unable to parse response",
            -304 => "timeout waiting for server",
            -401 => "point was not inserted",
            _ => "unknown status",
        }
    }
}

impl From<i32> for StatusCode {
    fn from(value: i32) -> Self {
        StatusCode(value)
    }
}

impl From<StatusCode> for i32 {
    fn from(value: StatusCode) -> Self {
        value.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
