// src/common/settings.rs

//! Sensor configuration vocabulary: bus address, oversampling, IIR filter,
//! standby time and power mode, with the register encodings the device
//! expects.

use super::error::UplinkError;
use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// 7-bit I2C address of the sensor.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusAddress(u8);

impl BusAddress {
    /// SDO pulled low.
    pub const PRIMARY: BusAddress = BusAddress(0x76);
    /// SDO pulled high.
    pub const SECONDARY: BusAddress = BusAddress(0x77);

    /// Creates a new `BusAddress` if `address` fits in 7 bits.
    pub fn new(address: u8) -> Result<Self, UplinkError> {
        if address <= 0x7F {
            Ok(BusAddress(address))
        } else {
            Err(UplinkError::InvalidBusAddress(address))
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl Default for BusAddress {
    fn default() -> Self {
        Self::PRIMARY
    }
}

impl TryFrom<u8> for BusAddress {
    type Error = UplinkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BusAddress> for u8 {
    fn from(value: BusAddress) -> Self {
        value.0
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Oversampling ratio for one measurement channel.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// Channel disabled; the sensor reports a fixed placeholder value.
    Skipped = 0,
    #[default]
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

/// IIR filter coefficient applied to temperature and pressure.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Filter {
    #[default]
    Off = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
    X16 = 4,
}

/// Inactive period between measurements in normal mode.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StandbyTime {
    #[default]
    Ms0_5 = 0,
    Ms62_5 = 1,
    Ms125 = 2,
    Ms250 = 3,
    Ms500 = 4,
    Ms1000 = 5,
    Ms10 = 6,
    Ms20 = 7,
}

impl StandbyTime {
    /// Nominal duration in microseconds.
    pub const fn as_micros(&self) -> u32 {
        match self {
            StandbyTime::Ms0_5 => 500,
            StandbyTime::Ms62_5 => 62_500,
            StandbyTime::Ms125 => 125_000,
            StandbyTime::Ms250 => 250_000,
            StandbyTime::Ms500 => 500_000,
            StandbyTime::Ms1000 => 1_000_000,
            StandbyTime::Ms10 => 10_000,
            StandbyTime::Ms20 => 20_000,
        }
    }
}

/// Sensor power mode.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SensorMode {
    #[default]
    Sleep = 0,
    /// One measurement, then back to sleep.
    Forced = 1,
    /// Continuous measurements separated by the standby time.
    Normal = 3,
}

impl SensorMode {
    /// Tries to convert a mode register value into a `SensorMode`.
    /// Both `0b01` and `0b10` select forced mode on the device.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SensorMode::Sleep),
            1 | 2 => Some(SensorMode::Forced),
            3 => Some(SensorMode::Normal),
            _ => None,
        }
    }
}

/// Full set of sensor settings held by the poller.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSettings {
    pub osr_temperature: Oversampling,
    pub osr_pressure: Oversampling,
    pub osr_humidity: Oversampling,
    pub filter: Filter,
    pub standby: StandbyTime,
}

impl SensorSettings {
    /// Low-rate weather monitoring profile: 1x oversampling, filter off.
    pub const WEATHER_MONITORING: SensorSettings = SensorSettings {
        osr_temperature: Oversampling::X1,
        osr_pressure: Oversampling::X1,
        osr_humidity: Oversampling::X1,
        filter: Filter::Off,
        standby: StandbyTime::Ms1000,
    };

    /// Indoor navigation profile: heavy pressure oversampling and filtering.
    pub const INDOOR_NAVIGATION: SensorSettings = SensorSettings {
        osr_temperature: Oversampling::X2,
        osr_pressure: Oversampling::X16,
        osr_humidity: Oversampling::X1,
        filter: Filter::X16,
        standby: StandbyTime::Ms0_5,
    };
}

/// Selects which fields of [`SensorSettings`] a settings write touches.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingsMask(u8);

impl SettingsMask {
    pub const NONE: SettingsMask = SettingsMask(0);
    pub const OSR_PRESSURE: SettingsMask = SettingsMask(1);
    pub const OSR_TEMPERATURE: SettingsMask = SettingsMask(1 << 1);
    pub const OSR_HUMIDITY: SettingsMask = SettingsMask(1 << 2);
    pub const FILTER: SettingsMask = SettingsMask(1 << 3);
    pub const STANDBY: SettingsMask = SettingsMask(1 << 4);
    pub const ALL: SettingsMask = SettingsMask(0x1F);

    /// Builds a mask from raw bits, dropping any undefined ones.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        SettingsMask(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(&self, other: SettingsMask) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if any oversampling field is selected.
    pub const fn touches_oversampling(&self) -> bool {
        self.0 & (Self::OSR_PRESSURE.0 | Self::OSR_TEMPERATURE.0 | Self::OSR_HUMIDITY.0) != 0
    }
}

impl BitOr for SettingsMask {
    type Output = SettingsMask;

    fn bitor(self, rhs: SettingsMask) -> SettingsMask {
        SettingsMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for SettingsMask {
    fn bitor_assign(&mut self, rhs: SettingsMask) {
        self.0 |= rhs.0;
    }
}
