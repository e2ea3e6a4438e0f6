// src/common/measurement.rs

use arrayvec::ArrayString;
use core::fmt::{self, Write};

/// Fixed-capacity buffer holding one human-readable status line.
/// 64 bytes covers the widest value each scaled field can hold.
pub type StatusLine = ArrayString<64>;

/// The three physical quantities a sample carries, in publish order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    Temperature,
    Humidity,
    Pressure,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::Temperature, Quantity::Humidity, Quantity::Pressure];

    /// Divisor turning the scaled integer into physical units.
    pub const fn scale(&self) -> u32 {
        match self {
            Quantity::Temperature => 100,
            Quantity::Humidity => 1024,
            Quantity::Pressure => 1000,
        }
    }

    pub const fn unit(&self) -> &'static str {
        match self {
            Quantity::Temperature => "degree",
            Quantity::Humidity => "%",
            Quantity::Pressure => "Pa",
        }
    }

    /// Short label used on the status line.
    pub const fn label(&self) -> &'static str {
        match self {
            Quantity::Temperature => "T",
            Quantity::Humidity => "H",
            Quantity::Pressure => "P",
        }
    }
}

/// One sample from the sensor, kept in the sensor's scaled integer form.
///
/// - `temperature`: hundredths of a degree
/// - `humidity`: 1/1024 of a percent
/// - `pressure`: thousandths of a pascal
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub temperature: i32,
    pub humidity: u32,
    pub pressure: u32,
}

impl Measurement {
    pub const fn new(temperature: i32, humidity: u32, pressure: u32) -> Self {
        Measurement {
            temperature,
            humidity,
            pressure,
        }
    }

    /// The raw scaled value for `quantity`, widened to `i64`.
    pub const fn raw(&self, quantity: Quantity) -> i64 {
        match quantity {
            Quantity::Temperature => self.temperature as i64,
            Quantity::Humidity => self.humidity as i64,
            Quantity::Pressure => self.pressure as i64,
        }
    }

    /// The value for `quantity` in physical units.
    pub fn physical(&self, quantity: Quantity) -> f32 {
        self.raw(quantity) as f32 / quantity.scale() as f32
    }

    pub fn temperature_celsius(&self) -> f32 {
        self.physical(Quantity::Temperature)
    }

    pub fn humidity_percent(&self) -> f32 {
        self.physical(Quantity::Humidity)
    }

    pub fn pressure_pa(&self) -> f32 {
        self.physical(Quantity::Pressure)
    }

    /// Renders the status line without touching the heap.
    pub fn status_line(&self) -> StatusLine {
        let mut line = StatusLine::new();
        // Cannot overflow: see `StatusLine`.
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, quantity) in Quantity::ALL.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(
                f,
                "{}: {:.2} {}",
                quantity.label(),
                self.physical(*quantity),
                quantity.unit()
            )?;
        }
        Ok(())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_to_physical() {
        let m = Measurement::new(2500, 51200, 101_325_000);
        assert_eq!(m.temperature_celsius(), 25.0);
        assert_eq!(m.humidity_percent(), 50.0);
        assert_eq!(m.pressure_pa(), 101_325.0);
    }

    #[test]
    fn test_negative_temperature() {
        let m = Measurement::new(-1050, 0, 0);
        assert_eq!(m.temperature_celsius(), -10.5);
    }

    #[test]
    fn test_status_line_format() {
        let m = Measurement::new(2500, 51200, 101_325_000);
        assert_eq!(
            m.status_line().as_str(),
            "T: 25.00 degree H: 50.00 % P: 101325.00 Pa"
        );
    }

    #[test]
    fn test_status_line_fits_extremes() {
        let m = Measurement::new(i32::MIN, u32::MAX, u32::MAX);
        let line = m.status_line();
        assert!(line.ends_with(" Pa"));
        assert!(line.starts_with("T: -"));
    }

    #[test]
    fn test_quantity_order_and_scale() {
        assert_eq!(Quantity::ALL[0], Quantity::Temperature);
        assert_eq!(Quantity::ALL[2], Quantity::Pressure);
        assert_eq!(Quantity::Humidity.scale(), 1024);
        assert_eq!(Measurement::new(7, 8, 9).raw(Quantity::Pressure), 9);
    }
}
