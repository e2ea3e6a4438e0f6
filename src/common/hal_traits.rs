// src/common/hal_traits.rs

use super::measurement::Measurement;
use super::settings::{BusAddress, SensorMode, SensorSettings, SettingsMask};
use super::telemetry::{ApiKey, ChannelId, FieldIndex, StatusCode};
use super::timing::Millis;
use core::fmt::{Debug, Write};

/// Abstraction over the sensor driver and the bus it sits on.
///
/// Register access, calibration and raw-to-scaled conversion live behind
/// this trait. The poller only decides *when* to call it.
pub trait SensorBus {
    /// Associated error type for bus and device errors.
    type Error: Debug;

    /// Per-device state (address, calibration, cached settings).
    /// Owned by the poller for its whole lifetime.
    type Handle;

    /// Builds the device handle. Does not talk to the device.
    fn create_device_handle(&mut self, address: BusAddress, settings: SensorSettings) -> Self::Handle;

    /// Probes the device and loads its calibration.
    fn init(&mut self, handle: &mut Self::Handle) -> Result<(), Self::Error>;

    /// Writes the fields of `settings` selected by `mask` to the device.
    fn set_settings(
        &mut self,
        handle: &mut Self::Handle,
        settings: &SensorSettings,
        mask: SettingsMask,
    ) -> Result<(), Self::Error>;

    /// Changes the power mode.
    fn set_mode(&mut self, handle: &mut Self::Handle, mode: SensorMode) -> Result<(), Self::Error>;

    /// Attempts to read all three channels.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while a conversion is still in
    /// progress. Other errors are returned as `Err(nb::Error::Other(Self::Error))`.
    fn read_all(&mut self, handle: &mut Self::Handle) -> nb::Result<Measurement, Self::Error>;
}

/// Abstraction over the remote telemetry API client.
pub trait TelemetryTransport {
    /// Whatever the session runs over (e.g. a TCP client).
    type Connection;

    /// The code a write returns when the remote accepted it.
    const SUCCESS: StatusCode = StatusCode::OK_SUCCESS;

    /// Starts the client session. Connectivity failures surface on write.
    fn begin_session(&mut self, connection: Self::Connection);

    /// Stages one value for the next write.
    fn set_field(&mut self, field: FieldIndex, value: f32);

    /// Sends all staged fields in a single request and clears them.
    fn write_fields(&mut self, channel: ChannelId, api_key: &ApiKey) -> StatusCode;
}

/// Receives a read-only snapshot after every successful sample.
pub trait MeasurementSink {
    fn on_measurement(&mut self, measurement: &Measurement);
}

/// No consumer attached.
impl MeasurementSink for () {
    fn on_measurement(&mut self, _measurement: &Measurement) {}
}

impl<S: MeasurementSink + ?Sized> MeasurementSink for &mut S {
    fn on_measurement(&mut self, measurement: &Measurement) {
        (**self).on_measurement(measurement);
    }
}

/// Writes each sample's status line to a text output such as a serial console.
#[derive(Debug)]
pub struct StatusLineSink<W: Write> {
    writer: W,
}

impl<W: Write> StatusLineSink<W> {
    pub fn new(writer: W) -> Self {
        StatusLineSink { writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MeasurementSink for StatusLineSink<W> {
    fn on_measurement(&mut self, measurement: &Measurement) {
        // Output failures belong to the console, not to sampling.
        let _ = write!(self.writer, "{}\r\n", measurement);
    }
}

/// Source of monotonic millisecond timestamps.
pub trait MillisClock {
    fn now(&self) -> Millis;
}

impl<F: Fn() -> Millis> MillisClock for F {
    fn now(&self) -> Millis {
        self()
    }
}

/// Bundles the embedded-hal I2C error type with native sensor operations.
///
/// Implement this for a driver that talks to the device through an
/// `embedded_hal::i2c::I2c` bus, then wrap it in [`NativeAdapter`] to use
/// it as a [`SensorBus`]. Bus errors keep their `embedded_hal::i2c::Error`
/// kind so callers can tell a missing device (NACK) from a bus fault.
#[cfg(feature = "impl-native")]
pub trait NativeSensorBus: embedded_hal::i2c::ErrorType {
    type Handle;

    fn native_create(
        &mut self,
        address: embedded_hal::i2c::SevenBitAddress,
        settings: SensorSettings,
    ) -> Self::Handle;

    fn native_init(&mut self, handle: &mut Self::Handle) -> Result<(), Self::Error>;

    fn native_set_settings(
        &mut self,
        handle: &mut Self::Handle,
        settings: &SensorSettings,
        mask: SettingsMask,
    ) -> Result<(), Self::Error>;

    fn native_set_mode(&mut self, handle: &mut Self::Handle, mode: SensorMode) -> Result<(), Self::Error>;

    /// Blocking read of all channels.
    fn native_read(&mut self, handle: &mut Self::Handle) -> Result<Measurement, Self::Error>;
}

/// Makes a [`NativeSensorBus`] usable wherever a [`SensorBus`] is expected.
#[cfg(feature = "impl-native")]
#[derive(Debug)]
pub struct NativeAdapter<T>(pub T);

#[cfg(feature = "impl-native")]
impl<T: NativeSensorBus> SensorBus for NativeAdapter<T> {
    type Error = T::Error;
    type Handle = T::Handle;

    fn create_device_handle(&mut self, address: BusAddress, settings: SensorSettings) -> Self::Handle {
        self.0.native_create(address.as_u8(), settings)
    }

    fn init(&mut self, handle: &mut Self::Handle) -> Result<(), Self::Error> {
        self.0.native_init(handle)
    }

    fn set_settings(
        &mut self,
        handle: &mut Self::Handle,
        settings: &SensorSettings,
        mask: SettingsMask,
    ) -> Result<(), Self::Error> {
        self.0.native_set_settings(handle, settings, mask)
    }

    fn set_mode(&mut self, handle: &mut Self::Handle, mode: SensorMode) -> Result<(), Self::Error> {
        self.0.native_set_mode(handle, mode)
    }

    fn read_all(&mut self, handle: &mut Self::Handle) -> nb::Result<Measurement, Self::Error> {
        self.0.native_read(handle).map_err(nb::Error::Other)
    }
}


// --- Native adapter tests (need the embedded-hal error types) ---
#[cfg(all(test, feature = "impl-native"))]
mod native_tests {
    use super::*;
    use crate::common::error::UplinkError;
    use crate::common::telemetry::StatusCode;
    use crate::poller::{PollOutcome, SensorPoller};
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    // --- Mock I2C Error ---
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct MockI2cError(ErrorKind);

    impl embedded_hal::i2c::Error for MockI2cError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    // --- Mock Native Driver ---
    #[derive(Debug, Default)]
    struct MockDriver {
        init_error: Option<ErrorKind>,
        read_error: Option<ErrorKind>,
        created_for: Option<u8>,
        mode: Option<SensorMode>,
    }

    impl embedded_hal::i2c::ErrorType for MockDriver {
        type Error = MockI2cError;
    }

    impl NativeSensorBus for MockDriver {
        type Handle = u8;

        fn native_create(&mut self, address: u8, _settings: SensorSettings) -> u8 {
            self.created_for = Some(address);
            address
        }

        fn native_init(&mut self, _handle: &mut u8) -> Result<(), MockI2cError> {
            self.init_error.map_or(Ok(()), |kind| Err(MockI2cError(kind)))
        }

        fn native_set_settings(
            &mut self,
            _handle: &mut u8,
            _settings: &SensorSettings,
            _mask: SettingsMask,
        ) -> Result<(), MockI2cError> {
            Ok(())
        }

        fn native_set_mode(&mut self, _handle: &mut u8, mode: SensorMode) -> Result<(), MockI2cError> {
            self.mode = Some(mode);
            Ok(())
        }

        fn native_read(&mut self, _handle: &mut u8) -> Result<Measurement, MockI2cError> {
            match self.read_error {
                Some(kind) => Err(MockI2cError(kind)),
                None => Ok(Measurement::new(2500, 51200, 101_325_000)),
            }
        }
    }

    const NACK: ErrorKind = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);

    #[test]
    fn test_missing_device_is_fatal_nack() {
        let driver = MockDriver {
            init_error: Some(NACK),
            ..MockDriver::default()
        };
        let result = SensorPoller::configure(
            NativeAdapter(driver),
            BusAddress::PRIMARY,
            SensorSettings::default(),
            1000,
        );

        let err = result.unwrap_err();
        assert_eq!(err, UplinkError::Init(MockI2cError(NACK)));
        assert!(err.is_fatal());
        assert!(err.is_no_acknowledge());
        assert_eq!(err.i2c_kind(), Some(NACK));
    }

    #[test]
    fn test_read_error_maps_to_nb_other() {
        let mut adapter = NativeAdapter(MockDriver {
            read_error: Some(ErrorKind::Bus),
            ..MockDriver::default()
        });
        let mut handle = adapter.create_device_handle(BusAddress::SECONDARY, SensorSettings::default());
        assert_eq!(handle, 0x77);
        assert_eq!(adapter.0.created_for, Some(0x77));

        let result = adapter.read_all(&mut handle);
        assert_eq!(result, Err(nb::Error::Other(MockI2cError(ErrorKind::Bus))));
    }

    #[test]
    fn test_poll_through_adapter() {
        let mut poller = SensorPoller::configure(
            NativeAdapter(MockDriver::default()),
            BusAddress::PRIMARY,
            SensorSettings::default(),
            1000,
        )
        .unwrap();
        poller.apply_mode(SensorMode::Normal).unwrap();

        let mut m = Measurement::default();
        assert_eq!(poller.poll(&mut m, Millis(0)), Ok(PollOutcome::Sampled));
        assert_eq!(m.temperature, 2500);

        let (adapter, handle) = poller.release();
        assert_eq!(handle, 0x76);
        assert_eq!(adapter.0.mode, Some(SensorMode::Normal));
    }

    #[test]
    fn test_bus_fault_is_not_a_nack() {
        let err: UplinkError<MockI2cError> = UplinkError::Read(MockI2cError(ErrorKind::Bus));
        assert_eq!(err.i2c_kind(), Some(ErrorKind::Bus));
        assert!(!err.is_no_acknowledge());

        let err: UplinkError<MockI2cError> = UplinkError::Publish(StatusCode::CONNECT_FAILED);
        assert_eq!(err.i2c_kind(), None);
    }
}
