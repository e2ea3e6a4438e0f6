// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod error;
pub mod hal_traits;
pub mod measurement;
pub mod settings;
pub mod telemetry;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

// From error.rs
pub use error::UplinkError;

// From hal_traits.rs
pub use hal_traits::{MeasurementSink, MillisClock, SensorBus, StatusLineSink, TelemetryTransport};

// From measurement.rs
pub use measurement::{Measurement, Quantity, StatusLine};

// From settings.rs
pub use settings::{
    BusAddress, Filter, Oversampling, SensorMode, SensorSettings, SettingsMask, StandbyTime,
};

// From telemetry.rs
pub use telemetry::{ApiKey, ChannelId, FieldIndex, FieldMap, StatusCode};

// From timing.rs (constants - users can access via common::timing::*)
pub use timing::{IntervalGate, Millis};

// --- Feature-gated re-exports ---

// Native HAL integration traits (from hal_traits.rs)
#[cfg(feature = "impl-native")]
pub use hal_traits::{NativeAdapter, NativeSensorBus};
