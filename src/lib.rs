// src/lib.rs

#![no_std] // Specify no_std at the crate root

#[cfg(test)]
extern crate std;

// Must come first so the log macros are visible to every module below
#[macro_use]
mod fmt;

pub mod common;
pub mod poller;
pub mod publisher;
pub mod uplink;

// Re-export key types for convenience
pub use common::{Measurement, Millis, UplinkError};
pub use poller::{PollOutcome, SensorPoller};
pub use publisher::{PublishOutcome, TelemetryPublisher};
pub use uplink::{TickReport, Uplink};
