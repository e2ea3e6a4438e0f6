// src/publisher/mod.rs

// Declare the sub-module
pub mod sync_publisher;

// Re-export the public publisher types
pub use sync_publisher::{status_code_of, PublishOutcome, TelemetryPublisher};
