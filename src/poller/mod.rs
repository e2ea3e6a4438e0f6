// src/poller/mod.rs

// Declare the sub-module
pub mod sync_poller;

// Re-export the public poller types
pub use sync_poller::{PollOutcome, SensorPoller};
