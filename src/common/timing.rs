// src/common/timing.rs

use core::fmt;

// === Cadence Defaults ===

/// Publish cadence used when nothing else is configured (5 minutes).
pub const DEFAULT_PUBLISH_INTERVAL_SECS: u32 = 300;
/// Conversion factor for second-based intervals.
pub const MILLIS_PER_SECOND: u32 = 1000;

/// A reading of the monotonic millisecond clock.
///
/// The counter is 32 bits wide and rolls over after ~49.7 days. Differences
/// are taken with modular subtraction, so an interval that straddles the
/// rollover still measures correctly as long as it is shorter than the full
/// clock period.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u32);

impl Millis {
    #[inline]
    pub const fn new(millis: u32) -> Self {
        Millis(millis)
    }

    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, wrapping with the clock.
    #[inline]
    pub const fn elapsed_since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

impl From<u32> for Millis {
    fn from(value: u32) -> Self {
        Millis(value)
    }
}

impl From<Millis> for u32 {
    fn from(value: Millis) -> Self {
        value.0
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Throttles an action to at most once per configured period.
///
/// A gate that has never been stamped is always due. After that it is due
/// only once strictly more than `interval` milliseconds have passed since
/// the last stamp; equality does not count.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalGate {
    interval: u32,
    last_updated: Option<Millis>,
}

impl IntervalGate {
    pub const fn new(interval_millis: u32) -> Self {
        IntervalGate {
            interval: interval_millis,
            last_updated: None,
        }
    }

    /// Builds a gate from a cadence in seconds, saturating on overflow.
    pub const fn from_secs(interval_secs: u32) -> Self {
        Self::new(interval_secs.saturating_mul(MILLIS_PER_SECOND))
    }

    pub fn is_due(&self, now: Millis) -> bool {
        match self.last_updated {
            None => true,
            Some(last) => now.elapsed_since(last) > self.interval,
        }
    }

    /// Records `now` as the time of the latest attempt.
    #[inline]
    pub fn stamp(&mut self, now: Millis) {
        self.last_updated = Some(now);
    }

    /// Forgets the last attempt so the next check is due immediately.
    #[inline]
    pub fn reset(&mut self) {
        self.last_updated = None;
    }

    #[inline]
    pub const fn last_updated(&self) -> Option<Millis> {
        self.last_updated
    }

    #[inline]
    pub const fn interval_millis(&self) -> u32 {
        self.interval
    }
}
