//! # Timekeeping
//! Timestamps and durations for the escalation logic. The device clock is a
//! free-running 32-bit microsecond counter that wraps roughly every 71.6
//! minutes, so elapsed time is always computed with wrapping subtraction and
//! instants themselves are never ordered.

/// A span of time with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duration {
    micros: u32,
}

impl Duration {
    /// Zero-length duration.
    pub const ZERO: Self = Self::from_micros(0);

    /// Create a duration from microseconds.
    pub const fn from_micros(micros: u32) -> Self {
        Self { micros }
    }

    /// Create a duration from milliseconds.
    pub const fn from_millis(millis: u32) -> Self {
        Self {
            micros: millis * 1_000,
        }
    }

    /// Create a duration from whole seconds.
    pub const fn from_secs(secs: u32) -> Self {
        Self {
            micros: secs * 1_000_000,
        }
    }

    /// The duration in microseconds.
    pub const fn as_micros(self) -> u32 {
        self.micros
    }

    /// The duration in whole milliseconds, rounded down.
    pub const fn as_millis(self) -> u32 {
        self.micros / 1_000
    }

    /// The duration in whole seconds, rounded down.
    pub const fn as_secs(self) -> u32 {
        self.micros / 1_000_000
    }
}

/// A point in time on the device's 32-bit microsecond counter.
///
/// Instants deliberately implement no ordering: two raw counter values say
/// nothing about which came first once the counter has wrapped. The only
/// meaningful question is "how much time passed since an earlier instant",
/// which [`Instant::since`] answers correctly across a wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant {
    ticks: u32,
}

impl Instant {
    /// Create an instant from a raw counter value in microseconds.
    pub const fn from_ticks(ticks: u32) -> Self {
        Self { ticks }
    }

    /// The raw counter value in microseconds.
    pub const fn ticks(self) -> u32 {
        self.ticks
    }

    /// Elapsed time since `earlier`, tolerating counter wraparound.
    pub const fn since(self, earlier: Self) -> Duration {
        Duration::from_micros(self.ticks.wrapping_sub(earlier.ticks))
    }
}

/// Source of the current instant.
///
/// The firmware implements this over the hardware timer; tests fabricate
/// instants directly and never need a ticking clock.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}
