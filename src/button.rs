//! # Acknowledge button
//! The single button is active-low; hardware polarity is the port layer's
//! business and everything here speaks plain "pressed". Two small pieces
//! cover the input path:
//!
//! - [`Debouncer`] confirms a press by sampling twice across a short window,
//!   rejecting noise pulses that do not span it.
//! - [`ReleaseWait`] bounds the press-and-hold phase of a manual reset with
//!   an explicit deadline, so a stuck button cannot hold the device hostage.
//!
//! Both take the current instant as a parameter and never sleep, which keeps
//! the reset path testable without real delays.

use crate::time::{Duration, Instant};

/// A press must span this window before it counts.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(20);
/// How long a reset waits for the button to come back up.
pub const RELEASE_TIMEOUT: Duration = Duration::from_secs(1);
/// Sampling cadence while waiting for the release.
pub const RELEASE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of one debounce sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressStatus {
    /// Line is up; nothing pending.
    Released,
    /// Line just went down; confirmation sample still outstanding.
    Settling,
    /// Line stayed down across the debounce window. One-shot: the observation
    /// is consumed and the next sample starts a fresh press.
    Confirmed,
}

/// Two-sample debounce over [`DEBOUNCE_WINDOW`].
#[derive(Debug, Default)]
pub struct Debouncer {
    pressed_since: Option<Instant>,
}

impl Debouncer {
    /// A debouncer with no press pending.
    pub const fn new() -> Self {
        Self {
            pressed_since: None,
        }
    }

    /// Feed one reading of the button line.
    ///
    /// Returns [`PressStatus::Confirmed`] once the line has stayed pressed
    /// from a first sample through a second one at least the debounce window
    /// later. A release at the second sample discards the press as noise.
    pub fn sample(&mut self, pressed: bool, now: Instant) -> PressStatus {
        if !pressed {
            self.pressed_since = None;
            return PressStatus::Released;
        }
        match self.pressed_since {
            None => {
                self.pressed_since = Some(now);
                PressStatus::Settling
            }
            Some(since) if now.since(since).as_micros() >= DEBOUNCE_WINDOW.as_micros() => {
                self.pressed_since = None;
                PressStatus::Confirmed
            }
            Some(_) => PressStatus::Settling,
        }
    }
}

/// Outcome of one release-wait poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldStatus {
    /// Still held, deadline not reached; poll again.
    Held,
    /// Button came back up.
    Released,
    /// Deadline passed with the button still down.
    TimedOut,
}

/// Deadline-bounded wait for the button release during a manual reset.
///
/// The wait either ends with the release or runs into the deadline; the reset
/// completes on both exits, the deadline merely stops the waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseWait {
    since: Instant,
}

impl ReleaseWait {
    /// Arm the wait at the instant the press was confirmed.
    pub const fn new(now: Instant) -> Self {
        Self { since: now }
    }

    /// Check the button against the deadline.
    pub fn poll(&self, pressed: bool, now: Instant) -> HoldStatus {
        if !pressed {
            HoldStatus::Released
        } else if now.since(self.since).as_micros() >= RELEASE_TIMEOUT.as_micros() {
            HoldStatus::TimedOut
        } else {
            HoldStatus::Held
        }
    }
}
