//! # Escalation state machine
//! The device cycles through three modes on a fixed schedule and starts over:
//!
//! ```text
//!          30 s            10 s           5 s
//! Waiting ------> AlarmActive ----> Alerting ----+
//!    ^                                           |
//!    +-------------------------------------------+
//! ```
//!
//! A confirmed button press cuts the cycle short from any mode and returns to
//! `Waiting` (see [`crate::sentinel`]). All decisions are made against
//! timestamps passed in by the caller, so the machine runs identically under
//! the hardware timer and under fabricated test clocks.

use crate::time::{Duration, Instant};

/// How long `Waiting` lasts before the alarm stage starts.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(30);
/// How long `AlarmActive` lasts before escalating to the alert stage.
pub const ALARM_TIMEOUT: Duration = Duration::from_secs(10);
/// How long `Alerting` lasts before the cycle starts over.
pub const ALERT_TIMEOUT: Duration = Duration::from_secs(5);

/// The phase of the escalation cycle the device is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Passive monitoring. Indicators dark, buzzer silent.
    Waiting,
    /// The alarm stage. Red indicator lit, continuous tone, countdown on the
    /// display asking for an acknowledge press.
    AlarmActive,
    /// The urgent stage, entered when nobody acknowledged the alarm. Red
    /// indicator and tone pulse at 1 Hz.
    Alerting,
}

impl Mode {
    /// The duration this mode holds before advancing on its own.
    pub const fn timeout(self) -> Duration {
        match self {
            Self::Waiting => WAIT_TIMEOUT,
            Self::AlarmActive => ALARM_TIMEOUT,
            Self::Alerting => ALERT_TIMEOUT,
        }
    }

    /// The mode that follows this one in the cycle.
    const fn next(self) -> Self {
        match self {
            Self::Waiting => Self::AlarmActive,
            Self::AlarmActive => Self::Alerting,
            Self::Alerting => Self::Waiting,
        }
    }
}

/// Current mode plus the instant it was entered.
///
/// The pair is the entire persistent state of the device; everything else is
/// derived from it and the current timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Escalation {
    mode: Mode,
    started: Instant,
}

impl Escalation {
    /// Start a fresh cycle in `Waiting` at the given instant.
    pub const fn new(now: Instant) -> Self {
        Self {
            mode: Mode::Waiting,
            started: now,
        }
    }

    /// The current mode.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The instant the current mode was entered.
    pub const fn started(&self) -> Instant {
        self.started
    }

    /// Time spent in the current mode as of `now`.
    pub const fn elapsed(&self, now: Instant) -> Duration {
        now.since(self.started)
    }

    /// Advance the cycle if the current mode's timeout has elapsed.
    ///
    /// Fires when the elapsed time reaches the timeout exactly, moves one
    /// step at most, and restarts the mode clock at `now`. Returns the mode
    /// that was entered, or `None` when the timeout has not run out yet.
    pub fn advance(&mut self, now: Instant) -> Option<Mode> {
        if self.elapsed(now).as_micros() >= self.mode.timeout().as_micros() {
            self.mode = self.mode.next();
            self.started = now;
            Some(self.mode)
        } else {
            None
        }
    }

    /// Manual reset: back to `Waiting` with the mode clock restarted at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.mode = Mode::Waiting;
        self.started = now;
    }
}
