//! # sentinela
//!
//! Core logic for a small watch-alarm device: it waits half a minute, then
//! demands an acknowledge press with a buzzer, a red LED and a countdown on
//! an OLED, escalates to a pulsing alert when nobody responds, and starts
//! over. Holding the button resets the cycle at any point.
//!
//! The crate is `no_std` and free of hardware dependencies; a board crate
//! (see `firmware/` in the repository) implements the thin traits at the
//! edges and runs the service loop. Everything time-related takes the
//! current instant as a parameter, which keeps the whole device logic
//! testable on the host without sleeping.
//!
//! # Core pieces
//!
//! - [`Escalation`]: the three-mode cycle (`Waiting` -> `AlarmActive` ->
//!   `Alerting`) with its timeout thresholds
//! - [`Sentinel`]: the controller owning the hardware handles; call
//!   [`Sentinel::service`] once per loop iteration
//! - [`DigitalOutput`], [`ToneGenerator`], [`StatusDisplay`], [`Clock`]:
//!   traits to implement for your hardware
//! - [`Debouncer`], [`ReleaseWait`]: the acknowledge-button input path
//!
//! # Example
//!
//! The escalation cycle on its own:
//!
//! ```
//! use sentinela::{Escalation, Instant, Mode};
//!
//! let mut escalation = Escalation::new(Instant::from_ticks(0));
//! assert_eq!(escalation.advance(Instant::from_ticks(29_999_999)), None);
//! assert_eq!(
//!     escalation.advance(Instant::from_ticks(30_000_000)),
//!     Some(Mode::AlarmActive),
//! );
//! ```
#![no_std]

pub mod actuators;
pub mod button;
pub mod display;
pub mod sentinel;
pub mod state;
pub mod time;

pub use actuators::{Actuators, DigitalOutput, Outputs, ToneGenerator, tone_period};
pub use button::{Debouncer, HoldStatus, PressStatus, ReleaseWait};
pub use display::StatusDisplay;
pub use sentinel::{Event, Outcome, SERVICE_INTERVAL, Sentinel};
pub use state::{Escalation, Mode};
pub use time::{Clock, Duration, Instant};
