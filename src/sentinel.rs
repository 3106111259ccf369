//! # Sentinel controller
//! One object owns the whole device: escalation state, both LEDs, the
//! buzzer, and the display. The firmware calls [`Sentinel::service`] in a
//! loop, handing it the current instant and the raw button level; the call
//! does one iteration of the device's work and reports back how long to
//! sleep before the next one. All timing flows in through the `now`
//! parameter, so the controller runs scenario tests on the host with
//! fabricated clocks and recording fakes in place of hardware.
//!
//! A service call is in one of two phases:
//!
//! - **Monitoring**: feed the debouncer, advance the escalation cycle, drive
//!   the actuators, redraw the status screen.
//! - **Resetting**: a press was confirmed; the acknowledge LED is lit, the
//!   tone is stopped, and the controller polls for the release against a
//!   deadline. While this phase lasts the cycle is paused and the screen is
//!   left alone. The reset completes on release or deadline, whichever
//!   comes first.

use crate::actuators::{Actuators, DigitalOutput, ToneGenerator};
use crate::button::{
    DEBOUNCE_WINDOW, Debouncer, HoldStatus, PressStatus, RELEASE_POLL_INTERVAL, ReleaseWait,
};
use crate::display::{StatusDisplay, render_reset_notice, render_status};
use crate::state::{Escalation, Mode};
use crate::time::{Duration, Instant};

/// Idle delay between service calls while monitoring.
pub const SERVICE_INTERVAL: Duration = Duration::from_millis(50);

/// Something a service call did that is worth a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The escalation cycle moved to a new mode on its own.
    Escalated(Mode),
    /// A press was confirmed; reset feedback is on and the release wait runs.
    ResetArmed,
    /// The manual reset finished; the cycle is back in `Waiting`.
    ResetComplete,
}

/// Result of one service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    /// Delay until the next service call.
    pub next_service: Duration,
    /// Noteworthy happening, if any, for the caller's log.
    pub event: Option<Event>,
}

impl Outcome {
    const fn quiet(next_service: Duration) -> Self {
        Self {
            next_service,
            event: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Monitoring,
    Resetting(ReleaseWait),
}

/// The device controller. See the module docs for the service phases.
pub struct Sentinel<R, G, T, D>
where
    R: DigitalOutput,
    G: DigitalOutput,
    T: ToneGenerator,
    D: StatusDisplay,
{
    escalation: Escalation,
    actuators: Actuators<R, T>,
    acknowledge: G,
    display: D,
    debouncer: Debouncer,
    phase: Phase,
    // Event of a service call whose draw failed, held for the next
    // successful one.
    pending_event: Option<Event>,
}

impl<R, G, T, D> Sentinel<R, G, T, D>
where
    R: DigitalOutput,
    G: DigitalOutput,
    T: ToneGenerator,
    D: StatusDisplay,
{
    /// Take ownership of the hardware, force all outputs off, and start a
    /// fresh cycle in `Waiting` at `now`. The display is not touched until
    /// the first service call draws the status screen.
    pub fn new(indicator: R, mut acknowledge: G, tone: T, display: D, now: Instant) -> Self {
        acknowledge.set_active(false);
        Self {
            escalation: Escalation::new(now),
            actuators: Actuators::new(indicator, tone),
            acknowledge,
            display,
            debouncer: Debouncer::new(),
            phase: Phase::Monitoring,
            pending_event: None,
        }
    }

    /// The current escalation mode.
    pub const fn mode(&self) -> Mode {
        self.escalation.mode()
    }

    /// The escalation state, for callers that want to log or inspect it.
    pub const fn escalation(&self) -> &Escalation {
        &self.escalation
    }

    /// Run one iteration: `now` is the current instant, `button_pressed` the
    /// debounce-raw button reading (already mapped from the active-low
    /// line). Returns the delay until the next call and an optional event.
    /// The only error source is display transmission; everything else is
    /// infallible. A failed draw loses the frame, not the work: mode and
    /// actuator changes stay applied, and the event that call would have
    /// reported is carried over to the next successful one.
    pub fn service(&mut self, now: Instant, button_pressed: bool) -> Result<Outcome, D::Error> {
        match self.phase {
            Phase::Monitoring => self.monitor(now, button_pressed),
            Phase::Resetting(wait) => match wait.poll(button_pressed, now) {
                HoldStatus::Held => Ok(Outcome::quiet(RELEASE_POLL_INTERVAL)),
                HoldStatus::Released | HoldStatus::TimedOut => {
                    // Phase first: the notice draw can fail, and monitoring
                    // must resume either way.
                    self.phase = Phase::Monitoring;
                    self.pending_event = Some(Event::ResetComplete);
                    self.complete_reset(now)?;
                    Ok(Outcome {
                        next_service: SERVICE_INTERVAL,
                        event: self.pending_event.take(),
                    })
                }
            },
        }
    }

    fn monitor(&mut self, now: Instant, button_pressed: bool) -> Result<Outcome, D::Error> {
        match self.debouncer.sample(button_pressed, now) {
            PressStatus::Settling => {
                // Hold still until the confirmation sample; a noise pulse
                // resumes normal monitoring on the next call.
                return Ok(Outcome::quiet(DEBOUNCE_WINDOW));
            }
            PressStatus::Confirmed => {
                self.acknowledge.set_active(true);
                self.actuators.silence();
                self.phase = Phase::Resetting(ReleaseWait::new(now));
                return Ok(Outcome {
                    next_service: RELEASE_POLL_INTERVAL,
                    event: Some(Event::ResetArmed),
                });
            }
            PressStatus::Released => {}
        }

        if let Some(mode) = self.escalation.advance(now) {
            self.pending_event = Some(Event::Escalated(mode));
        }
        self.actuators
            .drive(self.escalation.mode(), self.escalation.elapsed(now));
        render_status(&mut self.display, &self.escalation, now)?;
        Ok(Outcome {
            next_service: SERVICE_INTERVAL,
            event: self.pending_event.take(),
        })
    }

    /// Release the feedback LED, restart the cycle, shut the actuators down
    /// and show the confirmation screen. The screen stays up until the next
    /// service call redraws the status.
    fn complete_reset(&mut self, now: Instant) -> Result<(), D::Error> {
        self.acknowledge.set_active(false);
        self.escalation.reset(now);
        self.actuators.clear();
        render_reset_notice(&mut self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuators::{ALARM_TONE_HZ, ALERT_TONE_HZ};
    extern crate std;
    use core::cell::{Cell, RefCell};
    use std::string::{String as StdString, ToString as _};
    use std::vec::Vec;

    #[derive(Default)]
    struct MockLed {
        on: Cell<bool>,
    }

    impl DigitalOutput for &MockLed {
        fn set_active(&mut self, active: bool) {
            self.on.set(active);
        }
    }

    #[derive(Default)]
    struct MockTone {
        playing: Cell<Option<u32>>,
        starts: RefCell<Vec<u32>>,
    }

    impl ToneGenerator for &MockTone {
        fn start(&mut self, frequency_hz: u32) {
            self.playing.set(Some(frequency_hz));
            self.starts.borrow_mut().push(frequency_hz);
        }

        fn stop(&mut self) {
            self.playing.set(None);
        }
    }

    /// Records what reaches the screen; flushing fails while `broken` is set.
    #[derive(Default)]
    struct MockScreen {
        pending: RefCell<Vec<StdString>>,
        shown: RefCell<Vec<StdString>>,
        flushes: Cell<u32>,
        broken: Cell<bool>,
    }

    impl StatusDisplay for &MockScreen {
        type Error = &'static str;

        fn clear(&mut self) -> Result<(), Self::Error> {
            self.pending.borrow_mut().clear();
            Ok(())
        }

        fn draw_text(&mut self, text: &str, _x: i32, _y: i32) -> Result<(), Self::Error> {
            self.pending.borrow_mut().push(text.to_string());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            if self.broken.get() {
                return Err("bus stalled");
            }
            *self.shown.borrow_mut() = self.pending.borrow().clone();
            self.flushes.set(self.flushes.get() + 1);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Rig {
        red: MockLed,
        green: MockLed,
        tone: MockTone,
        screen: MockScreen,
    }

    impl Rig {
        fn sentinel(&self, now: Instant) -> Sentinel<&MockLed, &MockLed, &MockTone, &MockScreen> {
            Sentinel::new(&self.red, &self.green, &self.tone, &self.screen, now)
        }

        fn shown(&self) -> Vec<StdString> {
            self.screen.shown.borrow().clone()
        }
    }

    fn at(ticks: u32) -> Instant {
        Instant::from_ticks(ticks)
    }

    /// Drive a fresh sentinel into the requested mode, returning the ticks
    /// at which that mode started.
    fn escalate_to(
        sentinel: &mut Sentinel<&MockLed, &MockLed, &MockTone, &MockScreen>,
        mode: Mode,
    ) -> u32 {
        let mut now = 0u32;
        while sentinel.mode() != mode {
            now += sentinel.mode().timeout().as_micros();
            sentinel.service(at(now), false).unwrap();
        }
        now
    }

    #[test]
    fn full_cycle_drives_outputs_and_screens() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));

        let outcome = sentinel.service(at(0), false).unwrap();
        assert_eq!(outcome, Outcome::quiet(SERVICE_INTERVAL));
        assert!(!rig.red.on.get());
        assert_eq!(rig.tone.playing.get(), None);
        assert_eq!(rig.shown(), ["Sistema Ativo", "Aguardando..."]);

        let outcome = sentinel.service(at(30_000_000), false).unwrap();
        assert_eq!(outcome.event, Some(Event::Escalated(Mode::AlarmActive)));
        assert!(rig.red.on.get());
        assert_eq!(rig.tone.playing.get(), Some(ALARM_TONE_HZ));
        assert_eq!(rig.shown(), ["Pressione! 10s"]);

        let outcome = sentinel.service(at(40_000_000), false).unwrap();
        assert_eq!(outcome.event, Some(Event::Escalated(Mode::Alerting)));
        assert!(rig.red.on.get());
        assert_eq!(rig.tone.playing.get(), Some(ALERT_TONE_HZ));
        assert_eq!(rig.shown(), ["ALERTA!", "Sem resposta!"]);

        let outcome = sentinel.service(at(45_000_000), false).unwrap();
        assert_eq!(outcome.event, Some(Event::Escalated(Mode::Waiting)));
        assert!(!rig.red.on.get());
        assert_eq!(rig.tone.playing.get(), None);
        assert_eq!(rig.shown(), ["Sistema Ativo", "Aguardando..."]);
    }

    #[test]
    fn alert_blinks_at_one_hertz() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));
        let started = escalate_to(&mut sentinel, Mode::Alerting);

        let samples = [
            (200_000u32, true),
            (600_000, false),
            (1_100_000, true),
            (1_999_999, false),
            (2_000_000, true),
        ];
        for (offset, active) in samples {
            sentinel.service(at(started + offset), false).unwrap();
            assert_eq!(rig.red.on.get(), active, "offset {offset}");
            let expected = active.then_some(ALERT_TONE_HZ);
            assert_eq!(rig.tone.playing.get(), expected, "offset {offset}");
        }
        // The pulse never re-tuned away from the alert frequency.
        assert_eq!(
            *rig.tone.starts.borrow(),
            [ALARM_TONE_HZ, ALERT_TONE_HZ, ALERT_TONE_HZ, ALERT_TONE_HZ]
        );
    }

    #[test]
    fn confirmed_press_resets_from_every_mode() {
        for mode in [Mode::Waiting, Mode::AlarmActive, Mode::Alerting] {
            let rig = Rig::default();
            let mut sentinel = rig.sentinel(at(0));
            let started = escalate_to(&mut sentinel, mode);
            let press = started + 1_000_000;

            let outcome = sentinel.service(at(press), true).unwrap();
            assert_eq!(outcome, Outcome::quiet(DEBOUNCE_WINDOW));

            let confirm = press + DEBOUNCE_WINDOW.as_micros();
            let outcome = sentinel.service(at(confirm), true).unwrap();
            assert_eq!(outcome.event, Some(Event::ResetArmed));
            assert_eq!(outcome.next_service, RELEASE_POLL_INTERVAL);
            assert!(rig.green.on.get());
            assert_eq!(rig.tone.playing.get(), None);

            let release = confirm + 10_000;
            let outcome = sentinel.service(at(release), false).unwrap();
            assert_eq!(outcome.event, Some(Event::ResetComplete));
            assert_eq!(sentinel.mode(), Mode::Waiting);
            assert_eq!(sentinel.escalation().started(), at(release));
            assert!(!rig.green.on.get());
            assert!(!rig.red.on.get());
            assert_eq!(rig.tone.playing.get(), None);
            assert_eq!(rig.shown(), ["Reiniciado!"], "mode {mode:?}");
        }
    }

    #[test]
    fn short_press_does_not_reset() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));
        let started = escalate_to(&mut sentinel, Mode::AlarmActive);

        let press = started + 2_000_000;
        let outcome = sentinel.service(at(press), true).unwrap();
        assert_eq!(outcome, Outcome::quiet(DEBOUNCE_WINDOW));
        // Released again at the confirmation sample: noise, monitoring
        // resumes in the same call.
        let outcome = sentinel
            .service(at(press + DEBOUNCE_WINDOW.as_micros()), false)
            .unwrap();
        assert_eq!(outcome, Outcome::quiet(SERVICE_INTERVAL));
        assert_eq!(sentinel.mode(), Mode::AlarmActive);
        assert!(!rig.green.on.get());
        assert_eq!(rig.tone.playing.get(), Some(ALARM_TONE_HZ));
        assert_eq!(rig.shown(), ["Pressione! 8s"]);
    }

    #[test]
    fn stuck_button_resets_at_deadline() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));

        sentinel.service(at(1_000_000), true).unwrap();
        let confirm = 1_000_000 + DEBOUNCE_WINDOW.as_micros();
        let outcome = sentinel.service(at(confirm), true).unwrap();
        assert_eq!(outcome.event, Some(Event::ResetArmed));

        // Held through the whole wait; the deadline completes the reset.
        let outcome = sentinel.service(at(confirm + 999_999), true).unwrap();
        assert_eq!(outcome, Outcome::quiet(RELEASE_POLL_INTERVAL));
        assert!(rig.green.on.get());

        let deadline = confirm + 1_000_000;
        let outcome = sentinel.service(at(deadline), true).unwrap();
        assert_eq!(outcome.event, Some(Event::ResetComplete));
        assert_eq!(sentinel.mode(), Mode::Waiting);
        assert_eq!(sentinel.escalation().started(), at(deadline));
        assert!(!rig.green.on.get());
    }

    #[test]
    fn monitoring_resumes_after_reset() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));

        sentinel.service(at(0), true).unwrap();
        sentinel.service(at(20_000), true).unwrap();
        let outcome = sentinel.service(at(30_000), false).unwrap();
        assert_eq!(outcome.event, Some(Event::ResetComplete));

        // Plain monitoring again: no event replay, status screen redrawn.
        let outcome = sentinel.service(at(80_000), false).unwrap();
        assert_eq!(outcome, Outcome::quiet(SERVICE_INTERVAL));
        assert_eq!(rig.shown(), ["Sistema Ativo", "Aguardando..."]);

        // The restarted cycle escalates on schedule from the reset instant.
        let outcome = sentinel.service(at(30_030_000), false).unwrap();
        assert_eq!(outcome.event, Some(Event::Escalated(Mode::AlarmActive)));
    }

    #[test]
    fn display_outage_defers_the_event() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));
        sentinel.service(at(0), false).unwrap();

        rig.screen.broken.set(true);
        let result = sentinel.service(at(30_000_000), false);
        assert_eq!(result, Err("bus stalled"));
        // The transition and its outputs landed; only the frame was lost.
        assert_eq!(sentinel.mode(), Mode::AlarmActive);
        assert!(rig.red.on.get());
        assert_eq!(rig.tone.playing.get(), Some(ALARM_TONE_HZ));

        // The next good frame reports the transition it covers.
        rig.screen.broken.set(false);
        let outcome = sentinel.service(at(30_050_000), false).unwrap();
        assert_eq!(outcome.event, Some(Event::Escalated(Mode::AlarmActive)));
        assert_eq!(rig.shown(), ["Pressione! 10s"]);
    }

    #[test]
    fn failed_notice_still_completes_the_reset() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));
        let started = escalate_to(&mut sentinel, Mode::AlarmActive);

        sentinel.service(at(started + 100_000), true).unwrap();
        sentinel.service(at(started + 120_000), true).unwrap();

        rig.screen.broken.set(true);
        let result = sentinel.service(at(started + 130_000), false);
        assert_eq!(result, Err("bus stalled"));
        // The reset itself landed despite the lost notice frame.
        assert_eq!(sentinel.mode(), Mode::Waiting);
        assert!(!rig.green.on.get());
        assert_eq!(rig.tone.playing.get(), None);

        rig.screen.broken.set(false);
        let outcome = sentinel.service(at(started + 180_000), false).unwrap();
        assert_eq!(outcome.event, Some(Event::ResetComplete));
        assert_eq!(rig.shown(), ["Sistema Ativo", "Aguardando..."]);
    }

    #[test]
    fn reset_notice_holds_until_next_service() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));

        sentinel.service(at(0), true).unwrap();
        sentinel.service(at(20_000), true).unwrap();
        sentinel.service(at(30_000), false).unwrap();
        assert_eq!(rig.shown(), ["Reiniciado!"]);

        // Next regular service replaces the notice with the status screen.
        let next = 30_000 + SERVICE_INTERVAL.as_micros();
        sentinel.service(at(next), false).unwrap();
        assert_eq!(rig.shown(), ["Sistema Ativo", "Aguardando..."]);
    }

    #[test]
    fn paused_phases_do_not_redraw() {
        let rig = Rig::default();
        let mut sentinel = rig.sentinel(at(0));

        sentinel.service(at(0), false).unwrap();
        assert_eq!(rig.screen.flushes.get(), 1);
        // Settling, armed, and held calls leave the screen alone.
        sentinel.service(at(50_000), true).unwrap();
        sentinel.service(at(70_000), true).unwrap();
        sentinel.service(at(80_000), true).unwrap();
        assert_eq!(rig.screen.flushes.get(), 1);
        // Completion draws the notice.
        sentinel.service(at(90_000), false).unwrap();
        assert_eq!(rig.screen.flushes.get(), 2);
    }

    #[test]
    fn escalates_across_counter_wrap() {
        let rig = Rig::default();
        let start = u32::MAX - 5;
        let mut sentinel = rig.sentinel(at(start));
        let fire = start.wrapping_add(30_000_000);
        let outcome = sentinel.service(at(fire), false).unwrap();
        assert_eq!(outcome.event, Some(Event::Escalated(Mode::AlarmActive)));
        assert_eq!(rig.shown(), ["Pressione! 10s"]);
    }
}
