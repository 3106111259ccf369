//! # Actuators
//! Maps the current mode onto the red indicator LED and the buzzer. The
//! hardware sits behind two small traits so the logic runs against recording
//! fakes on the host, and [`Actuators`] tracks what it last applied so an
//! unchanged mode does not reprogram the PWM slice every iteration.

use crate::state::Mode;
use crate::time::Duration;

/// Continuous tone while the alarm stage asks for an acknowledge.
pub const ALARM_TONE_HZ: u32 = 2_000;
/// Pulsed tone during the alert stage.
pub const ALERT_TONE_HZ: u32 = 1_500;
/// Full period of the alert blink/beep pulse.
pub const ALERT_PULSE_PERIOD: Duration = Duration::from_secs(1);
/// Leading slice of each pulse period with indicator and tone on.
pub const ALERT_PULSE_ACTIVE: Duration = Duration::from_millis(500);

/// A single on/off output line, such as an indicator LED.
pub trait DigitalOutput {
    /// Drive the line to its active (lit) or inactive level.
    fn set_active(&mut self, active: bool);
}

/// A buzzer or other periodic-waveform output.
pub trait ToneGenerator {
    /// Emit a 50%-duty waveform at the given frequency. May be called while
    /// a tone is already sounding to retune.
    fn start(&mut self, frequency_hz: u32);

    /// Disable the waveform output entirely. The line idles; this is not the
    /// same as a zero duty cycle.
    fn stop(&mut self);
}

/// What the indicator and buzzer should be doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outputs {
    /// Red indicator state.
    pub indicator_on: bool,
    /// Tone frequency, or `None` for silence.
    pub tone_hz: Option<u32>,
}

impl Outputs {
    /// Indicator dark, buzzer silent.
    pub const OFF: Self = Self {
        indicator_on: false,
        tone_hz: None,
    };
}

/// Whether the alert pulse is in the on-phase of its 1 Hz cycle.
///
/// The on-phase is the first half of each period: elapsed values in
/// `[0, 500_000)` µs modulo one second.
pub const fn pulse_active(elapsed: Duration) -> bool {
    elapsed.as_micros() % ALERT_PULSE_PERIOD.as_micros() < ALERT_PULSE_ACTIVE.as_micros()
}

/// The outputs a mode calls for, given time spent in it.
pub const fn outputs_for(mode: Mode, elapsed: Duration) -> Outputs {
    match mode {
        Mode::Waiting => Outputs::OFF,
        Mode::AlarmActive => Outputs {
            indicator_on: true,
            tone_hz: Some(ALARM_TONE_HZ),
        },
        Mode::Alerting => {
            if pulse_active(elapsed) {
                Outputs {
                    indicator_on: true,
                    tone_hz: Some(ALERT_TONE_HZ),
                }
            } else {
                Outputs::OFF
            }
        }
    }
}

/// PWM period in base-clock counts for a target frequency.
///
/// Rounds to the nearest whole period instead of truncating, so frequencies
/// in the buzzer's 1000-3000 Hz band land within rounding distance of the
/// target, and clamps to a minimum of 2 counts so no frequency can collapse
/// the waveform. A zero frequency is treated as 1 Hz.
pub const fn tone_period(base_clock_hz: u32, frequency_hz: u32) -> u32 {
    let frequency_hz = if frequency_hz == 0 { 1 } else { frequency_hz };
    let counts = (base_clock_hz + frequency_hz / 2) / frequency_hz;
    if counts < 2 { 2 } else { counts }
}

/// Red indicator and buzzer, driven together from the current mode.
pub struct Actuators<L: DigitalOutput, T: ToneGenerator> {
    indicator: L,
    tone: T,
    applied: Outputs,
}

impl<L: DigitalOutput, T: ToneGenerator> Actuators<L, T> {
    /// Take ownership of the outputs and force both off.
    pub fn new(mut indicator: L, mut tone: T) -> Self {
        indicator.set_active(false);
        tone.stop();
        Self {
            indicator,
            tone,
            applied: Outputs::OFF,
        }
    }

    /// Drive the outputs for `mode` after `elapsed` time in it.
    pub fn drive(&mut self, mode: Mode, elapsed: Duration) {
        self.apply(outputs_for(mode, elapsed));
    }

    /// Stop the tone, leaving the indicator as it is. Used as immediate
    /// feedback when a reset press is confirmed.
    pub fn silence(&mut self) {
        if self.applied.tone_hz.is_some() {
            self.tone.stop();
            self.applied.tone_hz = None;
        }
    }

    /// Indicator off, tone off. The tail end of a manual reset.
    pub fn clear(&mut self) {
        self.apply(Outputs::OFF);
    }

    fn apply(&mut self, target: Outputs) {
        if target.indicator_on != self.applied.indicator_on {
            self.indicator.set_active(target.indicator_on);
        }
        if target.tone_hz != self.applied.tone_hz {
            match target.tone_hz {
                Some(hz) => self.tone.start(hz),
                None => self.tone.stop(),
            }
        }
        self.applied = target;
    }
}
