//! # Hardware bindings
//! This module implements the core hardware traits on the BitDogLab
//! peripherals: plain GPIO outputs for the indicator LEDs, a PWM slice for
//! the buzzer, and an SSD1306 over I2C for the status display.

use display_interface::DisplayError;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{self, Pwm};
use embedded_graphics::{
    mono_font::{MonoTextStyle, MonoTextStyleBuilder, ascii::FONT_6X13},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_hal::digital::OutputPin;
use fixed::FixedU16;
use fixed::types::extra::U4;
use sentinela::{Clock, DigitalOutput, Instant, StatusDisplay, ToneGenerator, tone_period};
use ssd1306::{Ssd1306, mode::BufferedGraphicsMode, prelude::*};

use crate::resources::BuzzerResources;

/// Divider bringing the 125 MHz system clock down to a 1 MHz PWM base, so
/// the wrap value of the buzzer slice counts microseconds.
const PWM_CLOCK_DIVIDER: u32 = 125;

/// An indicator LED on a push-pull output pin, active high.
pub struct Led<P: OutputPin> {
    pin: P,
}

impl<P: OutputPin> Led<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: OutputPin> DigitalOutput for Led<P> {
    fn set_active(&mut self, active: bool) {
        // The board pins switch infallibly.
        let _ = if active {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}

/// The buzzer on PWM slice 2, channel B.
pub struct PwmBuzzer {
    slice: Pwm<'static>,
    base_clock_hz: u32,
}

impl PwmBuzzer {
    /// Claim the slice and pin, with the output parked silent.
    pub fn new(r: BuzzerResources) -> Self {
        let slice = Pwm::new_output_b(r.slice, r.pin, silent_config());
        Self {
            slice,
            base_clock_hz: clk_sys_freq() / PWM_CLOCK_DIVIDER,
        }
    }
}

impl ToneGenerator for PwmBuzzer {
    fn start(&mut self, frequency_hz: u32) {
        // Counts per cycle at the divided base clock, capped at the
        // 16-bit wrap of the slice counter.
        let counts = tone_period(self.base_clock_hz, frequency_hz).min(65_536);
        let mut config = silent_config();
        config.top = (counts - 1) as u16;
        config.compare_b = (counts / 2) as u16;
        config.enable = true;
        self.slice.set_config(&config);
    }

    fn stop(&mut self) {
        self.slice.set_config(&silent_config());
    }
}

/// Slice configuration with the counter disabled and the divider set.
fn silent_config() -> pwm::Config {
    let mut config = pwm::Config::default();
    config.divider = FixedU16::<U4>::from_num(PWM_CLOCK_DIVIDER);
    config.enable = false;
    config
}

/// The 128x64 status panel, drawn with the 6x13 font. Coordinates from the
/// render layer are the top-left corner of each text line.
pub struct Oled<DI> {
    display: Ssd1306<DI, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>,
    style: MonoTextStyle<'static, BinaryColor>,
}

impl<DI> Oled<DI>
where
    DI: WriteOnlyDataCommand,
{
    /// Initialize the controller and push a blank frame.
    pub fn new(interface: DI) -> Result<Self, DisplayError> {
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init()?;
        display.flush()?;
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X13)
            .text_color(BinaryColor::On)
            .build();
        Ok(Self { display, style })
    }
}

impl<DI> StatusDisplay for Oled<DI>
where
    DI: WriteOnlyDataCommand,
{
    type Error = DisplayError;

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.display.clear_buffer();
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
        Text::with_baseline(text, Point::new(x, y), self.style, Baseline::Top)
            .draw(&mut self.display)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.display.flush()
    }
}

/// The device timeline, read from the hardware timer.
///
/// The timer itself is 64-bit; the core works in 32-bit microseconds and
/// handles the wrap, so the truncation here is part of the contract.
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(embassy_time::Instant::now().as_micros() as u32)
    }
}
