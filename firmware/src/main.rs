//! # BitDogLab sentinel firmware
//! Brings the board up, binds the peripherals to the monitoring core and
//! runs its service loop forever. All device behavior lives in the
//! `sentinela` crate; this binary only does hardware plumbing and logging.
#![no_std]
#![no_main]

use defmt::{Debug2Format, error, info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_time::Timer;
use sentinela::{Clock as _, Event, SERVICE_INTERVAL, Sentinel};
use ssd1306::I2CDisplayInterface;
use {defmt_rtt as _, panic_probe as _};

use crate::hardware::{Led, Oled, PwmBuzzer, UptimeClock};
use crate::resources::*;

mod hardware;
mod resources;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // Initialize the peripherals for the RP2040
    let p = embassy_rp::init(Default::default());
    let r = split_resources!(p);

    // Give the debug host a moment to attach before the first log lines.
    Timer::after_secs(2).await;
    info!("Program start");

    let button = Input::new(r.button.pin, Pull::Up);
    let alarm_led = Led::new(Output::new(r.indicators.red, Level::Low));
    let ack_led = Led::new(Output::new(r.indicators.green, Level::Low));
    let buzzer = PwmBuzzer::new(r.buzzer);

    let mut config = i2c::Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_blocking(r.display.i2c, r.display.scl, r.display.sda, config);
    let display = match Oled::new(I2CDisplayInterface::new(i2c)) {
        Ok(display) => display,
        Err(e) => {
            error!("Failed to initialize display: {}", Debug2Format(&e));
            // No point running the escalation cycle without the prompt panel.
            loop {
                Timer::after_secs(60).await;
            }
        }
    };

    let clock = UptimeClock;
    let mut sentinel = Sentinel::new(alarm_led, ack_led, buzzer, display, clock.now());
    info!("monitoring started");

    loop {
        // The button pulls the line low when pressed.
        let pressed = button.is_low();
        let wait = match sentinel.service(clock.now(), pressed) {
            Ok(outcome) => {
                match outcome.event {
                    Some(Event::Escalated(mode)) => info!("mode -> {}", mode),
                    Some(Event::ResetArmed) => info!("button press confirmed, silencing"),
                    Some(Event::ResetComplete) => info!("reset by button, monitoring resumed"),
                    None => {}
                }
                outcome.next_service
            }
            Err(e) => {
                warn!("display update failed: {}", Debug2Format(&e));
                SERVICE_INTERVAL
            }
        };
        Timer::after(embassy_delay(wait)).await;
    }
}

/// Map a core delay onto the embassy timer.
const fn embassy_delay(amount: sentinela::Duration) -> embassy_time::Duration {
    embassy_time::Duration::from_micros(amount.as_micros() as u64)
}
