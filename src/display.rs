//! # Status renderer
//! Formats the per-mode status screens and pushes them through the
//! [`StatusDisplay`] trait: clear the buffer, draw text at pixel positions,
//! flush to the device. The screen texts and their coordinates are the
//! device's fixed UI; the renderer redraws the whole frame every service.

use core::fmt::Write as _;

use heapless::String;

use crate::state::{ALARM_TIMEOUT, Escalation, Mode};
use crate::time::{Duration, Instant};

/// A small text display, such as the 128x64 OLED on the board.
///
/// Drawing goes to an in-memory buffer; nothing reaches the device until
/// [`flush`](StatusDisplay::flush). Transmission is the fallible part, so the
/// whole surface shares one associated error type.
pub trait StatusDisplay {
    /// Transport error for buffer transmission.
    type Error;

    /// Blank the draw buffer.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Draw text with its top-left corner at the given pixel position.
    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Send the buffer to the device.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Seconds left on the alarm-stage countdown, clamped at zero.
pub const fn alarm_seconds_left(elapsed: Duration) -> u32 {
    ALARM_TIMEOUT.as_secs().saturating_sub(elapsed.as_secs())
}

/// Draw the status screen for the current mode.
pub fn render_status<D: StatusDisplay>(
    display: &mut D,
    escalation: &Escalation,
    now: Instant,
) -> Result<(), D::Error> {
    display.clear()?;
    match escalation.mode() {
        Mode::Waiting => {
            display.draw_text("Sistema Ativo", 10, 10)?;
            display.draw_text("Aguardando...", 10, 30)?;
        }
        Mode::AlarmActive => {
            let mut line: String<16> = String::new();
            let _ = write!(
                line,
                "Pressione! {}s",
                alarm_seconds_left(escalation.elapsed(now))
            );
            display.draw_text(&line, 10, 10)?;
        }
        Mode::Alerting => {
            display.draw_text("ALERTA!", 30, 10)?;
            display.draw_text("Sem resposta!", 10, 30)?;
        }
    }
    display.flush()
}

/// Draw the confirmation screen shown right after a manual reset.
pub fn render_reset_notice<D: StatusDisplay>(display: &mut D) -> Result<(), D::Error> {
    display.clear()?;
    display.draw_text("Reiniciado!", 10, 10)?;
    display.flush()
}
