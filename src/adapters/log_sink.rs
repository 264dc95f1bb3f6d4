//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART / USB-CDC in production).  A future MQTT adapter would implement
//! the same trait.

use log::{Level, log};

use crate::app::events::{AppEvent, MissingReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable line for one event.
pub fn render(event: &AppEvent) -> String {
    match event {
        AppEvent::WarmedUp { after_ms } => {
            format!("Sensor warm-up complete after {} ms", after_ms)
        }
        AppEvent::BaselineRestored(b) => format!("Baseline found: {}", b),
        AppEvent::BaselineMissing(MissingReason::NotFound) => {
            "No valid baseline found. You should wait 12 hours for calibration before use."
                .to_string()
        }
        AppEvent::BaselineMissing(MissingReason::Corrupt) => {
            "Stored baseline unreadable. You should wait 12 hours for calibration before use."
                .to_string()
        }
        AppEvent::HumidityCompensated(code) => format!("Absolute humidity set: {}", code),
        AppEvent::Measurement(s) => format!(
            "Carbon Dioxide Equivalent (ppm): {} | Total Volatile Organic Compound (ppb): {}",
            s.co2eq_ppm, s.tvoc_ppb
        ),
        AppEvent::BaselineCommitted(b) => format!("Baseline committed: {}", b),
        AppEvent::BaselineCommitFailed(b) => {
            format!("Baseline commit failed: {} (retry next interval)", b)
        }
    }
}

/// Log level for one event.  Per-tick compensation pushes stay at debug so
/// the console carries one line per measurement.
pub fn level(event: &AppEvent) -> Level {
    match event {
        AppEvent::BaselineMissing(_) | AppEvent::BaselineCommitFailed(_) => Level::Warn,
        AppEvent::HumidityCompensated(_) => Level::Debug,
        _ => Level::Info,
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        log!(level(event), "{}", render(event));
    }
}
