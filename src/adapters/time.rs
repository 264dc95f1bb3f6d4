//! Monotonic clock adapter.
//!
//! Implements [`ClockPort`] for the scheduler.
//!
//! - **`target_os = "espidf"`**: wraps `esp_idf_sys::esp_timer_get_time()`, the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side simulation.
//!
//! Sleeping goes through `std::thread::sleep` on both; on ESP-IDF that
//! yields to FreeRTOS rather than busy-waiting.

use std::time::Duration;

use crate::app::ports::ClockPort;

/// Wall-independent clock counting from adapter construction (host) or
/// from boot (ESP32).
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        let us = unsafe { esp_idf_sys::esp_timer_get_time() };
        us as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl ClockPort for SystemClock {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1000
    }

    fn sleep_ms(&mut self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}
