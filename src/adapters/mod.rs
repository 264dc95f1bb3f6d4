//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                  |
//! |-------------|--------------|------------------------------|
//! | `log_sink`  | EventSink    | Serial log output            |
//! | `nvs`       | StoragePort  | NVS / in-memory store        |
//! | `time`      | ClockPort    | ESP32 system timer / Instant |
//!
//! The SGP30 itself lives in [`crate::sensors::sgp30`] and implements
//! `IaqSensorPort` directly over `embedded-hal`.

pub mod log_sink;
pub mod nvs;
pub mod time;
