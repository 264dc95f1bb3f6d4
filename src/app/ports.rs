//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MeasurementScheduler (domain)
//! ```
//!
//! Driven adapters (gas sensor, storage, clock, event sinks) implement these
//! traits.  The [`MeasurementScheduler`](crate::scheduler::MeasurementScheduler)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! All port errors are typed; callers must handle every variant explicitly.

use crate::baseline::CalibrationBaseline;
use crate::sensors::{AbsoluteHumidity, HumidityReading, MeasurementSample};

// ───────────────────────────────────────────────────────────────
// Gas sensor port (driven adapter: SGP30 ↔ domain)
// ───────────────────────────────────────────────────────────────

/// The IAQ sensor as seen by the scheduler.
///
/// The scheduler never retries a failed call; a [`DriverError`] ends the
/// tick and propagates to the caller.
pub trait IaqSensorPort {
    /// Start the sensor's on-chip IAQ algorithm.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Take one CO2eq / TVOC measurement.
    fn measure_iaq(&mut self) -> Result<MeasurementSample, DriverError>;

    /// Restore a previously checkpointed baseline.
    fn set_iaq_baseline(&mut self, baseline: CalibrationBaseline) -> Result<(), DriverError>;

    /// Read the baseline the sensor has accumulated so far.
    fn get_iaq_baseline(&mut self) -> Result<CalibrationBaseline, DriverError>;

    /// Push the humidity compensation code.
    fn set_absolute_humidity(&mut self, code: AbsoluteHumidity) -> Result<(), DriverError>;
}

// ───────────────────────────────────────────────────────────────
// Baseline checkpoint port (driven adapter: domain ↔ persistent record)
// ───────────────────────────────────────────────────────────────

/// Loads and saves the single calibration-baseline record.
///
/// `NotFound` and `Corrupt` from [`load`](Self::load) are both recoverable;
/// the caller proceeds without a baseline.
pub trait BaselinePort {
    fn load(&self) -> Result<CalibrationBaseline, BaselineError>;

    fn save(&mut self, baseline: CalibrationBaseline) -> Result<(), BaselineError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for the baseline record and the config blob.
///
/// Keys are namespaced to prevent collisions between subsystems.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value, replacing any previous one.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock with a blocking sleep.
pub trait ClockPort {
    /// Milliseconds since an arbitrary fixed origin.  Never goes backwards.
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Ambient humidity source
// ───────────────────────────────────────────────────────────────

/// Supplies the temperature / relative humidity used for compensation.
///
/// Queried before every compensation push, so a live sensor can replace the
/// fixed reading without touching the scheduler.
pub trait HumiditySource {
    fn read(&mut self) -> HumidityReading;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`IaqSensorPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The I2C transaction failed (NACK, arbitration loss, timeout).
    Bus,
    /// A received word failed its CRC check.
    Crc,
    /// The on-chip self-test returned an unexpected pattern.
    SelfTestFailed,
}

/// Errors from [`BaselinePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineError {
    /// No checkpoint has ever been written (first boot).
    NotFound,
    /// A checkpoint exists but does not decode as a baseline pair.
    Corrupt,
    /// The checkpoint could not be written.
    WriteFailure,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::Crc => write!(f, "CRC mismatch"),
            Self::SelfTestFailed => write!(f, "self-test failed"),
        }
    }
}

impl core::fmt::Display for BaselineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "baseline not found"),
            Self::Corrupt => write!(f, "baseline corrupt"),
            Self::WriteFailure => write!(f, "baseline write failed"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
