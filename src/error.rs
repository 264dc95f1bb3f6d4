//! Unified error type for the IAQ monitor.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy`.
//!
//! Only [`Error::Driver`] ever leaves the scheduler: baseline and storage
//! failures are recovered where they happen.

use core::fmt;

use crate::app::ports::{BaselineError, DriverError, StorageError};
use crate::config::ConfigError;

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The gas sensor could not be reached or returned bad data.
    Driver(DriverError),
    /// The baseline record could not be read or written.
    Baseline(BaselineError),
    /// The key-value store failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::Baseline(e) => write!(f, "baseline: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

impl From<BaselineError> for Error {
    fn from(e: BaselineError) -> Self {
        Self::Baseline(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
