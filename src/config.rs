//! System configuration parameters
//!
//! All tunable parameters for the IAQ monitor, passed to the scheduler once
//! at construction and never mutated afterwards.  Values can be overridden
//! by a `postcard` blob stored in NVS.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};

/// NVS namespace shared by the config blob and the baseline record.
pub const STORAGE_NAMESPACE: &str = "iaqmon";
/// NVS key of the persisted config blob.
pub const CONFIG_KEY: &str = "monitor_cfg";
/// Default NVS key of the baseline record.
pub const BASELINE_KEY: &str = "sgp30_baseline";

/// NVS namespace and key names are limited to 15 bytes.
pub const NVS_NAME_MAX: usize = 15;

const _: () = assert!(
    STORAGE_NAMESPACE.len() <= NVS_NAME_MAX
        && CONFIG_KEY.len() <= NVS_NAME_MAX
        && BASELINE_KEY.len() <= NVS_NAME_MAX
);

const CONFIG_BUF: usize = 128;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- I2C bus ---
    /// SCL pin
    pub i2c_scl_gpio: i32,
    /// SDA pin
    pub i2c_sda_gpio: i32,
    /// Bus clock (Hz)
    pub i2c_freq_hz: u32,

    // --- Timing ---
    /// Measurement cadence (milliseconds)
    pub measure_interval_ms: u32,
    /// Baseline checkpoint cadence (milliseconds)
    pub baseline_interval_ms: u32,
    /// Settling time after power-on before the first command (milliseconds)
    pub sensor_init_ms: u32,

    // --- Humidity compensation ---
    /// Ambient temperature (°C) until a live sensor is fitted
    pub temperature_c: f32,
    /// Ambient relative humidity (%) until a live sensor is fitted
    pub relative_humidity_pct: f32,

    // --- Storage ---
    pub storage_namespace: heapless::String<15>,
    pub baseline_key: heapless::String<15>,
}

/// Fixed-capacity NVS name, rejecting anything over [`NVS_NAME_MAX`] bytes.
pub fn nvs_name(s: &str) -> Result<heapless::String<NVS_NAME_MAX>, ConfigError> {
    heapless::String::try_from(s)
        .map_err(|_| ConfigError::ValidationFailed("NVS names are limited to 15 bytes"))
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // I2C
            i2c_scl_gpio: 18,
            i2c_sda_gpio: 19,
            i2c_freq_hz: 400_000,

            // Timing
            measure_interval_ms: 1_000,   // 1 Hz, required by the on-chip algorithm
            baseline_interval_ms: 60_000, // 1/min
            sensor_init_ms: 15_000,

            // Test values for humidity compensation
            temperature_c: 25.0,
            relative_humidity_pct: 50.0,

            // Storage
            // Lengths are checked at compile time above.
            storage_namespace: nvs_name(STORAGE_NAMESPACE).unwrap_or_default(),
            baseline_key: nvs_name(BASELINE_KEY).unwrap_or_default(),
        }
    }
}

/// Errors from loading, validating or persisting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage error.
    Storage(StorageError),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl MonitorConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10_000..=1_000_000).contains(&self.i2c_freq_hz) {
            return Err(ConfigError::ValidationFailed(
                "i2c_freq_hz must be 10 kHz–1 MHz",
            ));
        }
        if self.i2c_scl_gpio < 0 || self.i2c_sda_gpio < 0 || self.i2c_scl_gpio == self.i2c_sda_gpio
        {
            return Err(ConfigError::ValidationFailed(
                "I2C pins must be distinct, non-negative GPIO numbers",
            ));
        }
        if self.measure_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "measure_interval_ms must be > 0",
            ));
        }
        if self.baseline_interval_ms < self.measure_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "baseline_interval_ms must be >= measure_interval_ms",
            ));
        }
        if !(-40.0..=85.0).contains(&self.temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "temperature_c must be -40.0–85.0",
            ));
        }
        if !(0.0..=100.0).contains(&self.relative_humidity_pct) {
            return Err(ConfigError::ValidationFailed(
                "relative_humidity_pct must be 0.0–100.0",
            ));
        }
        if self.storage_namespace.is_empty() || self.baseline_key.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "storage_namespace and baseline_key must be non-empty",
            ));
        }
        Ok(())
    }
}

/// Read the persisted config.  Fails with `NotFound`, `Corrupted` or
/// `ValidationFailed`; use [`load_or_default`] at boot.
pub fn load_config(storage: &impl StoragePort) -> Result<MonitorConfig, ConfigError> {
    let mut buf = [0u8; CONFIG_BUF];
    let len = storage
        .read(STORAGE_NAMESPACE, CONFIG_KEY, &mut buf)
        .map_err(|e| match e {
            StorageError::NotFound => ConfigError::NotFound,
            other => ConfigError::Storage(other),
        })?;
    let cfg: MonitorConfig =
        postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Persisted config if present and valid, defaults otherwise.
pub fn load_or_default(storage: &impl StoragePort) -> MonitorConfig {
    match load_config(storage) {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(ConfigError::NotFound) => {
            info!("No stored config, using defaults");
            MonitorConfig::default()
        }
        Err(e) => {
            warn!("Stored config rejected ({}), using defaults", e);
            MonitorConfig::default()
        }
    }
}

/// Validate and persist configuration.
pub fn save_config(storage: &mut impl StoragePort, cfg: &MonitorConfig) -> Result<(), ConfigError> {
    cfg.validate()?;
    let bytes = postcard::to_allocvec(cfg).map_err(|_| ConfigError::Corrupted)?;
    storage
        .write(STORAGE_NAMESPACE, CONFIG_KEY, &bytes)
        .map_err(ConfigError::Storage)?;
    info!("Config saved ({} bytes)", bytes.len());
    Ok(())
}
