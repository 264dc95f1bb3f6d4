//! IAQMon Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Sgp30 (I2C)       LogEventSink   NvsAdapter    SystemClock    │
//! │  (IaqSensorPort)   (EventSink)    (StoragePort) (ClockPort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │       MeasurementScheduler (pure logic)                │    │
//! │  │  warm-up · baseline restore · compensation · commits   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info};

use iaqmon::adapters::log_sink::LogEventSink;
use iaqmon::adapters::nvs::NvsAdapter;
use iaqmon::adapters::time::SystemClock;
use iaqmon::baseline::BaselineStore;
use iaqmon::config;
use iaqmon::scheduler::{CancelToken, MeasurementScheduler};
use iaqmon::sensors::humidity::FixedHumidity;
use iaqmon::sensors::sgp30::Sgp30;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  IAQMon v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {e}"))?;
    let cfg = config::load_or_default(&nvs);
    info!(
        "Config: I2C scl={} sda={} @ {} Hz, measure every {} ms, checkpoint every {} ms",
        cfg.i2c_scl_gpio,
        cfg.i2c_sda_gpio,
        cfg.i2c_freq_hz,
        cfg.measure_interval_ms,
        cfg.baseline_interval_ms
    );

    // ── 3. I2C bus + SGP30 ────────────────────────────────────
    let peripherals = Peripherals::take()?;
    // SAFETY: the pin numbers come from validated config and are not
    // claimed by any other driver in this firmware.
    let sda = unsafe { AnyIOPin::new(cfg.i2c_sda_gpio) };
    let scl = unsafe { AnyIOPin::new(cfg.i2c_scl_gpio) };
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(cfg.i2c_freq_hz));
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_cfg)?;

    let mut sgp30 = Sgp30::new(i2c, FreeRtos);
    let serial = sgp30
        .serial_number()
        .map_err(|e| anyhow!("SGP30 not responding: {e}"))?;
    info!("SGP30 serial: {:012X}", serial);
    if let Err(e) = sgp30.measure_test() {
        error!("SGP30 self-test failed: {}, halting", e);
        return Err(anyhow!(e));
    }

    // ── 4. Scheduler ──────────────────────────────────────────
    let store = BaselineStore::new(nvs, cfg.storage_namespace.clone(), cfg.baseline_key.clone());
    let humidity = FixedHumidity::new(cfg.temperature_c, cfg.relative_humidity_pct);
    let mut scheduler = MeasurementScheduler::new(
        &cfg,
        sgp30,
        store,
        SystemClock::new(),
        humidity,
        LogEventSink::new(),
    );

    info!("System ready. Entering measurement loop.");

    // Never cancelled on target; the loop only ends on a driver failure.
    let cancel = CancelToken::new();
    if let Err(e) = scheduler.run(&cancel) {
        error!("Measurement loop aborted: {}", e);
        return Err(e.into());
    }
    Ok(())
}
