//! Relative → absolute humidity conversion for SGP30 compensation.
//!
//! The SGP30 corrects its humidity cross-sensitivity from an absolute
//! humidity value in g/m³.  The conversion follows the Sensirion datasheet:
//!
//! ```text
//!                    RH/100 · 6.112 · exp(17.62·T / (243.12 + T))
//! AH [g/m³] = 216.7 · ─────────────────────────────────────────────
//!                                  273.15 + T
//! ```
//!
//! The result is encoded as 8.8 fixed point: integer grams in the upper
//! byte, the truncated fraction in 1/256 steps in the lower byte.

use crate::app::ports::HumiditySource;

use super::{AbsoluteHumidity, HumidityReading};

/// Magnus-formula saturation vapour pressure at 0 °C (hPa).
const MAGNUS_BASE_HPA: f64 = 6.112;
const MAGNUS_B: f64 = 17.62;
const MAGNUS_C_DEG: f64 = 243.12;
/// Water vapour constant folded with the hPa→Pa factor (g·K/m³/hPa).
const VAPOUR_FACTOR: f64 = 216.7;
const KELVIN_OFFSET: f64 = 273.15;

/// Absolute humidity in g/m³ (unencoded).
///
/// Computed in `f64` so the fixed-point code is stable across targets.
pub fn absolute_humidity_g_m3(temperature_c: f32, relative_humidity_pct: f32) -> f64 {
    let t = f64::from(temperature_c);
    let rh = f64::from(relative_humidity_pct);
    let saturation_hpa = MAGNUS_BASE_HPA * (MAGNUS_B * t / (MAGNUS_C_DEG + t)).exp();
    VAPOUR_FACTOR * (rh / 100.0 * saturation_hpa) / (KELVIN_OFFSET + t)
}

/// Convert temperature / relative humidity into the sensor's compensation code.
///
/// Pure and total: results below zero (or NaN) map to `0`, which the sensor
/// treats as "compensation off"; results above 255.996 g/m³ saturate at
/// `0xFFFF`.
pub fn convert(temperature_c: f32, relative_humidity_pct: f32) -> AbsoluteHumidity {
    let grams = absolute_humidity_g_m3(temperature_c, relative_humidity_pct);
    if grams.is_nan() || grams <= 0.0 {
        return AbsoluteHumidity(0);
    }

    let whole = grams.trunc();
    let fraction = ((grams - whole) * 256.0).trunc();
    let code = whole * 256.0 + fraction;
    AbsoluteHumidity(code.min(f64::from(u16::MAX)) as u16)
}

/// Convenience wrapper over [`convert`] for a [`HumidityReading`].
pub fn convert_reading(reading: HumidityReading) -> AbsoluteHumidity {
    convert(reading.temperature_c, reading.relative_humidity_pct)
}

/// A humidity source that always reports the same reading.
///
/// Used until a real temperature / humidity sensor is fitted.
#[derive(Debug, Clone, Copy)]
pub struct FixedHumidity {
    reading: HumidityReading,
}

impl FixedHumidity {
    pub fn new(temperature_c: f32, relative_humidity_pct: f32) -> Self {
        Self {
            reading: HumidityReading {
                temperature_c,
                relative_humidity_pct,
            },
        }
    }
}

impl HumiditySource for FixedHumidity {
    fn read(&mut self) -> HumidityReading {
        self.reading
    }
}
