//! Sensor subsystem: the SGP30 driver, humidity compensation, and the
//! value types that flow between them and the scheduler.

pub mod humidity;
pub mod sgp30;

/// One IAQ measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementSample {
    /// CO2-equivalent concentration in ppm.
    pub co2eq_ppm: u16,
    /// Total volatile organic compounds in ppb.
    pub tvoc_ppb: u16,
}

/// Ambient temperature and relative humidity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityReading {
    pub temperature_c: f32,
    pub relative_humidity_pct: f32,
}

/// Absolute humidity in the sensor's 8.8 fixed-point g/m³ format.
///
/// The upper byte is the integer part, the lower byte the fraction in
/// 1/256 steps.  `0` disables the sensor's compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbsoluteHumidity(pub u16);

impl AbsoluteHumidity {
    /// Raw fixed-point code as sent over the bus.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Decoded value in g/m³.
    pub fn grams_per_m3(self) -> f32 {
        f32::from(self.0) / 256.0
    }
}

impl core::fmt::Display for AbsoluteHumidity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3} g/m3 (0x{:04X})", self.grams_per_m3(), self.0)
    }
}
