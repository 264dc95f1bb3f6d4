//! Outbound application events.
//!
//! The [`MeasurementScheduler`](crate::scheduler::MeasurementScheduler) emits
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to serial, publish over
//! MQTT, etc.

use crate::baseline::CalibrationBaseline;
use crate::sensors::{AbsoluteHumidity, MeasurementSample};

/// Why no baseline could be restored at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// First boot, nothing was ever checkpointed.
    NotFound,
    /// A record exists but did not decode.
    Corrupt,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Warm-up finished; the scheduler is about to calibrate.
    WarmedUp { after_ms: u32 },

    /// A stored baseline was pushed into the sensor.
    BaselineRestored(CalibrationBaseline),

    /// No usable baseline; accuracy is degraded until the sensor's own
    /// early-operation phase completes.
    BaselineMissing(MissingReason),

    /// Humidity compensation pushed to the sensor.
    HumidityCompensated(AbsoluteHumidity),

    /// One measurement tick's result.
    Measurement(MeasurementSample),

    /// The current baseline was checkpointed to storage.
    BaselineCommitted(CalibrationBaseline),

    /// The checkpoint write failed; it is retried on the next interval.
    BaselineCommitFailed(CalibrationBaseline),
}
