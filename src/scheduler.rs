//! Measurement scheduler: the monitor's only control loop.
//!
//! ```text
//!  ┌──────┐  warm-up   ┌───────────┐  humidity pushed  ┌─────────┐
//!  │ Init │ ─────────▶ │ Calibrate │ ────────────────▶ │ Running │ ◀─┐
//!  └──────┘            └───────────┘                   └────┬────┘   │
//!                        load baseline                      │ tick   │
//!                        (found / not found / corrupt)      └────────┘
//! ```
//!
//! Each tick measures, re-applies humidity compensation and, once per
//! baseline interval, checkpoints the sensor's baseline.  Ticks are paced
//! to the measurement interval: the sleep after a tick is the interval minus
//! the time the tick itself took, never negative.
//!
//! The scheduler is strictly sequential.  It owns every port it uses, so no
//! locking is needed and a checkpoint can never overlap a measurement.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::app::events::{AppEvent, MissingReason};
use crate::app::ports::{
    BaselineError, BaselinePort, ClockPort, EventSink, HumiditySource, IaqSensorPort,
};
use crate::baseline::CalibrationBaseline;
use crate::config::MonitorConfig;
use crate::error::Result;
use crate::sensors::{AbsoluteHumidity, MeasurementSample, humidity};

/// Milliseconds left in the current interval, clamped at zero.
pub fn remaining_sleep_ms(interval_ms: u64, elapsed_ms: u64) -> u64 {
    interval_ms.saturating_sub(elapsed_ms)
}

/// Cooperative stop signal shared between the scheduler and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Driver set up, waiting out the warm-up delay.
    Init,
    /// Restoring the baseline and pushing the first compensation value.
    Calibrate,
    /// Steady-state measurement loop.
    Running,
}

/// Result of a baseline checkpoint attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Saved(CalibrationBaseline),
    Failed(CalibrationBaseline),
}

/// What one tick did, and how long to sleep before the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub sample: MeasurementSample,
    pub commit: Option<CommitOutcome>,
    pub sleep_ms: u64,
}

/// The orchestrator: owns the sensor, baseline store, clock, humidity
/// source and event sink.
pub struct MeasurementScheduler<S, B, C, H, E> {
    sensor: S,
    store: B,
    clock: C,
    humidity: H,
    sink: E,

    measure_interval_ms: u64,
    baseline_interval_ms: u64,
    sensor_init_ms: u64,

    phase: Phase,
    last_commit_ms: u64,
    tick_count: u64,
    commit_count: u64,
}

impl<S, B, C, H, E> MeasurementScheduler<S, B, C, H, E>
where
    S: IaqSensorPort,
    B: BaselinePort,
    C: ClockPort,
    H: HumiditySource,
    E: EventSink,
{
    pub fn new(
        config: &MonitorConfig,
        sensor: S,
        store: B,
        clock: C,
        humidity: H,
        sink: E,
    ) -> Self {
        Self {
            sensor,
            store,
            clock,
            humidity,
            sink,
            measure_interval_ms: u64::from(config.measure_interval_ms),
            baseline_interval_ms: u64::from(config.baseline_interval_ms),
            sensor_init_ms: u64::from(config.sensor_init_ms),
            phase: Phase::Init,
            last_commit_ms: 0,
            tick_count: 0,
            commit_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run `Init` and `Calibrate`, leaving the scheduler in `Running`.
    ///
    /// The warm-up sleep is not interruptible.  Humidity compensation is
    /// pushed exactly once here whatever the baseline restore did; a driver
    /// error from the restore is reported only after that push.
    pub fn start(&mut self) -> Result<()> {
        self.phase = Phase::Init;
        self.sensor.init()?;
        info!("Scheduler: sensor initialised, warming up for {} ms", self.sensor_init_ms);
        self.clock.sleep_ms(self.sensor_init_ms);
        self.sink.emit(&AppEvent::WarmedUp {
            after_ms: self.sensor_init_ms as u32,
        });

        self.phase = Phase::Calibrate;
        let restored = self.restore_baseline();
        let compensated = self.compensate();
        restored?;
        compensated?;

        self.last_commit_ms = self.clock.now_ms();
        self.phase = Phase::Running;
        info!("Scheduler: running ({} ms cadence)", self.measure_interval_ms);
        Ok(())
    }

    /// One measurement tick.  Starts the scheduler first if needed.
    ///
    /// Does not sleep; the returned `sleep_ms` is what [`run`](Self::run)
    /// waits before the next tick.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.phase != Phase::Running {
            self.start()?;
        }

        let tick_start_ms = self.clock.now_ms();
        self.tick_count += 1;

        let sample = self.sensor.measure_iaq()?;
        self.sink.emit(&AppEvent::Measurement(sample));

        self.compensate()?;

        // Inclusive: with 1 s pacing the first checkpoint lands on tick
        // index 60 (the 61st tick), 60 s after calibration.
        let since_commit_ms = self.clock.now_ms().saturating_sub(self.last_commit_ms);
        let commit = if since_commit_ms >= self.baseline_interval_ms {
            Some(self.commit_baseline()?)
        } else {
            None
        };

        let elapsed_ms = self.clock.now_ms().saturating_sub(tick_start_ms);
        Ok(TickOutcome {
            sample,
            commit,
            sleep_ms: remaining_sleep_ms(self.measure_interval_ms, elapsed_ms),
        })
    }

    /// Start, then tick until `cancel` fires or the driver fails.
    ///
    /// `cancel` is checked before every tick and before every sleep.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<()> {
        if self.phase != Phase::Running {
            self.start()?;
        }

        loop {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = self.tick()?;
            if cancel.is_cancelled() {
                break;
            }
            self.clock.sleep_ms(outcome.sleep_ms);
        }

        info!(
            "Scheduler: stopped after {} ticks, {} commits",
            self.tick_count, self.commit_count
        );
        Ok(())
    }

    // ── Steps ─────────────────────────────────────────────────

    fn restore_baseline(&mut self) -> Result<Option<CalibrationBaseline>> {
        match self.store.load() {
            Ok(baseline) => {
                debug!("Scheduler: restoring baseline {}", baseline);
                self.sensor.set_iaq_baseline(baseline)?;
                self.sink.emit(&AppEvent::BaselineRestored(baseline));
                Ok(Some(baseline))
            }
            Err(BaselineError::NotFound) => {
                self.sink.emit(&AppEvent::BaselineMissing(MissingReason::NotFound));
                Ok(None)
            }
            Err(e) => {
                debug!("Scheduler: stored baseline unusable ({})", e);
                self.sink.emit(&AppEvent::BaselineMissing(MissingReason::Corrupt));
                Ok(None)
            }
        }
    }

    /// Recompute the humidity code from a fresh reading and push it.
    fn compensate(&mut self) -> Result<AbsoluteHumidity> {
        let code = humidity::convert_reading(self.humidity.read());
        self.sensor.set_absolute_humidity(code)?;
        self.sink.emit(&AppEvent::HumidityCompensated(code));
        Ok(code)
    }

    /// Read and persist the current baseline.  A failed write is logged and
    /// skipped; the commit timestamp advances either way, so the next attempt
    /// is one full interval later.
    fn commit_baseline(&mut self) -> Result<CommitOutcome> {
        let baseline = self.sensor.get_iaq_baseline()?;
        let outcome = match self.store.save(baseline) {
            Ok(()) => {
                self.commit_count += 1;
                self.sink.emit(&AppEvent::BaselineCommitted(baseline));
                CommitOutcome::Saved(baseline)
            }
            Err(e) => {
                debug!("Scheduler: baseline commit failed ({})", e);
                self.sink.emit(&AppEvent::BaselineCommitFailed(baseline));
                CommitOutcome::Failed(baseline)
            }
        };
        self.last_commit_ms = self.clock.now_ms();
        Ok(outcome)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Measurement ticks executed since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Successful baseline checkpoints since construction.
    pub fn commit_count(&self) -> u64 {
        self.commit_count
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Tear down and hand back every port (e.g. to reuse storage after a
    /// simulated power cycle).
    pub fn into_parts(self) -> (S, B, C, H, E) {
        (self.sensor, self.store, self.clock, self.humidity, self.sink)
    }
}
