//! Mock hardware for integration tests.
//!
//! A scripted SGP30 that shares a manual clock with the scheduler, so tests
//! can model how long each measurement takes and check exactly when every
//! call happened.

use iaqmon::adapters::nvs::NvsAdapter;
use iaqmon::app::events::AppEvent;
use iaqmon::app::ports::{ClockPort, DriverError, EventSink, IaqSensorPort};
use iaqmon::baseline::{BaselineStore, CalibrationBaseline};
use iaqmon::config::MonitorConfig;
use iaqmon::scheduler::{CancelToken, MeasurementScheduler};
use iaqmon::sensors::humidity::FixedHumidity;
use iaqmon::sensors::{AbsoluteHumidity, MeasurementSample};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ── ManualClock ───────────────────────────────────────────────

/// Millisecond clock that only advances when slept on or advanced by hand.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
    pub sleeps: Rc<RefCell<Vec<u64>>>,
}

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.borrow_mut().push(ms);
        self.advance(ms);
    }
}

// ── MockSgp30 ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SensorCall {
    Init,
    Measure { at_ms: u64 },
    SetBaseline(CalibrationBaseline),
    GetBaseline { at_ms: u64 },
    SetHumidity(AbsoluteHumidity),
}

pub struct MockSgp30 {
    clock: ManualClock,
    pub calls: Vec<SensorCall>,
    /// Work time charged to the clock by each measurement, cycled.
    pub measure_cost_ms: Vec<u64>,
    /// Fail every measurement from this (1-based) count on.
    pub fail_from_measurement: Option<usize>,
    measurements: usize,
}

#[allow(dead_code)]
impl MockSgp30 {
    pub fn new(clock: &ManualClock) -> Self {
        Self {
            clock: clock.clone(),
            calls: Vec::new(),
            measure_cost_ms: vec![12],
            fail_from_measurement: None,
            measurements: 0,
        }
    }

    /// The baseline drifts with every measurement, like the real algorithm.
    pub fn baseline_after(measurements: usize) -> CalibrationBaseline {
        CalibrationBaseline::new(0x8000 + measurements as u16, 0x8800 + measurements as u16)
    }

    pub fn measure_times(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SensorCall::Measure { at_ms } => Some(*at_ms),
                _ => None,
            })
            .collect()
    }

    pub fn humidity_pushes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SensorCall::SetHumidity(_)))
            .count()
    }
}

impl IaqSensorPort for MockSgp30 {
    fn init(&mut self) -> Result<(), DriverError> {
        self.calls.push(SensorCall::Init);
        Ok(())
    }

    fn measure_iaq(&mut self) -> Result<MeasurementSample, DriverError> {
        self.calls.push(SensorCall::Measure {
            at_ms: self.clock.now_ms(),
        });
        self.measurements += 1;
        if self
            .fail_from_measurement
            .is_some_and(|n| self.measurements >= n)
        {
            return Err(DriverError::Bus);
        }
        let cost = self.measure_cost_ms[(self.measurements - 1) % self.measure_cost_ms.len()];
        self.clock.advance(cost);
        Ok(MeasurementSample {
            co2eq_ppm: 400 + self.measurements as u16,
            tvoc_ppb: self.measurements as u16,
        })
    }

    fn set_iaq_baseline(&mut self, baseline: CalibrationBaseline) -> Result<(), DriverError> {
        self.calls.push(SensorCall::SetBaseline(baseline));
        Ok(())
    }

    fn get_iaq_baseline(&mut self) -> Result<CalibrationBaseline, DriverError> {
        self.calls.push(SensorCall::GetBaseline {
            at_ms: self.clock.now_ms(),
        });
        Ok(Self::baseline_after(self.measurements))
    }

    fn set_absolute_humidity(&mut self, code: AbsoluteHumidity) -> Result<(), DriverError> {
        self.calls.push(SensorCall::SetHumidity(code));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Records every event; cancels the run after a set number of measurements.
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
    cancel: CancelToken,
    stop_after: Option<usize>,
    measurements: usize,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new(cancel: &CancelToken, stop_after: Option<usize>) -> Self {
        Self {
            events: Vec::new(),
            cancel: cancel.clone(),
            stop_after,
            measurements: 0,
        }
    }

    pub fn commits(&self) -> Vec<CalibrationBaseline> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::BaselineCommitted(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn measurement_count(&self) -> usize {
        self.measurements
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        if matches!(event, AppEvent::Measurement(_)) {
            self.measurements += 1;
            if self.stop_after.is_some_and(|n| self.measurements >= n) {
                self.cancel.cancel();
            }
        }
        self.events.push(event.clone());
    }
}

// ── Assembly ──────────────────────────────────────────────────

pub type TestScheduler = MeasurementScheduler<
    MockSgp30,
    BaselineStore<NvsAdapter>,
    ManualClock,
    FixedHumidity,
    RecordingSink,
>;

pub fn baseline_store(nvs: NvsAdapter) -> BaselineStore<NvsAdapter> {
    let cfg = MonitorConfig::default();
    BaselineStore::new(nvs, cfg.storage_namespace, cfg.baseline_key)
}

/// Scheduler with default config over `nvs`, stopping after `ticks`
/// measurements.
pub fn build(nvs: NvsAdapter, ticks: usize) -> (TestScheduler, ManualClock, CancelToken) {
    build_with(nvs, ticks, |_| {})
}

/// Like [`build`], letting the caller script the mock sensor first.
pub fn build_with(
    nvs: NvsAdapter,
    ticks: usize,
    setup: impl FnOnce(&mut MockSgp30),
) -> (TestScheduler, ManualClock, CancelToken) {
    let cfg = MonitorConfig::default();
    let clock = ManualClock::default();
    let cancel = CancelToken::new();
    let mut sensor = MockSgp30::new(&clock);
    setup(&mut sensor);
    let sched = MeasurementScheduler::new(
        &cfg,
        sensor,
        baseline_store(nvs),
        clock.clone(),
        FixedHumidity::new(cfg.temperature_c, cfg.relative_humidity_pct),
        RecordingSink::new(&cancel, Some(ticks)),
    );
    (sched, clock, cancel)
}
