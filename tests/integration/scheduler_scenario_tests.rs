//! End-to-end scheduler scenarios: mock sensor, real NVS adapter (host
//! backend), real baseline store, manual clock.

use crate::mock_hw::{MockSgp30, SensorCall, build, build_with, baseline_store};
use iaqmon::adapters::log_sink::render;
use iaqmon::adapters::nvs::NvsAdapter;
use iaqmon::app::events::{AppEvent, MissingReason};
use iaqmon::app::ports::{BaselineError, BaselinePort, DriverError, StoragePort};
use iaqmon::baseline::CalibrationBaseline;
use iaqmon::error::Error;
use iaqmon::scheduler::Phase;
use iaqmon::sensors::AbsoluteHumidity;

fn fresh_nvs() -> NvsAdapter {
    NvsAdapter::new().unwrap()
}

fn nvs_with_record(bytes: &[u8]) -> NvsAdapter {
    let mut nvs = fresh_nvs();
    nvs.write("iaqmon", "sgp30_baseline", bytes).unwrap();
    nvs
}

#[test]
fn first_boot_without_baseline_commits_after_one_minute() {
    let (mut sched, _clock, cancel) = build(fresh_nvs(), 61);
    sched.run(&cancel).unwrap();

    let events = &sched.sink().events;
    assert_eq!(events[0], AppEvent::WarmedUp { after_ms: 15_000 });
    assert_eq!(events[1], AppEvent::BaselineMissing(MissingReason::NotFound));
    assert_eq!(
        events[2],
        AppEvent::HumidityCompensated(AbsoluteHumidity(2939))
    );
    assert_eq!(
        render(&events[1]),
        "No valid baseline found. You should wait 12 hours for calibration before use."
    );

    assert_eq!(sched.tick_count(), 61);
    assert_eq!(sched.commit_count(), 1);
    let expected = MockSgp30::baseline_after(61);
    assert_eq!(sched.sink().commits(), vec![expected]);
    assert_eq!(sched.store().load(), Ok(expected));
}

#[test]
fn sixty_ticks_end_just_before_first_commit() {
    // Indices 0..=59 only; the first checkpoint belongs to index 60.
    let (mut sched, _clock, cancel) = build(fresh_nvs(), 60);
    sched.run(&cancel).unwrap();
    assert_eq!(sched.commit_count(), 0);
    assert_eq!(sched.store().load(), Err(BaselineError::NotFound));
    assert!(
        !sched
            .sensor()
            .calls
            .iter()
            .any(|c| matches!(c, SensorCall::GetBaseline { .. }))
    );
}

#[test]
fn stored_baseline_is_restored_before_first_measurement() {
    let (mut sched, _clock, cancel) = build(nvs_with_record(b"[36000, 36000]"), 1);
    sched.run(&cancel).unwrap();

    let restored = CalibrationBaseline::new(36000, 36000);
    let calls = &sched.sensor().calls;
    assert_eq!(calls[0], SensorCall::Init);
    assert_eq!(calls[1], SensorCall::SetBaseline(restored));
    assert_eq!(calls[2], SensorCall::SetHumidity(AbsoluteHumidity(2939)));
    assert!(matches!(calls[3], SensorCall::Measure { at_ms: 15_000 }));

    let found = &sched.sink().events[1];
    assert_eq!(*found, AppEvent::BaselineRestored(restored));
    assert_eq!(render(found), "Baseline found: [36000, 36000]");
}

#[test]
fn corrupt_record_is_reported_and_humidity_still_pushed() {
    let (mut sched, _clock, cancel) = build(nvs_with_record(b"not json"), 1);
    sched.run(&cancel).unwrap();

    assert_eq!(
        sched.sink().events[1],
        AppEvent::BaselineMissing(MissingReason::Corrupt)
    );
    let calls = &sched.sensor().calls;
    assert!(
        !calls
            .iter()
            .any(|c| matches!(c, SensorCall::SetBaseline(_)))
    );
    assert_eq!(calls[1], SensorCall::SetHumidity(AbsoluteHumidity(2939)));
}

#[test]
fn measurements_start_on_a_fixed_cadence() {
    let (mut sched, clock, cancel) = build_with(fresh_nvs(), 6, |s| {
        s.measure_cost_ms = vec![12, 250, 999];
    });
    sched.run(&cancel).unwrap();

    let starts = sched.sensor().measure_times();
    assert_eq!(
        starts,
        vec![15_000, 16_000, 17_000, 18_000, 19_000, 20_000]
    );
    // Warm-up, then one pacing sleep between each pair of ticks.
    assert_eq!(
        clock.sleeps.borrow().as_slice(),
        &[15_000, 988, 750, 1, 988, 750]
    );
}

#[test]
fn overrunning_measurement_starts_next_tick_immediately() {
    let (mut sched, clock, cancel) = build_with(fresh_nvs(), 3, |s| {
        s.measure_cost_ms = vec![1_500, 12];
    });
    sched.run(&cancel).unwrap();

    assert_eq!(sched.sensor().measure_times(), vec![15_000, 16_500, 17_500]);
    assert_eq!(clock.sleeps.borrow()[1], 0);
}

#[test]
fn three_minutes_give_three_commits() {
    let (mut sched, _clock, cancel) = build(fresh_nvs(), 181);
    sched.run(&cancel).unwrap();

    assert_eq!(sched.commit_count(), 3);
    let reads: Vec<u64> = sched
        .sensor()
        .calls
        .iter()
        .filter_map(|c| match c {
            SensorCall::GetBaseline { at_ms } => Some(*at_ms),
            _ => None,
        })
        .collect();
    assert_eq!(reads, vec![75_012, 135_012, 195_012]);
    assert_eq!(
        sched.store().load(),
        Ok(MockSgp30::baseline_after(181))
    );
}

#[test]
fn compensation_is_pushed_every_tick() {
    let (mut sched, _clock, cancel) = build(fresh_nvs(), 5);
    sched.run(&cancel).unwrap();
    // One at start, one per tick.
    assert_eq!(sched.sensor().humidity_pushes(), 6);
}

#[test]
fn driver_failure_aborts_the_loop() {
    let (mut sched, _clock, cancel) = build_with(fresh_nvs(), 100, |s| {
        s.fail_from_measurement = Some(5);
    });
    assert_eq!(sched.run(&cancel), Err(Error::Driver(DriverError::Bus)));
    assert_eq!(sched.tick_count(), 5);
    assert_eq!(sched.sink().measurement_count(), 4);
    assert!(!cancel.is_cancelled());
}

#[test]
fn failed_nvs_write_is_not_fatal() {
    let mut nvs = fresh_nvs();
    nvs.fail_writes(true);
    let (mut sched, _clock, cancel) = build(nvs, 61);
    sched.run(&cancel).unwrap();

    assert_eq!(sched.phase(), Phase::Running);
    assert_eq!(sched.commit_count(), 0);
    assert!(sched.sink().commits().is_empty());
    assert!(
        sched
            .sink()
            .events
            .contains(&AppEvent::BaselineCommitFailed(MockSgp30::baseline_after(61)))
    );
    assert_eq!(sched.store().load(), Err(BaselineError::NotFound));
}

#[test]
fn restart_restores_last_committed_baseline() {
    let (mut sched, _clock, cancel) = build(fresh_nvs(), 61);
    sched.run(&cancel).unwrap();
    let committed = MockSgp30::baseline_after(61);

    let (_, store, _, _, _) = sched.into_parts();
    let nvs = store.into_inner();

    let (mut rebooted, _clock, cancel) = build(nvs, 1);
    rebooted.run(&cancel).unwrap();
    assert_eq!(
        rebooted.sensor().calls[1],
        SensorCall::SetBaseline(committed)
    );
    assert_eq!(
        rebooted.sink().events[1],
        AppEvent::BaselineRestored(committed)
    );
}

#[test]
fn scheduler_store_matches_standalone_store() {
    let (mut sched, _clock, cancel) = build(fresh_nvs(), 61);
    sched.run(&cancel).unwrap();
    let (_, store, _, _, _) = sched.into_parts();

    let reopened = baseline_store(store.into_inner());
    assert_eq!(reopened.load(), Ok(MockSgp30::baseline_after(61)));
}
