use step_accounting::{ManualClock, ManualSensor};
use steps_app::{AppError, AppPaths, AppState, RangeParams, ensure_app_data_dir, resolve_range};
use steps_core::{DayCode, SensorEvent, StepSnapshot};
use tempfile::tempdir;

fn day(value: &str) -> DayCode {
    DayCode::parse(value).expect("day code")
}

fn ignore(_snapshot: StepSnapshot) {}

fn app_state(dir: &std::path::Path) -> AppState {
    let paths = AppPaths::new(dir.join("data"));
    ensure_app_data_dir(&paths).expect("data dir");
    let app_state = AppState::new(paths.db_path);
    assert!(app_state.is_fresh_db());
    app_state.initialize().expect("initialize");
    assert!(!app_state.is_fresh_db());
    app_state
}

#[test]
fn settings_round_trip_into_accountant() {
    let dir = tempdir().expect("temp dir");
    let app_state = app_state(dir.path());

    let defaults = app_state.services.settings.get().expect("settings");
    assert_eq!(defaults.stride_length_m, 0.78);
    assert_eq!(defaults.heartbeat_interval_ms, 5_000);

    app_state
        .services
        .settings
        .update(Some(0.8), Some(0))
        .expect("update");
    let err = app_state.services.settings.update(Some(-1.0), None);
    assert!(matches!(err, Err(AppError::InvalidInput(_))));

    let settings = app_state.accounting_settings().expect("settings");
    assert_eq!(settings.stride_length_m, 0.8);
    assert!(settings.heartbeat_interval.is_zero());

    let sensor = ManualSensor::counter();
    let mut accountant = app_state
        .accountant(ignore)
        .expect("accountant")
        .sensor(sensor.clone())
        .clock(ManualClock::new(day("20250314")))
        .build();
    accountant.start().expect("start");
    sensor.emit(SensorEvent::Counter(100.0));
    sensor.emit(SensorEvent::Counter(1_100.0));
    assert_eq!(accountant.steps_today(), 1_000);
    assert_eq!(accountant.distance_today_km(), 0.8);
}

#[test]
fn history_and_profile_update_follow_rollover() {
    let dir = tempdir().expect("temp dir");
    let app_state = app_state(dir.path());
    app_state
        .services
        .settings
        .update(None, Some(0))
        .expect("disable heartbeat");

    let clock = ManualClock::new(day("20250313"));
    let sensor = ManualSensor::counter();
    let mut accountant = app_state
        .accountant(ignore)
        .expect("accountant")
        .sensor(sensor.clone())
        .clock(clock.clone())
        .build();
    accountant.start().expect("start");
    sensor.emit(SensorEvent::Counter(0.0));
    sensor.emit(SensorEvent::Counter(3_000.0));
    clock.advance_days(1);
    sensor.emit(SensorEvent::Counter(3_000.0));
    sensor.emit(SensorEvent::Counter(4_000.0));

    let update = app_state
        .services
        .sync
        .profile_update(&accountant)
        .expect("profile update");
    assert_eq!(update.day, day("20250314"));
    assert_eq!(update.steps_today, 1_000);
    assert_eq!(update.distance_today_km, 0.78);
    assert_eq!(update.distance_week_km, 3.12);
    let record = update.daily_record.expect("record");
    assert_eq!(record.steps, 3_000);
    assert_eq!(record.day, day("20250313"));

    let history = &app_state.services.history;
    let range = resolve_range(&RangeParams::default(), day("20250314")).expect("range");
    let totals = history.day_totals(&range).expect("totals");
    let steps: Vec<u64> = totals.iter().map(|total| total.steps).collect();
    assert_eq!(steps, vec![3_000, 1_000]);

    let best = history.best_day().expect("best").expect("some day");
    assert_eq!(best.day, day("20250313"));
    assert_eq!(history.week_summary(day("20250314")).expect("week").steps, 4_000);
    assert_eq!(history.daily_record().expect("record"), Some(record));
}
