use std::path::Path;
use std::time::Duration;

use step_accounting::{ChannelListener, ManualClock, ManualSensor, StepAccountant, StepStore};
use steps_core::{AccountingSettings, DayCode, SensorEvent, SensorMode, StepSnapshot};
use steps_db::Db;

fn day(value: &str) -> DayCode {
    DayCode::parse(value).expect("day code")
}

fn open_db(path: &Path) -> Db {
    let mut db = Db::open(path).expect("open db");
    db.migrate().expect("migrate db");
    db
}

fn ignore(_snapshot: StepSnapshot) {}

fn no_heartbeat() -> AccountingSettings {
    AccountingSettings {
        heartbeat_interval: Duration::ZERO,
        ..AccountingSettings::default()
    }
}

#[test]
fn steps_survive_process_restart_on_sqlite() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("steps.sqlite");
    let today = day("20250314");

    {
        let sensor = ManualSensor::counter();
        let mut accountant = StepAccountant::builder(open_db(&db_path), ignore)
            .sensor(sensor.clone())
            .clock(ManualClock::new(today))
            .settings(no_heartbeat())
            .build();
        accountant.start().expect("start");
        sensor.emit(SensorEvent::Counter(800.0));
        sensor.emit(SensorEvent::Counter(1_000.0));
        assert_eq!(accountant.steps_today(), 200);
        accountant.stop();
    }

    // simulate a lost calibration row; the counter reading rebuilds it
    {
        let db = open_db(&db_path);
        let mut state = db.day_state(today).expect("load").expect("row");
        state.calibration_offset = None;
        db.put_day_state(today, &state).expect("clear offset");
    }

    let sensor = ManualSensor::counter();
    let mut accountant = StepAccountant::builder(open_db(&db_path), ignore)
        .sensor(sensor.clone())
        .clock(ManualClock::new(today))
        .settings(no_heartbeat())
        .build();
    assert_eq!(accountant.steps_today(), 200);
    accountant.start().expect("start");
    sensor.emit(SensorEvent::Counter(1_005.0));
    assert_eq!(accountant.steps_today(), 205);

    let db = open_db(&db_path);
    let state = StepStore::day_state(&db, today).expect("load").expect("row");
    assert_eq!(state.calibration_offset, Some(800.0));
    assert_eq!(state.steps_today, 205);
}

#[test]
fn rollover_writes_record_and_history_to_sqlite() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("steps.sqlite");
    let clock = ManualClock::new(day("20250310"));
    let sensor = ManualSensor::counter();
    let mut accountant = StepAccountant::builder(open_db(&db_path), ignore)
        .sensor(sensor.clone())
        .clock(clock.clone())
        .settings(no_heartbeat())
        .build();
    accountant.start().expect("start");

    let readings = [
        (0.0, false),
        (4_000.0, false),
        (4_000.0, true),
        (6_500.0, false),
        (6_600.0, true),
        (6_700.0, false),
    ];
    for (raw, next_day) in readings {
        if next_day {
            clock.advance_days(1);
        }
        sensor.emit(SensorEvent::Counter(raw));
    }
    // 4000 on the 10th, 2500 on the 11th, 100 on the 12th
    assert_eq!(accountant.steps_today(), 100);
    let record = accountant.daily_record().expect("record");
    assert_eq!(record.steps, 4_000);
    assert_eq!(record.day, day("20250310"));

    let week = accountant.week_summary().expect("week");
    assert_eq!(week.steps, 6_600);
    assert_eq!(week.days.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn channel_listener_hands_snapshots_to_host_task() {
    let (listener, mut rx) = ChannelListener::new();
    let sensor = ManualSensor::counter();
    let mut accountant = StepAccountant::builder(step_accounting::MemoryStore::new(), listener)
        .sensor(sensor.clone())
        .clock(ManualClock::new(day("20250314")))
        .build();

    assert_eq!(accountant.start().expect("start"), SensorMode::Cumulative);
    sensor.emit(SensorEvent::Counter(50.0));
    sensor.emit(SensorEvent::Counter(75.0));

    let first = rx.recv().await.expect("initial snapshot");
    assert_eq!(first.steps_today, 0);
    let second = rx.recv().await.expect("change snapshot");
    assert_eq!(second.steps_today, 25);

    let heartbeat = rx.recv().await.expect("heartbeat snapshot");
    assert_eq!(heartbeat.steps_today, 25);
    assert_eq!(heartbeat.day, day("20250314"));
    accountant.stop();
}
