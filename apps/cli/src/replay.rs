use std::time::Duration;

use log::{info, warn};
use step_accounting::{ChannelListener, ManualClock, ManualSensor, MemoryStore, StepAccountant};
use steps_app::{AppError, AppState, ProfileUpdate};
use steps_core::{DayCode, SensorMode, StepSnapshot};

use crate::trace::TraceCommand;

#[derive(Debug)]
pub struct ReplayReport {
    pub mode: SensorMode,
    pub snapshots: Vec<StepSnapshot>,
    pub skipped: usize,
    pub update: ProfileUpdate,
}

/// Feeds `commands` through a simulated sensor and a manual clock into a
/// scratch store, so stored step data is never touched; only the persisted
/// settings are read. Snapshots are collected on a separate task, the way a
/// host consumes them on its main context.
pub async fn replay(
    app_state: &AppState,
    commands: &[TraceCommand],
    stride_override: Option<f64>,
    today: DayCode,
) -> Result<ReplayReport, AppError> {
    let start_day = match commands.first() {
        Some(TraceCommand::Day(day)) => *day,
        _ => today,
    };
    let uses_counter = commands
        .iter()
        .any(|command| matches!(command, TraceCommand::Counter(_)));
    let sensor = if uses_counter {
        ManualSensor::counter()
    } else {
        ManualSensor::detector()
    };
    let clock = ManualClock::new(start_day);

    let mut settings = app_state.accounting_settings()?;
    if let Some(stride) = stride_override {
        settings.stride_length_m = stride;
    }
    // replays run faster than any heartbeat; `tick` stands in for it
    settings.heartbeat_interval = Duration::ZERO;

    let (listener, mut rx) = ChannelListener::new();
    let collector = tokio::spawn(async move {
        let mut snapshots = Vec::new();
        while let Some(snapshot) = rx.recv().await {
            snapshots.push(snapshot);
        }
        snapshots
    });

    let mut accountant = StepAccountant::builder(MemoryStore::new(), listener)
        .sensor(sensor.clone())
        .clock(clock.clone())
        .settings(settings)
        .build();
    let mode = accountant.start()?;
    info!("replaying {} trace lines in {} mode", commands.len(), mode);

    let mut skipped = 0;
    for command in commands {
        match command {
            TraceCommand::Day(day) => {
                let current = accountant.day();
                if *day < current {
                    return Err(AppError::InvalidInput(format!(
                        "trace moves the clock back from {} to {}",
                        current, day
                    )));
                }
                clock.set(*day);
            }
            TraceCommand::Tick => {
                accountant.refresh();
            }
            TraceCommand::Counter(_) | TraceCommand::Detect(_) => {
                let Some(event) = command.event() else {
                    continue;
                };
                if event.mode() != mode {
                    warn!("skipping {} reading while in {} mode", event.mode(), mode);
                    skipped += 1;
                    continue;
                }
                sensor.emit(event);
            }
        }
    }

    let update = ProfileUpdate::from_accountant(&accountant)?;
    accountant.stop();
    // dropping the accountant closes the snapshot channel
    drop(accountant);
    let snapshots = collector
        .await
        .map_err(|err| AppError::Message(format!("snapshot collector failed: {}", err)))?;

    Ok(ReplayReport {
        mode,
        snapshots,
        skipped,
        update,
    })
}
