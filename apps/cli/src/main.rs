mod args;
mod config;
mod dirs;
mod replay;
mod trace;

use std::io::{self, Read};

use args::Command;
use log::{info, warn};
use step_accounting::StepAccountant;
use steps_app::{AppPaths, AppState, RangeParams, ensure_app_data_dir, resolve_range};
use steps_core::{DayCode, StepSnapshot};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        info!(
            "created config at {} (stride {} m)",
            config.paths.file.display(),
            config.config.stride_length_m
        );
    }

    let override_dir = args.data_dir.as_deref().or(config.config.data_dir.as_deref());
    let data_dir = dirs::resolve_data_dir(override_dir).map_err(io::Error::other)?;
    if data_dir.matched_existing {
        info!("using existing data dir: {}", data_dir.dir.display());
    } else {
        info!("using data dir: {}", data_dir.dir.display());
    }

    let paths = AppPaths::new(data_dir.dir);
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;
    let app_state = AppState::new(paths.db_path);
    app_state
        .initialize()
        .map_err(|err| io::Error::other(format!("failed to initialize database: {}", err)))?;
    if let Err(err) = app_state.services.settings.update(
        Some(config.config.stride_length_m),
        Some(config.config.heartbeat_interval_ms()),
    ) {
        warn!("failed to sync settings from config: {}", err);
    }

    let today = DayCode::today_local();
    match args.command {
        Command::Status => status(&app_state, args.stride, args.json)?,
        Command::History { range, start, end } => {
            let params = RangeParams { range, start, end };
            history(&app_state, &params, today, args.json)?
        }
        Command::Replay { source } => {
            let text = read_trace(&source)?;
            let commands = trace::parse_trace(&text)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            let report = replay::replay(&app_state, &commands, args.stride, today).await?;
            if args.json {
                for snapshot in &report.snapshots {
                    println!("{}", serde_json::to_string(snapshot)?);
                }
                println!("{}", serde_json::to_string(&report.update)?);
            } else {
                for snapshot in &report.snapshots {
                    print_snapshot(snapshot);
                }
                if report.skipped > 0 {
                    println!("skipped {} readings not matching {} mode", report.skipped, report.mode);
                }
                print_update(&report.update);
            }
        }
    }
    Ok(())
}

fn status(
    app_state: &AppState,
    stride: Option<f64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = app_state.accounting_settings()?;
    if let Some(stride) = stride {
        settings.stride_length_m = stride;
    }
    // not started: this only restores today's persisted state
    let accountant: StepAccountant = app_state
        .accountant(|_snapshot: StepSnapshot| {})?
        .settings(settings)
        .build();
    let update = app_state.services.sync.profile_update(&accountant)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&update)?);
    } else {
        print_update(&update);
    }
    Ok(())
}

fn history(
    app_state: &AppState,
    params: &RangeParams,
    today: DayCode,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let range = resolve_range(params, today)?;
    let totals = app_state.services.history.day_totals(&range)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }
    if totals.is_empty() {
        println!("no steps recorded between {} and {}", range.start, range.end);
        return Ok(());
    }
    for total in &totals {
        println!("{}  {:>7}", total.day, total.steps);
    }
    let sum = totals
        .iter()
        .fold(0u64, |acc, total| acc.saturating_add(total.steps));
    println!("total     {:>7}", sum);
    Ok(())
}

fn read_trace(source: &str) -> io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(source)
}

fn print_snapshot(snapshot: &StepSnapshot) {
    println!(
        "{}  {:>7} steps  {:.2} km",
        snapshot.day, snapshot.steps_today, snapshot.distance_km
    );
}

fn print_update(update: &steps_app::ProfileUpdate) {
    println!("day:        {}", update.day);
    println!("steps:      {}", update.steps_today);
    println!("distance:   {:.2} km", update.distance_today_km);
    println!("this week:  {:.2} km", update.distance_week_km);
    match &update.daily_record {
        Some(record) => println!("record:     {} steps on {}", record.steps, record.day),
        None => println!("record:     none yet"),
    }
}
