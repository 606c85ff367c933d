use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Command {
    #[default]
    Status,
    Replay {
        source: String,
    },
    History {
        range: Option<String>,
        start: Option<String>,
        end: Option<String>,
    },
}

#[derive(Debug, Default)]
pub struct CliArgs {
    pub data_dir: Option<PathBuf>,
    pub stride: Option<f64>,
    pub json: bool,
    pub command: Command,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(env::args().skip(1))
}

fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();
    let mut command: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut range = None;
    let mut start = None;
    let mut end = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let value = required(&mut args, "--data-dir")?;
                parsed.data_dir = Some(PathBuf::from(value));
            }
            "--stride" => {
                let value = required(&mut args, "--stride")?;
                let stride = value
                    .parse::<f64>()
                    .ok()
                    .filter(|stride| stride.is_finite() && *stride > 0.0)
                    .ok_or_else(|| format!("invalid stride value: {value}"))?;
                parsed.stride = Some(stride);
            }
            "--json" => {
                parsed.json = true;
            }
            "--range" => range = Some(required(&mut args, "--range")?),
            "--start" => start = Some(required(&mut args, "--start")?),
            "--end" => end = Some(required(&mut args, "--end")?),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "-" => positional.push(arg),
            _ if arg.starts_with('-') => {
                return Err(format!("unknown argument: {arg}"));
            }
            _ if command.is_none() => command = Some(arg),
            _ => positional.push(arg),
        }
    }

    let history_flags = range.is_some() || start.is_some() || end.is_some();
    parsed.command = match command.as_deref().unwrap_or("status") {
        "status" => Command::Status,
        "replay" => {
            let source = match positional.len() {
                1 => positional.remove(0),
                0 => return Err("replay needs a trace file or '-'".to_string()),
                _ => return Err("replay takes a single trace source".to_string()),
            };
            Command::Replay { source }
        }
        "history" => Command::History { range, start, end },
        other => return Err(format!("unknown command: {other}")),
    };
    if history_flags && !matches!(parsed.command, Command::History { .. }) {
        return Err("--range, --start and --end only apply to history".to_string());
    }
    if !matches!(parsed.command, Command::Replay { .. }) && !positional.is_empty() {
        return Err(format!("unexpected argument: {}", positional[0]));
    }

    Ok(parsed)
}

fn required(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next()
        .ok_or_else(|| format!("missing value for {flag}"))
}

pub fn print_help() {
    println!(
        "Steps CLI\n\n\
Usage:\n  steps [options] [status]\n  steps [options] replay <trace|->\n  steps [options] history [--range <name>] [--start <yyyyMMdd>] [--end <yyyyMMdd>]\n\n\
Commands:\n  status   Show today's steps, distance and daily record (default)\n  replay   Feed a sensor trace through a scratch accountant; stored steps are untouched\n  history  List stored per-day totals\n\n\
Trace lines:\n  counter <raw>      Cumulative counter reading\n  detect [n]         Detected steps (default 1)\n  day <yyyyMMdd>     Move the clock to another day\n  tick               Emit the current snapshot\n\n\
Options:\n  --data-dir <path>  Override the data directory\n  --stride <meters>  Override the stride length for this run only\n  --range <name>     today, last7days, thisweek, thismonth or alltime\n  --json             Print JSON instead of text\n  -h, --help         Show this help message\n"
    );
}
