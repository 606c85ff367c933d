use steps_core::{DayCode, SensorEvent};

/// One line of a replay trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceCommand {
    Counter(f64),
    Detect(Option<u32>),
    Day(DayCode),
    Tick,
}

impl TraceCommand {
    pub fn event(&self) -> Option<SensorEvent> {
        match self {
            TraceCommand::Counter(raw) => Some(SensorEvent::Counter(*raw)),
            TraceCommand::Detect(steps) => Some(SensorEvent::Detected(*steps)),
            TraceCommand::Day(_) | TraceCommand::Tick => None,
        }
    }
}

/// Parses a whole trace. Blank lines and `#` comments are skipped.
pub fn parse_trace(text: &str) -> Result<Vec<TraceCommand>, String> {
    let mut commands = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let parsed = parse_line(line).map_err(|err| format!("line {}: {}", index + 1, err))?;
        if let Some(command) = parsed {
            commands.push(command);
        }
    }
    Ok(commands)
}

fn parse_line(line: &str) -> Result<Option<TraceCommand>, String> {
    let content = line.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }
    let mut parts = content.split_whitespace();
    let keyword = parts.next().unwrap_or("");
    let value = parts.next();
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected token {extra:?}"));
    }
    let command = match (keyword, value) {
        ("counter", Some(raw)) => TraceCommand::Counter(
            raw.parse::<f64>()
                .map_err(|_| format!("invalid counter value {raw:?}"))?,
        ),
        ("counter", None) => return Err("counter needs a value".to_string()),
        ("detect", None) => TraceCommand::Detect(None),
        ("detect", Some(steps)) => TraceCommand::Detect(Some(
            steps
                .parse::<u32>()
                .map_err(|_| format!("invalid step count {steps:?}"))?,
        )),
        ("day", Some(day)) => {
            TraceCommand::Day(DayCode::parse(day).map_err(|err| err.to_string())?)
        }
        ("day", None) => return Err("day needs a yyyyMMdd value".to_string()),
        ("tick", None) => TraceCommand::Tick,
        ("tick", Some(extra)) => return Err(format!("unexpected token {extra:?}")),
        (other, _) => return Err(format!("unknown command {other:?}")),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let trace = "\
# morning walk
day 20250314
counter 1200
counter 1250.5   # partial batch

detect
detect 3
tick
";
        let commands = parse_trace(trace).expect("trace");
        assert_eq!(
            commands,
            vec![
                TraceCommand::Day(DayCode::parse("20250314").expect("day")),
                TraceCommand::Counter(1200.0),
                TraceCommand::Counter(1250.5),
                TraceCommand::Detect(None),
                TraceCommand::Detect(Some(3)),
                TraceCommand::Tick,
            ]
        );
        assert_eq!(commands[1].event(), Some(SensorEvent::Counter(1200.0)));
        assert_eq!(commands[5].event(), None);
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_trace("counter 1\ncounter\n").expect_err("missing value");
        assert!(err.starts_with("line 2:"), "{err}");
        let err = parse_trace("\n\nwalk 10\n").expect_err("unknown command");
        assert!(err.starts_with("line 3:"), "{err}");
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse_trace("detect -1").is_err());
        assert!(parse_trace("day 2025-03-14").is_err());
        assert!(parse_trace("counter ten").is_err());
        assert!(parse_trace("tick now").is_err());
        assert!(parse_trace("counter 1 2").is_err());
    }
}
