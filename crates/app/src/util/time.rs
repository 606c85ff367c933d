use chrono::{Datelike, NaiveDate};
use steps_core::{DayCode, DayRange};

use crate::config::RangeParams;
use crate::error::{AppError, Result};

/// Resolves a preset or explicit bounds into an inclusive day range ending
/// no later than `today` for presets.
pub fn resolve_range(params: &RangeParams, today: DayCode) -> Result<DayRange> {
    if let Some(start) = params.start.as_deref() {
        let start = parse_day(start)?;
        let end = match params.end.as_deref() {
            Some(end) => parse_day(end)?,
            None => today,
        };
        if start > end {
            return Err(AppError::InvalidInput(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        return Ok(DayRange { start, end });
    }
    let start = match params.range.as_deref().unwrap_or("last7days") {
        "today" => today,
        "last7days" => days_before(today, 6)?,
        "thisweek" => {
            let since_monday = today.date().weekday().num_days_from_monday();
            days_before(today, u64::from(since_monday))?
        }
        "thismonth" => days_before(today, u64::from(today.date().day0()))?,
        "alltime" => NaiveDate::from_ymd_opt(1970, 1, 1)
            .map(DayCode::from_date)
            .ok_or_else(|| AppError::InvalidInput("invalid epoch date".to_string()))?,
        value => {
            return Err(AppError::InvalidInput(format!(
                "unsupported range {}",
                value
            )));
        }
    };
    Ok(DayRange { start, end: today })
}

fn parse_day(value: &str) -> Result<DayCode> {
    DayCode::parse(value).map_err(|err| AppError::InvalidInput(err.to_string()))
}

fn days_before(day: DayCode, days: u64) -> Result<DayCode> {
    day.days_before(days)
        .ok_or_else(|| AppError::InvalidInput(format!("{} has no date {} days earlier", day, days)))
}
