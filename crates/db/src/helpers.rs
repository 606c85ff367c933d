use chrono::{SecondsFormat, Utc};
use steps_core::DayCode;

use crate::error::Result;

pub(crate) fn parse_day(value: &str) -> Result<DayCode> {
    Ok(DayCode::parse(value)?)
}

pub(crate) fn steps_from_sql(value: i64) -> u64 {
    value.max(0) as u64
}

pub(crate) fn steps_to_sql(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
