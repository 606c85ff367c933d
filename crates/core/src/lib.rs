use std::fmt;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Metres covered by one step when no user-specific stride is configured.
pub const DEFAULT_STRIDE_LENGTH_M: f64 = 0.78;
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 5_000;

const DAY_CODE_FORMAT: &str = "%Y%m%d";

/// Local calendar date used as the partition key for all per-day step state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayCode(NaiveDate);

impl DayCode {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn today_local() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn parse(value: &str) -> Result<Self, DayCodeError> {
        let trimmed = value.trim();
        if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DayCodeError(value.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DAY_CODE_FORMAT)
            .map(Self)
            .map_err(|_| DayCodeError(value.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn days_before(&self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }

    pub fn days_after(&self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(Self)
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_CODE_FORMAT))
    }
}

impl From<DayCode> for String {
    fn from(value: DayCode) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DayCode {
    type Error = DayCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DayCode::parse(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCodeError(pub String);

impl fmt::Display for DayCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid day code: {:?}", self.0)
    }
}

impl std::error::Error for DayCodeError {}

/// Inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: DayCode,
    pub end: DayCode,
}

/// Per-day calibration and running total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayState {
    pub calibration_offset: Option<f64>,
    pub steps_today: u64,
}

/// Last raw cumulative counter value and the day it was read on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterObservation {
    pub raw: f64,
    pub day: DayCode,
}

/// Best completed day seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub steps: u64,
    pub day: DayCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    pub day: DayCode,
    pub steps: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub start: DayCode,
    pub end: DayCode,
    pub steps: u64,
    pub distance_km: f64,
    pub days: Vec<DayTotal>,
}

/// Value handed to listeners on every change and heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub day: DayCode,
    pub steps_today: u64,
    pub distance_km: f64,
}

impl StepSnapshot {
    pub fn new(day: DayCode, steps_today: u64, stride_length_m: f64) -> Self {
        Self {
            day,
            steps_today,
            distance_km: distance_km(steps_today, stride_length_m),
        }
    }
}

/// Input mode chosen once per `start()` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    /// Hardware counter of steps since boot.
    Cumulative,
    /// One event per detected step (or batch of steps).
    Discrete,
    Unavailable,
}

impl SensorMode {
    pub fn is_available(&self) -> bool {
        !matches!(self, SensorMode::Unavailable)
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SensorMode::Cumulative => "cumulative",
            SensorMode::Discrete => "discrete",
            SensorMode::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    /// Cumulative steps since the last device boot.
    Counter(f64),
    /// Detected steps; platforms that report no count mean one step.
    Detected(Option<u32>),
}

impl SensorEvent {
    pub fn mode(&self) -> SensorMode {
        match self {
            SensorEvent::Counter(_) => SensorMode::Cumulative,
            SensorEvent::Detected(_) => SensorMode::Discrete,
        }
    }
}

pub fn detected_increment(steps: Option<u32>) -> u64 {
    match steps {
        Some(value) if value > 0 => value as u64,
        _ => 1,
    }
}

/// Tunables for the accountant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountingSettings {
    pub stride_length_m: f64,
    pub heartbeat_interval: Duration,
}

impl Default for AccountingSettings {
    fn default() -> Self {
        Self {
            stride_length_m: DEFAULT_STRIDE_LENGTH_M,
            heartbeat_interval: Duration::from_millis(DEFAULT_HEARTBEAT_INTERVAL_MS),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn distance_meters(steps: u64, stride_length_m: f64) -> f64 {
    round2(steps as f64 * stride_length_m)
}

pub fn distance_km(steps: u64, stride_length_m: f64) -> f64 {
    round2(steps as f64 * stride_length_m / 1000.0)
}
