use steps_core::{DayCode, WeekSummary, distance_km};

use crate::store::StepStore;
use crate::types::Result;

pub const WEEK_DAYS: u64 = 7;

/// Steps and distance for the seven days ending on `end` (inclusive).
pub fn week_summary(store: &dyn StepStore, end: DayCode, stride_length_m: f64) -> Result<WeekSummary> {
    let start = end.days_before(WEEK_DAYS - 1).unwrap_or(end);
    let days = store.day_totals(start, end)?;
    let steps = days
        .iter()
        .fold(0u64, |acc, total| acc.saturating_add(total.steps));
    Ok(WeekSummary {
        start,
        end,
        steps,
        distance_km: distance_km(steps, stride_length_m),
        days,
    })
}
