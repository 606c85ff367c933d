use serde::Serialize;
use step_accounting::{StepAccountant, week_summary};
use steps_core::{DailyRecord, DayCode};

use crate::error::Result;
use crate::services::{SharedConfig, open_db};

/// Profile fields the host pushes to its backend after a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub day: DayCode,
    pub steps_today: u64,
    pub distance_today_km: f64,
    pub distance_week_km: f64,
    pub daily_record: Option<DailyRecord>,
}

impl ProfileUpdate {
    /// Built purely from the accountant's own store, whatever backs it.
    pub fn from_accountant(accountant: &StepAccountant) -> Result<Self> {
        let snapshot = accountant.snapshot();
        let week = accountant.week_summary()?;
        Ok(Self {
            day: snapshot.day,
            steps_today: snapshot.steps_today,
            distance_today_km: snapshot.distance_km,
            distance_week_km: week.distance_km,
            daily_record: accountant.daily_record(),
        })
    }
}

#[derive(Clone)]
pub struct SyncService {
    config: SharedConfig,
}

impl SyncService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn profile_update(&self, accountant: &StepAccountant) -> Result<ProfileUpdate> {
        // the snapshot query applies any pending rollover before the DB is read
        let snapshot = accountant.snapshot();
        let stride = accountant.settings().stride_length_m;
        let db = open_db(&self.config)?;
        let week = week_summary(&db, snapshot.day, stride)?;
        Ok(ProfileUpdate {
            day: snapshot.day,
            steps_today: snapshot.steps_today,
            distance_today_km: snapshot.distance_km,
            distance_week_km: week.distance_km,
            daily_record: db.daily_record()?,
        })
    }
}
