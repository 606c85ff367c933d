use std::time::Duration;

use serde::Serialize;
use steps_core::AccountingSettings;
use steps_db::Db;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

/// Snapshot of user-configurable settings stored in the DB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettingsSnapshot {
    pub stride_length_m: f64,
    pub heartbeat_interval_ms: u64,
}

impl SettingsSnapshot {
    pub fn accounting_settings(&self) -> AccountingSettings {
        AccountingSettings {
            stride_length_m: self.stride_length_m,
            heartbeat_interval: Duration::from_millis(self.heartbeat_interval_ms),
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    config: SharedConfig,
}

impl SettingsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn get(&self) -> Result<SettingsSnapshot> {
        let db = self.db()?;
        Ok(SettingsSnapshot {
            stride_length_m: db.get_stride_length_m()?,
            heartbeat_interval_ms: db.get_heartbeat_interval_ms()?,
        })
    }

    /// A zero heartbeat interval turns the periodic refresh off.
    pub fn update(
        &self,
        stride_length_m: Option<f64>,
        heartbeat_interval_ms: Option<u64>,
    ) -> Result<()> {
        if let Some(stride) = stride_length_m {
            if !stride.is_finite() || stride <= 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "stride length must be positive, got {}",
                    stride
                )));
            }
        }
        let db = self.db()?;
        if let Some(stride) = stride_length_m {
            db.set_stride_length_m(stride)?;
        }
        if let Some(millis) = heartbeat_interval_ms {
            db.set_heartbeat_interval_ms(millis)?;
        }
        Ok(())
    }
}
