use std::path::PathBuf;

use log::info;
use step_accounting::{AccountantBuilder, StepAccountant, StepsListener};
use steps_core::AccountingSettings;
use steps_db::Db;

use crate::error::{AppError, Result};
use crate::services::AppServices;

/// Paths and files needed to run the local step tracker.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
}

/// Application state shared by host processes (CLI, background service).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        let config = AppConfig { db_path };
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn initialize(&self) -> Result<()> {
        let is_fresh_db = self.is_fresh_db();
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        if is_fresh_db {
            info!("created step database at {}", self.config.db_path.display());
        }
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }

    pub fn accounting_settings(&self) -> Result<AccountingSettings> {
        Ok(self.services.settings.get()?.accounting_settings())
    }

    /// Accountant backed by this app's database, with persisted settings
    /// applied. Callers attach the sensor, clock and wake lock.
    pub fn accountant(&self, listener: impl StepsListener + 'static) -> Result<AccountantBuilder> {
        let settings = self.accounting_settings()?;
        let db = self.open_db()?;
        Ok(StepAccountant::builder(db, listener).settings(settings))
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
