mod history;
mod settings;
mod sync;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use steps_db::Db;

pub use history::HistoryService;
pub use settings::{SettingsService, SettingsSnapshot};
pub use sync::{ProfileUpdate, SyncService};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub history: HistoryService,
    pub settings: SettingsService,
    pub sync: SyncService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            history: HistoryService::new(shared.clone()),
            settings: SettingsService::new(shared.clone()),
            sync: SyncService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
