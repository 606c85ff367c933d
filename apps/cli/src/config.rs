use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use steps_core::{DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_STRIDE_LENGTH_M};

const CONFIG_DIR_NAME: &str = "steps";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub stride_length_m: f64,
    pub heartbeat_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            stride_length_m: DEFAULT_STRIDE_LENGTH_M,
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_MS / 1000,
            data_dir: None,
        }
    }
}

impl CliConfig {
    pub fn heartbeat_interval_ms(&self) -> u64 {
        self.heartbeat_interval_secs.saturating_mul(1000)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub paths: ConfigPaths,
    pub created: bool,
}

pub fn load_or_create() -> Result<ConfigLoad, String> {
    load_or_create_in(&config_dir()?)
}

fn load_or_create_in(dir: &Path) -> Result<ConfigLoad, String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    let file = dir.join(CONFIG_FILE_NAME);
    let paths = ConfigPaths { file };

    if paths.file.exists() {
        let contents = fs::read_to_string(&paths.file)
            .map_err(|err| format!("read config {}: {}", paths.file.display(), err))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|err| format!("parse config {}: {}", paths.file.display(), err))?;
        if !config.stride_length_m.is_finite() || config.stride_length_m <= 0.0 {
            return Err(format!(
                "parse config {}: stride_length_m must be positive",
                paths.file.display()
            ));
        }
        return Ok(ConfigLoad {
            config,
            paths,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&paths.file, contents)
        .map_err(|err| format!("write config {}: {}", paths.file.display(), err))?;

    Ok(ConfigLoad {
        config,
        paths,
        created: true,
    })
}

fn config_dir() -> Result<PathBuf, String> {
    if let Some(base) = std::env::var_os("XDG_CONFIG_HOME").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(base).join(CONFIG_DIR_NAME));
    }
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    Ok(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_writes_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let load = load_or_create_in(dir.path()).expect("create");
        assert!(load.created);
        assert_eq!(load.config, CliConfig::default());
        assert_eq!(load.config.heartbeat_interval_ms(), 5_000);

        let again = load_or_create_in(dir.path()).expect("load");
        assert!(!again.created);
        assert_eq!(again.config, CliConfig::default());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "stride_length_m = 0.7\ndata_dir = \"/srv/steps\"\n",
        )
        .expect("write config");
        let load = load_or_create_in(dir.path()).expect("load");
        assert_eq!(load.config.stride_length_m, 0.7);
        assert_eq!(load.config.heartbeat_interval_secs, 5);
        assert_eq!(load.config.data_dir, Some(PathBuf::from("/srv/steps")));
    }

    #[test]
    fn rejects_non_positive_stride() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "stride_length_m = 0.0\n")
            .expect("write config");
        assert!(load_or_create_in(dir.path()).is_err());
    }
}
