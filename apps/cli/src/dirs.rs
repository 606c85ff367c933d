use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "steps";
const DB_FILE_NAME: &str = "steps.sqlite";

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub dir: PathBuf,
    pub matched_existing: bool,
}

/// Picks the data dir: an explicit override, then `$XDG_DATA_HOME/steps`,
/// then `~/.local/share/steps`.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> Result<DataDirResolution, String> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_data_dir()?,
    };
    let matched_existing = dir.join(DB_FILE_NAME).exists();
    Ok(DataDirResolution {
        dir,
        matched_existing,
    })
}

fn default_data_dir() -> Result<PathBuf, String> {
    if let Some(base) = std::env::var_os("XDG_DATA_HOME").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(base).join(DATA_DIR_NAME));
    }
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join(DATA_DIR_NAME))
}
