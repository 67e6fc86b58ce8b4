use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::TailerError;

pub const LOG_PREFIX: &str = "CombatLog";
pub const LOG_SUFFIX: &str = ".txt";

/// True for `CombatLog*.txt` file names.
pub fn is_combat_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_SUFFIX))
        .unwrap_or(false)
}

/// Most recently modified combat log directly inside `folder`.
///
/// Entries whose metadata can't be read are skipped; only failing to list
/// the folder itself is an error.
pub fn find_latest_log(folder: &Path) -> Result<Option<PathBuf>, TailerError> {
    let entries = fs::read_dir(folder).map_err(|source| TailerError::ReadDir {
        path: folder.to_path_buf(),
        source,
    })?;

    let newest = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_combat_log(p))
        .filter_map(|p| {
            let meta = fs::metadata(&p).ok()?;
            if !meta.is_file() {
                return None;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, p))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, p)| p);

    Ok(newest)
}

/// Current size of `path`, or 0 if it can't be read.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
