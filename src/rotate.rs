use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Extension appended to the log file name for its rotated backup.
const BACKUP_EXTENSION: &str = ".0";

pub(crate) const DEFAULT_MAX_LOG_SIZE: u64 = 1048576; // 1 MiB

/// Move an oversized log file aside to `<path>.0` so that a fresh file
/// can be started at `log_file`.
///
/// A file below `max_size` bytes is left untouched. A path that cannot
/// be stat'd means there is nothing to rotate and the call is a no-op.
/// Any pre-existing backup at the backup name is discarded.
pub(crate) fn rotate_log(log_file: &Path, max_size: u64) {
    let size = match fs::metadata(log_file) {
        Ok(metadata) => metadata.len(),
        // Nothing to rotate.
        Err(_) => return,
    };

    if size < max_size {
        return;
    }

    let backup_file = backup_path(log_file);
    if backup_file.exists() {
        if let Err(e) = fs::remove_file(&backup_file) {
            debug!(%e, backup_file = %backup_file.display(), "could not remove old backup");
        }
    }

    info!(
        log_file = %log_file.display(),
        backup_file = %backup_file.display(),
        size,
        max_size,
        "rotating log file"
    );

    if let Err(e) = fs::rename(log_file, &backup_file) {
        debug!(%e, log_file = %log_file.display(), "log rotation rename failed");
    }
}

fn backup_path(log_file: &Path) -> PathBuf {
    let mut backup = log_file.as_os_str().to_os_string();
    backup.push(BACKUP_EXTENSION);
    PathBuf::from(backup)
}
