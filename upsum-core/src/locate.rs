//! Log Locator: pick the update log a run will process.
//!
//! An explicit `log_file` is validated and used as-is. Otherwise the newest
//! regular file directly under `log_dir` wins. Only metadata is read here; file
//! contents are left to the parser stage.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, error, info};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// A selected log: path plus its last-modified time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Result of a successful lookup. An empty directory is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    Found(LogFile),
    NoLogsAvailable(PathBuf),
}

pub fn locate(config: &PipelineConfig) -> Result<LocateOutcome, PipelineError> {
    match &config.log_file {
        Some(path) => locate_explicit(path).map(LocateOutcome::Found),
        None => latest_in_dir(&config.log_dir),
    }
}

/// Validate an explicitly requested log. Never substitutes another file.
pub fn locate_explicit(path: &Path) -> Result<LogFile, PipelineError> {
    let meta = match fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => {
            error!(path = %path.display(), "Specified log path is not a regular file");
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            error!(error = ?e, path = %path.display(), "Specified log file not found");
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
    };
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    info!(path = %path.display(), "Using explicitly specified log file");
    Ok(LogFile {
        path: path.to_path_buf(),
        modified,
    })
}

/// Select the most recently modified regular file directly under `dir`.
///
/// Hidden files and sub-directories are ignored. Equal mtimes resolve to the
/// greatest path so the choice does not depend on directory iteration order.
pub fn latest_in_dir(dir: &Path) -> Result<LocateOutcome, PipelineError> {
    if !dir.is_dir() {
        error!(path = %dir.display(), "Log directory not found or not a directory");
        return Err(PipelineError::FileNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        error!(error = ?e, path = %dir.display(), "Failed to list log directory");
        PipelineError::FileNotFound(dir.to_path_buf())
    })?;

    let mut latest: Option<LogFile> = None;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = ?e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false);
        if hidden {
            debug!(path = %path.display(), "Skipping hidden entry");
            continue;
        }
        let meta = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta,
            _ => continue,
        };
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let newer = match &latest {
            None => true,
            Some(best) => (modified, &path) > (best.modified, &best.path),
        };
        if newer {
            latest = Some(LogFile { path, modified });
        }
    }

    match latest {
        Some(file) => {
            info!(path = %file.path.display(), "Selected most recent log file");
            Ok(LocateOutcome::Found(file))
        }
        None => {
            info!(path = %dir.display(), "No log files available");
            Ok(LocateOutcome::NoLogsAvailable(dir.to_path_buf()))
        }
    }
}
