use crate::config::PipelineConfig;
use crate::error::{Result, SyncError};
use crate::types::ActivityDescriptor;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SENSOR_EXTENSION: &str = "csv";

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

/// Enumerate `root/<subject>/<activity>/` folders and their sensor files.
///
/// Hidden entries are skipped and activities outside the configured allow-list
/// are left out. Descriptors come back sorted by subject, then activity.
pub fn discover(root: &Path, config: &PipelineConfig) -> Result<Vec<ActivityDescriptor>> {
    if !root.is_dir() {
        return Err(SyncError::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Dataset root not found: {}", root.display()),
        )));
    }

    let mut descriptors = Vec::new();
    for subject_dir in subdirectories(root)? {
        let subject = dir_name(&subject_dir);
        let activities = match subdirectories(&subject_dir) {
            Ok(dirs) => dirs,
            Err(e) => {
                log::warn!("Skipping subject {}: {}", subject_dir.display(), e);
                continue;
            }
        };

        for activity_dir in activities {
            let activity = dir_name(&activity_dir);
            if !config.accepts_activity(&activity) {
                log::debug!("Activity {}/{} not selected", subject, activity);
                continue;
            }
            let sensor_files = match sensor_files(&activity_dir) {
                Ok(files) => files,
                Err(e) => {
                    log::warn!("Skipping activity {}: {}", activity_dir.display(), e);
                    continue;
                }
            };
            descriptors.push(ActivityDescriptor {
                subject: subject.clone(),
                activity,
                dir: activity_dir,
                sensor_files,
            });
        }
    }

    log::info!(
        "Discovered {} activity folders under {}",
        descriptors.len(),
        root.display()
    );
    Ok(descriptors)
}

/// CSV files directly inside `dir`, sorted.
pub fn sensor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    glob_files(dir, &format!("*.{}", SENSOR_EXTENSION))
}

/// CSV files anywhere below `dir`, sorted.
pub fn sensor_files_recursive(dir: &Path) -> Result<Vec<PathBuf>> {
    glob_files(dir, &format!("**/*.{}", SENSOR_EXTENSION))
}

fn glob_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let base = dir.to_str().ok_or_else(|| {
        SyncError::IoError(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Non UTF-8 path: {}", dir.display()),
        ))
    })?;
    let pattern = format!("{}/{}", Pattern::escape(base), suffix);
    let paths = glob::glob_with(&pattern, match_options()).map_err(|e| {
        SyncError::IoError(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid glob pattern '{}': {}", pattern, e),
        ))
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("glob error: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
