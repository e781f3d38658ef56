use crate::discovery::sensor_files_recursive;
use crate::error::{Result, SyncError};
use crate::loader::load_stream;
use crate::report::ErrorRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Timestamp summary of one recording, as used to eyeball sync output.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub duration_ms: Option<i64>,
    pub error: Option<ErrorRecord>,
}

pub fn inspect_file(path: &Path) -> FileSummary {
    match load_stream(path) {
        Ok(stream) => FileSummary {
            path: path.to_path_buf(),
            rows: stream.len(),
            first_timestamp: stream.samples.first().map(|s| s.timestamp),
            last_timestamp: stream.samples.last().map(|s| s.timestamp),
            duration_ms: stream.duration_ms(),
            error: None,
        },
        Err(e) => {
            // zero-row files are legitimate sync output
            if !matches!(e, SyncError::EmptyStream(_)) {
                log::warn!("{}", e);
            }
            FileSummary {
                path: path.to_path_buf(),
                rows: 0,
                first_timestamp: None,
                last_timestamp: None,
                duration_ms: None,
                error: Some(ErrorRecord::from(&e)),
            }
        }
    }
}

/// Summaries for every CSV file below `root`.
pub fn inspect_tree(root: &Path) -> Result<Vec<FileSummary>> {
    Ok(sensor_files_recursive(root)?
        .iter()
        .map(|p| inspect_file(p))
        .collect())
}
