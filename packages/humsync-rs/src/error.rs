use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to read stream {path}: {reason}")]
    ReadError { path: String, reason: String },

    #[error("Stream has no rows: {0}")]
    EmptyStream(String),

    #[error("No numeric timestamps in stream: {0}")]
    InvalidTimestamp(String),

    #[error("No valid streams to intersect")]
    NoValidStreams,

    #[error("Streams do not overlap (latest start {start} > earliest end {end})")]
    NoOverlap { start: i64, end: i64 },

    #[error("Stream {path} spans {duration_ms} ms, below the {min_duration_ms} ms minimum")]
    ShortDuration {
        path: String,
        duration_ms: i64,
        min_duration_ms: i64,
    },

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove source {path}: {source}")]
    RemoveError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Target already exists, refusing to overwrite: {0}")]
    NamingConflict(PathBuf),

    #[error("Stream {path} has {found} axis columns, 3 required")]
    MissingAxes { path: String, found: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SyncError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Data-driven skips, as opposed to failures of the run itself.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SyncError::ReadError { .. }
                | SyncError::EmptyStream(_)
                | SyncError::InvalidTimestamp(_)
                | SyncError::NoValidStreams
                | SyncError::NoOverlap { .. }
                | SyncError::ShortDuration { .. }
                | SyncError::NamingConflict(_)
                | SyncError::MissingAxes { .. }
        )
    }

    /// Short machine-readable tag used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ReadError { .. } => "read_error",
            SyncError::EmptyStream(_) => "empty_stream",
            SyncError::InvalidTimestamp(_) => "invalid_timestamp",
            SyncError::NoValidStreams => "no_valid_streams",
            SyncError::NoOverlap { .. } => "no_overlap",
            SyncError::ShortDuration { .. } => "short_duration",
            SyncError::WriteError { .. } => "write_error",
            SyncError::RemoveError { .. } => "remove_error",
            SyncError::NamingConflict(_) => "naming_conflict",
            SyncError::MissingAxes { .. } => "missing_axes",
            SyncError::InvalidConfig(_) => "invalid_config",
            SyncError::Json(_) => "json",
            SyncError::IoError(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
