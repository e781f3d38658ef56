use crate::error::{Result, SyncError};
use crate::mmap_utils::mmap_file;
use crate::types::{Sample, SensorStream};
use std::path::Path;

/// Axis columns kept per row; anything after column 3 is ignored.
pub const MAX_AXES: usize = 3;

/// Load one headerless, comma-delimited sensor recording.
///
/// Column 0 is the millisecond timestamp, columns 1..=3 the axis values.
/// Rows whose timestamp is not numeric are dropped; the stream fails with
/// `InvalidTimestamp` only when no row has a usable timestamp. An empty axis
/// cell reads as NaN and keeps its row; any other non-numeric axis value
/// makes the whole file a `ReadError`.
pub fn load_stream(path: &Path) -> Result<SensorStream> {
    let name = sensor_name(path);
    let stream = match mmap_file(path)? {
        Some(mmap) => parse_stream(&name, &mmap),
        None => parse_stream(&name, &[]),
    }
    .map_err(|e| with_path(e, path))?;

    log::debug!("Loaded {} rows from {}", stream.len(), path.display());
    Ok(stream.with_path(path))
}

/// Parse a recording held in memory. `name` labels errors and the stream.
pub fn parse_stream(name: &str, content: &[u8]) -> Result<SensorStream> {
    let text = std::str::from_utf8(content).map_err(|e| SyncError::ReadError {
        path: name.to_string(),
        reason: format!("not valid UTF-8: {}", e),
    })?;

    let mut samples = Vec::new();
    let mut rows = 0usize;
    let mut bad_timestamps = 0usize;
    let mut missing_values = 0usize;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        rows += 1;

        let mut fields = line.split(',');
        let Some(timestamp) = fields.next().and_then(parse_timestamp) else {
            bad_timestamps += 1;
            continue;
        };

        let mut values = Vec::with_capacity(MAX_AXES);
        for field in fields.take(MAX_AXES) {
            let field = field.trim();
            if field.is_empty() {
                missing_values += 1;
                values.push(f64::NAN);
                continue;
            }
            let value = field.parse::<f64>().map_err(|_| SyncError::ReadError {
                path: name.to_string(),
                reason: format!("line {}: cannot parse axis value '{}'", line_no + 1, field),
            })?;
            values.push(value);
        }

        samples.push(Sample {
            timestamp,
            values,
            line: line.to_string(),
        });
    }

    if rows == 0 {
        return Err(SyncError::EmptyStream(name.to_string()));
    }
    if samples.is_empty() {
        return Err(SyncError::InvalidTimestamp(name.to_string()));
    }
    if bad_timestamps > 0 {
        log::warn!(
            "{}: dropped {} of {} rows with non-numeric timestamps",
            name,
            bad_timestamps,
            rows
        );
    }

    if missing_values > 0 {
        log::warn!("{}: {} empty axis cells read as NaN", name, missing_values);
    }

    Ok(SensorStream::new(name, samples))
}

/// Integer milliseconds; integral floats such as `1000.0` are accepted too.
fn parse_timestamp(field: &str) -> Option<i64> {
    let field = field.trim();
    if let Ok(ts) = field.parse::<i64>() {
        return Some(ts);
    }
    let value = field.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// File stem, e.g. `watch_gyroscope` for `watch_gyroscope.csv`.
pub fn sensor_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn with_path(err: SyncError, path: &Path) -> SyncError {
    let label = path.display().to_string();
    match err {
        SyncError::ReadError { reason, .. } => SyncError::ReadError {
            path: label,
            reason,
        },
        SyncError::EmptyStream(_) => SyncError::EmptyStream(label),
        SyncError::InvalidTimestamp(_) => SyncError::InvalidTimestamp(label),
        other => other,
    }
}
