//! Fixed-duration event segmentation.
//!
//! A stream is cut into consecutive half-open windows `[start + k·D, start + (k+1)·D)`
//! measured from its first row. Each non-empty window becomes `<prefix>_e<k>.csv`
//! next to the source, and the source is removed once at least one event file
//! has been written. Slot indices follow window position, so an empty window
//! leaves a gap rather than shifting later events down.

use crate::config::PipelineConfig;
use crate::error::{Result, SyncError};
use crate::loader::{load_stream, sensor_name};
use crate::slicer::write_samples_new;
use crate::types::{Sample, SensorStream};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SLOT_MARKER: &str = "_e";
const DEFAULT_EXTENSION: &str = "csv";

/// One window of a stream that contains at least one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedEvent {
    pub slot: u32,
    pub start: i64,
    /// Exclusive
    pub end: i64,
    pub samples: Vec<Sample>,
}

/// Result of segmenting one source file.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentOutcome {
    pub source: PathBuf,
    pub events_written: Vec<u32>,
    /// Slots skipped because their file already existed
    pub conflicts: Vec<u32>,
    pub source_deleted: bool,
}

/// Compute the events of a stream without touching the filesystem.
///
/// Fails with `ShortDuration` when the span from first to last row is below
/// `config.min_duration_ms`. The trailing remainder shorter than one window is dropped.
pub fn plan_events(stream: &SensorStream, config: &PipelineConfig) -> Result<Vec<PlannedEvent>> {
    let width = config.event_duration_ms;
    let (Some(first), Some(duration)) = (stream.samples.first(), stream.duration_ms()) else {
        return Err(SyncError::EmptyStream(stream.label()));
    };

    if duration < config.min_duration_ms {
        return Err(SyncError::ShortDuration {
            path: stream.label(),
            duration_ms: duration,
            min_duration_ms: config.min_duration_ms,
        });
    }

    let start = first.timestamp;
    let num_events = duration / width;

    // one pass; rows are not assumed to be in timestamp order
    let mut windows: BTreeMap<i64, Vec<Sample>> = BTreeMap::new();
    for sample in &stream.samples {
        let offset = sample.timestamp - start;
        if offset < 0 {
            continue;
        }
        let k = offset / width;
        if k < num_events {
            windows.entry(k).or_default().push(sample.clone());
        }
    }
    log::debug!(
        "{}: {} of {} windows hold samples",
        stream.label(),
        windows.len(),
        num_events
    );

    let events: Vec<PlannedEvent> = windows
        .into_iter()
        .map(|(k, samples)| PlannedEvent {
            slot: k as u32,
            start: start + k * width,
            end: start + (k + 1) * width,
            samples,
        })
        .collect();

    Ok(events)
}

/// `<prefix>_e<slot>.<ext>`
pub fn event_file_name(prefix: &str, slot: u32, extension: &str) -> String {
    format!("{}{}{}.{}", prefix, SLOT_MARKER, slot, extension)
}

/// Split trailing `_e<n>` groups off a file stem.
///
/// `glass_accelerometer_e0_e1` gives `("glass_accelerometer", [0, 1])`.
pub fn split_slot_suffixes(stem: &str) -> (&str, Vec<u32>) {
    let mut rest = stem;
    let mut slots = Vec::new();
    while let Some(pos) = rest.rfind(SLOT_MARKER) {
        let digits = &rest[pos + SLOT_MARKER.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        let Ok(slot) = digits.parse::<u32>() else {
            break;
        };
        slots.push(slot);
        rest = &rest[..pos];
    }
    slots.reverse();
    (rest, slots)
}

/// Whether a file name looks like an already-segmented event file.
pub fn is_event_file(path: &Path) -> bool {
    !split_slot_suffixes(&sensor_name(path)).1.is_empty()
}

/// Write-then-delete unit for one source file.
///
/// Event files are created with create-new semantics as they are staged. `commit`
/// removes the source only if something was staged; dropping or rolling back an
/// uncommitted transaction removes the files it staged and leaves the source alone.
pub struct EventTransaction {
    source: PathBuf,
    staged: Vec<PathBuf>,
    finished: bool,
}

impl EventTransaction {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            staged: Vec::new(),
            finished: false,
        }
    }

    pub fn stage(&mut self, target: &Path, samples: &[Sample]) -> Result<()> {
        write_samples_new(target, samples)?;
        self.staged.push(target.to_path_buf());
        Ok(())
    }

    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Delete the source if at least one event was staged. Returns whether it was deleted.
    pub fn commit(mut self) -> Result<bool> {
        self.finished = true;
        if self.staged.is_empty() {
            log::info!(
                "No events written for {}, source kept",
                self.source.display()
            );
            return Ok(false);
        }
        fs::remove_file(&self.source).map_err(|e| SyncError::RemoveError {
            path: self.source.clone(),
            source: e,
        })?;
        log::info!(
            "Deleted source {} after writing {} events",
            self.source.display(),
            self.staged.len()
        );
        Ok(true)
    }

    pub fn rollback(mut self) {
        self.undo();
    }

    fn undo(&mut self) {
        self.finished = true;
        for path in self.staged.drain(..) {
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Failed to roll back {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for EventTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.undo();
        }
    }
}

/// Segment one file in place and retire it.
///
/// Slots whose target already exists are reported as conflicts and skipped. Any
/// other write failure rolls back this run's event files and keeps the source.
pub fn segment_file(path: &Path, config: &PipelineConfig) -> Result<SegmentOutcome> {
    let stream = load_stream(path)?;
    let events = plan_events(&stream, config)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_EXTENSION);

    let mut tx = EventTransaction::new(path);
    let mut events_written = Vec::new();
    let mut conflicts = Vec::new();

    for event in &events {
        let target = dir.join(event_file_name(&stream.name, event.slot, extension));
        match tx.stage(&target, &event.samples) {
            Ok(()) => {
                log::debug!(
                    "Saved {} (event {}, {} rows)",
                    target.display(),
                    event.slot,
                    event.samples.len()
                );
                events_written.push(event.slot);
            }
            Err(SyncError::NamingConflict(existing)) => {
                log::warn!(
                    "{} already exists, event {} of {} skipped",
                    existing.display(),
                    event.slot,
                    path.display()
                );
                conflicts.push(event.slot);
            }
            Err(e) => {
                tx.rollback();
                return Err(e);
            }
        }
    }

    let source_deleted = tx.commit()?;
    log::info!(
        "Segmented {}: {} events, {} conflicts",
        path.display(),
        events_written.len(),
        conflicts.len()
    );

    Ok(SegmentOutcome {
        source: path.to_path_buf(),
        events_written,
        conflicts,
        source_deleted,
    })
}

/// Event file names `segment_file` would create, without writing anything.
pub fn plan_file(path: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let stream = load_stream(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_EXTENSION);
    Ok(plan_events(&stream, config)?
        .iter()
        .map(|e| dir.join(event_file_name(&stream.name, e.slot, extension)))
        .collect())
}

/// What the naming-repair pass did with one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Renamed,
    Conflict,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
    pub status: RepairStatus,
    pub reason: Option<String>,
}

/// Canonical name for a file carrying two or more chained slot suffixes.
///
/// Keeps the highest index: `x_e0_e1.csv` becomes `x_e1.csv`.
pub fn repaired_name(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case(DEFAULT_EXTENSION) {
        return None;
    }
    let (prefix, slots) = split_slot_suffixes(stem);
    if slots.len() < 2 {
        return None;
    }
    let highest = slots.into_iter().max()?;
    Some(event_file_name(prefix, highest, extension))
}

/// Collapse chained `_e<i>_e<j>` names in one folder. Never overwrites.
pub fn repair_chained_names(dir: &Path) -> Result<Vec<RepairOutcome>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut outcomes = Vec::new();
    for name in names {
        let Some(new_name) = repaired_name(&name) else {
            continue;
        };
        let from = dir.join(&name);
        let to = dir.join(&new_name);

        let (status, reason) = if to.exists() {
            log::warn!("Conflict: {} already exists; cannot rename {}", new_name, name);
            (RepairStatus::Conflict, None)
        } else {
            match fs::rename(&from, &to) {
                Ok(()) => {
                    log::info!("Renamed '{}' to '{}'", name, new_name);
                    (RepairStatus::Renamed, None)
                }
                Err(e) => {
                    log::warn!("Failed to rename '{}': {}", name, e);
                    (RepairStatus::Failed, Some(e.to_string()))
                }
            }
        };
        outcomes.push(RepairOutcome {
            from,
            to,
            status,
            reason,
        });
    }

    Ok(outcomes)
}
