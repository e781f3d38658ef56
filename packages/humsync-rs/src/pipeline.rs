//! Drivers for the sync and segmentation stages.
//!
//! Both stages discover every activity folder up front and then process the
//! descriptors independently on the rayon pool. Failures are recorded in the
//! per-activity report and never stop sibling activities.

use crate::config::PipelineConfig;
use crate::discovery::discover;
use crate::error::{Result, SyncError};
use crate::intersect::intersect_streams;
use crate::loader::load_stream;
use crate::profiling::ProfileScope;
use crate::report::{
    ActivitySegmentReport, ActivitySyncReport, ErrorRecord, RunReport, SegmentedFile, SyncedFile,
};
use crate::segment::{is_event_file, plan_file, repair_chained_names, segment_file};
use crate::slicer::{mirror_path, slice_to_file};
use crate::types::{ActivityDescriptor, SensorStream};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Collapse chained `_e<i>_e<j>` names before segmenting
    pub repair: bool,
    /// Plan events without writing or deleting anything
    pub dry_run: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            repair: true,
            dry_run: false,
        }
    }
}

/// Intersect one activity's streams and write each slice to the mirrored
/// location under `output_root`.
pub fn sync_activity(
    descriptor: &ActivityDescriptor,
    input_root: &Path,
    output_root: &Path,
) -> ActivitySyncReport {
    let _profile = ProfileScope::new(format!(
        "sync {}/{}",
        descriptor.subject, descriptor.activity
    ));

    let loaded: Vec<(PathBuf, Result<SensorStream>)> = descriptor
        .sensor_files
        .iter()
        .map(|p| (p.clone(), load_stream(p)))
        .collect();

    let mut files = Vec::new();
    for (path, result) in &loaded {
        if let Err(e) = result {
            log::warn!("Skipping {}: {}", path.display(), e);
            files.push(SyncedFile {
                source: path.clone(),
                output: None,
                rows: None,
                error: Some(ErrorRecord::from(e)),
            });
        }
    }

    let streams: Vec<&SensorStream> = loaded.iter().filter_map(|(_, r)| r.as_ref().ok()).collect();
    let window = match intersect_streams(streams.iter().copied()) {
        Ok(window) => window,
        Err(e) => {
            log::warn!(
                "Skipping activity {}/{}: {}",
                descriptor.subject,
                descriptor.activity,
                e
            );
            return ActivitySyncReport {
                subject: descriptor.subject.clone(),
                activity: descriptor.activity.clone(),
                window: None,
                files,
                error: Some(ErrorRecord::from(&e)),
            };
        }
    };
    log::info!(
        "{}/{}: synchronization window [{}, {}]",
        descriptor.subject,
        descriptor.activity,
        window.start,
        window.end
    );

    for stream in streams {
        let Some(source) = stream.path.clone() else {
            continue;
        };
        let output = match mirror_path(input_root, output_root, &source) {
            Ok(output) => output,
            Err(e) => {
                log::warn!("{}", e);
                files.push(SyncedFile {
                    source,
                    output: None,
                    rows: None,
                    error: Some(ErrorRecord::from(&e)),
                });
                continue;
            }
        };
        let entry = match slice_to_file(stream, window, &output) {
            Ok(rows) => SyncedFile {
                source,
                output: Some(output),
                rows: Some(rows),
                error: None,
            },
            Err(e) => {
                log::warn!("{}", e);
                SyncedFile {
                    source,
                    output: Some(output),
                    rows: None,
                    error: Some(ErrorRecord::from(&e)),
                }
            }
        };
        files.push(entry);
    }

    ActivitySyncReport {
        subject: descriptor.subject.clone(),
        activity: descriptor.activity.clone(),
        window: Some(window),
        files,
        error: None,
    }
}

/// Synchronize every activity under `input_root` into `output_root`.
pub fn run_sync(
    input_root: &Path,
    output_root: &Path,
    config: &PipelineConfig,
) -> Result<RunReport<ActivitySyncReport>> {
    config.validate()?;
    if same_location(input_root, output_root) {
        return Err(SyncError::InvalidConfig(format!(
            "output root {} must differ from input root",
            output_root.display()
        )));
    }

    let descriptors = discover(input_root, config)?;
    let reports = descriptors
        .par_iter()
        .map(|d| sync_activity(d, input_root, output_root))
        .collect();
    Ok(RunReport::new(reports))
}

/// Repair names, then segment every source stream of one activity folder.
///
/// Files that already carry a slot suffix are event files from an earlier run
/// and are not segmented again.
pub fn segment_activity(
    descriptor: &ActivityDescriptor,
    config: &PipelineConfig,
    options: SegmentOptions,
) -> ActivitySegmentReport {
    let _profile = ProfileScope::new(format!(
        "segment {}/{}",
        descriptor.subject, descriptor.activity
    ));

    let mut report = ActivitySegmentReport {
        subject: descriptor.subject.clone(),
        activity: descriptor.activity.clone(),
        repairs: Vec::new(),
        files: Vec::new(),
        error: None,
    };

    if options.repair && !options.dry_run {
        match repair_chained_names(&descriptor.dir) {
            Ok(repairs) => report.repairs = repairs,
            Err(e) => {
                log::warn!("Skipping activity {}: {}", descriptor.dir.display(), e);
                report.error = Some(ErrorRecord::from(&e));
                return report;
            }
        }
    }

    for source in descriptor.sensor_files.iter().filter(|p| !is_event_file(p)) {
        let entry = if options.dry_run {
            match plan_file(source, config) {
                Ok(planned) => SegmentedFile {
                    source: source.clone(),
                    outcome: None,
                    planned: Some(planned),
                    error: None,
                },
                Err(e) => skipped_file(source, &e),
            }
        } else {
            match segment_file(source, config) {
                Ok(outcome) => SegmentedFile {
                    source: source.clone(),
                    outcome: Some(outcome),
                    planned: None,
                    error: None,
                },
                Err(e) => skipped_file(source, &e),
            }
        };
        report.files.push(entry);
    }

    report
}

fn skipped_file(source: &Path, e: &SyncError) -> SegmentedFile {
    log::warn!("Skipping {}: {}", source.display(), e);
    SegmentedFile {
        source: source.to_path_buf(),
        outcome: None,
        planned: None,
        error: Some(ErrorRecord::from(e)),
    }
}

/// Segment every activity under `root` in place.
pub fn run_segment(
    root: &Path,
    config: &PipelineConfig,
    options: SegmentOptions,
) -> Result<RunReport<ActivitySegmentReport>> {
    config.validate()?;
    let descriptors = discover(root, config)?;
    let reports = descriptors
        .par_iter()
        .map(|d| segment_activity(d, config, options))
        .collect();
    Ok(RunReport::new(reports))
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
