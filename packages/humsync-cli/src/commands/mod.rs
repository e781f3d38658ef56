pub mod config;
pub mod gravity;
pub mod inspect;
pub mod repair;
pub mod segment;
pub mod sync;

use crate::exit_codes;
use humsync_rs::{PipelineConfig, SyncError, Tally};
use std::path::Path;

/// Load the configuration file and apply `overrides` on top.
pub fn load_config(
    path: Option<&Path>,
    overrides: impl FnOnce(&mut PipelineConfig),
) -> Result<PipelineConfig, String> {
    let mut config = PipelineConfig::resolve(path).map_err(|e| match path {
        Some(p) => format!("Failed to load config '{}': {}", p.display(), e),
        None => format!("Failed to load config: {}", e),
    })?;
    overrides(&mut config);
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Size the global rayon pool. Only the first call in a process takes effect.
pub fn configure_jobs(jobs: Option<usize>) -> Result<(), String> {
    match jobs {
        Some(0) => Err("--jobs must be at least 1".to_string()),
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure worker pool: {}", e)),
        None => Ok(()),
    }
}

/// Errors raised before any unit ran: bad arguments or a missing tree.
pub fn setup_error_code(e: &SyncError) -> i32 {
    match e {
        SyncError::InvalidConfig(_) | SyncError::IoError(_) => exit_codes::INPUT_ERROR,
        _ => exit_codes::EXECUTION_ERROR,
    }
}

pub fn tally_exit_code(tally: &Tally) -> i32 {
    if tally.failed == 0 {
        exit_codes::SUCCESS
    } else if tally.succeeded > 0 {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}

pub fn print_summary(stage: &str, tally: &Tally, elapsed: std::time::Duration) {
    eprintln!(
        "{} complete: {} succeeded, {} skipped, {} failed, {:.1}s",
        stage,
        tally.succeeded,
        tally.skipped,
        tally.failed,
        elapsed.as_secs_f64()
    );
}
