use crate::cli::SegmentArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use humsync_rs::{run_segment, SegmentOptions};
use std::path::Path;
use std::time::Instant;

pub fn execute(args: SegmentArgs, config_path: Option<&Path>) -> i32 {
    let config = match commands::load_config(config_path, |c| {
        if let Some(event_ms) = args.event_ms {
            c.event_duration_ms = event_ms;
            // keep the two-event minimum unless it is set explicitly
            c.min_duration_ms = event_ms.saturating_mul(2);
        }
        if let Some(min_ms) = args.min_ms {
            c.min_duration_ms = min_ms;
        }
        if args.activity.is_some() {
            c.activities = args.activity.clone();
        }
    }) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if let Err(msg) = commands::configure_jobs(args.jobs) {
        eprintln!("Error: {}", msg);
        return exit_codes::INPUT_ERROR;
    }

    let options = SegmentOptions {
        repair: !args.no_repair,
        dry_run: args.dry_run,
    };

    let start_time = Instant::now();
    let report = match run_segment(&args.root, &config, options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return commands::setup_error_code(&e);
        }
    };
    let tally = report.tally();

    if args.json {
        if let Err(code) = output::print_json(&report) {
            return code;
        }
    } else if args.dry_run {
        for file in report.activities.iter().flat_map(|a| &a.files) {
            for planned in file.planned.iter().flatten() {
                println!("{}", planned.display());
            }
        }
    } else if !args.quiet {
        for activity in &report.activities {
            let written: usize = activity
                .files
                .iter()
                .filter_map(|f| f.outcome.as_ref())
                .map(|o| o.events_written.len())
                .sum();
            let conflicts: usize = activity
                .files
                .iter()
                .filter_map(|f| f.outcome.as_ref())
                .map(|o| o.conflicts.len())
                .sum();
            eprintln!(
                "  {}/{}: {} event(s) written, {} conflict(s), {} rename(s)",
                activity.subject,
                activity.activity,
                written,
                conflicts,
                activity.repairs.len()
            );
        }
    }

    if !args.quiet {
        let stage = if args.dry_run { "Dry run" } else { "Segment" };
        commands::print_summary(stage, &tally, start_time.elapsed());
    }
    commands::tally_exit_code(&tally)
}
