use crate::cli::SyncArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use humsync_rs::run_sync;
use std::path::Path;
use std::time::Instant;

pub fn execute(args: SyncArgs, config_path: Option<&Path>) -> i32 {
    let config = match commands::load_config(config_path, |c| {
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

    let start_time = Instant::now();
    let report = match run_sync(&args.input, &args.output, &config) {
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
    } else if !args.quiet {
        for activity in &report.activities {
            match (&activity.window, &activity.error) {
                (Some(window), _) => eprintln!(
                    "  {}/{}: [{}, {}] {} file(s)",
                    activity.subject,
                    activity.activity,
                    window.start,
                    window.end,
                    activity.files.iter().filter(|f| f.error.is_none()).count()
                ),
                (None, Some(error)) => eprintln!(
                    "  {}/{}: skipped ({})",
                    activity.subject, activity.activity, error.message
                ),
                (None, None) => {}
            }
        }
    }

    if !args.quiet {
        commands::print_summary("Sync", &tally, start_time.elapsed());
    }
    commands::tally_exit_code(&tally)
}
