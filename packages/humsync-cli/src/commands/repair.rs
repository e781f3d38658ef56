use crate::cli::RepairArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use humsync_rs::repair_chained_names;
use humsync_rs::segment::RepairStatus;

pub fn execute(args: RepairArgs) -> i32 {
    if !args.dir.is_dir() {
        eprintln!("Error: Directory not found: {}", args.dir.display());
        return exit_codes::INPUT_ERROR;
    }

    let outcomes = match repair_chained_names(&args.dir) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return commands::setup_error_code(&e);
        }
    };

    if args.json {
        if let Err(code) = output::print_json(&outcomes) {
            return code;
        }
    } else {
        for outcome in &outcomes {
            let from = outcome.from.display();
            let to = outcome.to.display();
            match outcome.status {
                RepairStatus::Renamed => println!("renamed  {} -> {}", from, to),
                RepairStatus::Conflict => println!("conflict {} -> {} (target exists)", from, to),
                RepairStatus::Failed => println!(
                    "failed   {} -> {}: {}",
                    from,
                    to,
                    outcome.reason.as_deref().unwrap_or("unknown error")
                ),
            }
        }
        if outcomes.is_empty() {
            eprintln!("Nothing to repair in {}", args.dir.display());
        }
    }

    let failed = outcomes
        .iter()
        .filter(|o| o.status == RepairStatus::Failed)
        .count();
    if failed == 0 {
        exit_codes::SUCCESS
    } else if failed < outcomes.len() {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}
