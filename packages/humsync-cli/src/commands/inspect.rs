use crate::cli::InspectArgs;
use crate::commands;
use crate::output;
use humsync_rs::inspect::inspect_tree;

pub fn execute(args: InspectArgs) -> i32 {
    let summaries = match inspect_tree(&args.root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return commands::setup_error_code(&e);
        }
    };

    if args.json {
        if let Err(code) = output::print_json(&summaries) {
            return code;
        }
        return crate::exit_codes::SUCCESS;
    }

    println!("{:<8} {:>14} {:>14} {:>10}  PATH", "ROWS", "FIRST", "LAST", "SPAN_MS");
    for summary in &summaries {
        let path = summary
            .path
            .strip_prefix(&args.root)
            .unwrap_or(&summary.path)
            .display();
        match (summary.first_timestamp, summary.last_timestamp, summary.duration_ms) {
            (Some(first), Some(last), Some(span)) => println!(
                "{:<8} {:>14} {:>14} {:>10}  {}",
                summary.rows, first, last, span, path
            ),
            _ => {
                let reason = summary
                    .error
                    .as_ref()
                    .map(|e| e.kind.as_str())
                    .unwrap_or("-");
                println!("{:<8} {:>14} {:>14} {:>10}  {}", 0, "-", "-", reason, path)
            }
        }
    }
    eprintln!("{} file(s)", summaries.len());
    crate::exit_codes::SUCCESS
}
