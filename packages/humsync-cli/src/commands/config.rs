use crate::cli::ConfigArgs;
use crate::commands;
use crate::exit_codes;
use crate::output;
use std::path::Path;

pub fn execute(args: ConfigArgs, config_path: Option<&Path>) -> i32 {
    let config = match commands::load_config(config_path, |_| {}) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    match output::to_json(&config, args.compact).and_then(|json| output::write_output(&json)) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
