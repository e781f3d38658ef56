use crate::cli::GravityArgs;
use crate::commands;
use crate::exit_codes;
use humsync_rs::{fuse_files, FusionParams};
use std::path::Path;

pub fn execute(args: GravityArgs, config_path: Option<&Path>) -> i32 {
    let config = match commands::load_config(config_path, |c| {
        if let Some(alpha) = args.alpha {
            c.alpha = alpha;
        }
        if let Some(g) = args.g {
            c.gravity = g;
        }
    }) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    for input in [&args.acc, &args.gyro, &args.mag] {
        if !input.is_file() {
            eprintln!("Error: File not found: {}", input.display());
            return exit_codes::INPUT_ERROR;
        }
    }

    let params = FusionParams::from(&config);
    match fuse_files(
        &args.acc,
        &args.gyro,
        &args.mag,
        &args.output,
        &params,
        args.header,
    ) {
        Ok(rows) => {
            eprintln!("Wrote {} gravity sample(s) to {}", rows, args.output.display());
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_skip() {
                exit_codes::INPUT_ERROR
            } else {
                exit_codes::EXECUTION_ERROR
            }
        }
    }
}
