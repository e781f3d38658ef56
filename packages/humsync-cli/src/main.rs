use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod output;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let config_path = cli.config.as_deref();
    let exit_code = match cli.command {
        cli::Command::Sync(args) => commands::sync::execute(args, config_path),
        cli::Command::Segment(args) => commands::segment::execute(args, config_path),
        cli::Command::Repair(args) => commands::repair::execute(args),
        cli::Command::Gravity(args) => commands::gravity::execute(args, config_path),
        cli::Command::Inspect(args) => commands::inspect::execute(args),
        cli::Command::Config(args) => commands::config::execute(args, config_path),
    };

    std::process::exit(exit_code);
}
