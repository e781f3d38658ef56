use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "humsync",
    version,
    about = "Synchronize and segment multi-device sensor recordings",
    long_about = "Trim every recording of an activity to the interval all devices cover,\n\
                  cut synchronized recordings into fixed-length events and derive gravity\n\
                  vectors from accelerometer, gyroscope and magnetometer streams."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON configuration file (default: per-user config.json when present)
    #[arg(long, env = "HUMSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Trim every activity to the window shared by all its recordings
    Sync(SyncArgs),
    /// Cut synchronized recordings into fixed-length events, in place
    Segment(SegmentArgs),
    /// Collapse chained event names (x_e0_e3.csv -> x_e3.csv) in one folder
    Repair(RepairArgs),
    /// Derive a gravity vector stream from accelerometer, gyroscope and magnetometer files
    Gravity(GravityArgs),
    /// Summarize row counts and timestamp ranges of every CSV file in a tree
    Inspect(InspectArgs),
    /// Print the resolved configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct SyncArgs {
    /// Dataset root laid out as <subject>/<activity>/<sensor>.csv
    #[arg(long)]
    pub input: PathBuf,

    /// Destination root; mirrors the input layout
    #[arg(long)]
    pub output: PathBuf,

    /// Only process these activities (case-insensitive)
    #[arg(long, num_args = 1..)]
    pub activity: Option<Vec<String>>,

    /// Worker threads (default: one per core)
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Print the run report as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Suppress the summary on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct SegmentArgs {
    /// Synchronized dataset root
    #[arg(long)]
    pub root: PathBuf,

    /// Event length in milliseconds
    #[arg(long)]
    pub event_ms: Option<i64>,

    /// Shortest recording that gets segmented, in milliseconds
    #[arg(long)]
    pub min_ms: Option<i64>,

    /// Only process these activities (case-insensitive)
    #[arg(long, num_args = 1..)]
    pub activity: Option<Vec<String>>,

    /// Skip the name repair pass
    #[arg(long, default_value_t = false)]
    pub no_repair: bool,

    /// Report planned events without writing or deleting files
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Worker threads (default: one per core)
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Print the run report as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Suppress the summary on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct RepairArgs {
    /// Activity folder holding event files
    #[arg(long)]
    pub dir: PathBuf,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct GravityArgs {
    /// Accelerometer recording
    #[arg(long)]
    pub acc: PathBuf,

    /// Gyroscope recording
    #[arg(long)]
    pub gyro: PathBuf,

    /// Magnetometer recording
    #[arg(long)]
    pub mag: PathBuf,

    /// Gravity output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Complementary filter weight on the gyroscope estimate
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Gravity magnitude used to scale the output vector
    #[arg(long)]
    pub g: Option<f64>,

    /// Write a column header line
    #[arg(long, default_value_t = false)]
    pub header: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Directory to scan recursively
    #[arg(long)]
    pub root: PathBuf,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}
