pub mod config;
pub mod discovery;
pub mod error;
pub mod fusion;
pub mod inspect;
pub mod intersect;
pub mod loader;
pub mod mmap_utils;
pub mod pipeline;
pub mod profiling;
pub mod report;
pub mod segment;
pub mod slicer;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Result, SyncError};
pub use fusion::{fuse, fuse_files, join_streams, FusionParams, ImuSample, OrientationState};
pub use intersect::{intersect_bounds, intersect_streams};
pub use loader::{load_stream, parse_stream};
pub use pipeline::{run_segment, run_sync, SegmentOptions};
pub use report::{RunReport, Tally};
pub use segment::{plan_events, repair_chained_names, segment_file, EventTransaction};
pub use slicer::{slice, slice_to_file};
pub use types::*;
