//! N-way intersection of closed time intervals.
//!
//! The common window of a group of streams is the latest start paired with
//! the earliest end, so every stream covers all of it.

use crate::error::{Result, SyncError};
use crate::types::{SensorStream, SyncWindow};

/// Intersect per-stream `(min, max)` bounds.
pub fn intersect_bounds<I>(bounds: I) -> Result<SyncWindow>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let (start, end) = bounds
        .into_iter()
        .reduce(|(start, end), (lo, hi)| (start.max(lo), end.min(hi)))
        .ok_or(SyncError::NoValidStreams)?;

    SyncWindow::new(start, end).ok_or(SyncError::NoOverlap { start, end })
}

/// Intersect the timestamp ranges of a group of streams. Empty streams do not contribute.
pub fn intersect_streams<'a, I>(streams: I) -> Result<SyncWindow>
where
    I: IntoIterator<Item = &'a SensorStream>,
{
    intersect_bounds(streams.into_iter().filter_map(|s| {
        let bounds = s.bounds();
        if bounds.is_none() {
            log::debug!("{}: no samples, ignored for intersection", s.label());
        }
        bounds
    }))
}
