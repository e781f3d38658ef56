use crate::error::{Result, SyncError};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Map a recording into memory (read-only).
///
/// Returns `None` for zero-length files, which cannot be mapped on every platform.
pub fn mmap_file(path: &Path) -> Result<Option<Mmap>> {
    let file = File::open(path).map_err(|e| read_error(path, e))?;
    let len = file.metadata().map_err(|e| read_error(path, e))?.len();
    if len == 0 {
        return Ok(None);
    }
    // The dataset tree is not modified while a stream is being parsed.
    let mmap = unsafe { Mmap::map(&file).map_err(|e| read_error(path, e))? };
    Ok(Some(mmap))
}

fn read_error(path: &Path, e: std::io::Error) -> SyncError {
    SyncError::ReadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
