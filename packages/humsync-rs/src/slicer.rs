use crate::error::{Result, SyncError};
use crate::types::{Sample, SensorStream, SyncWindow};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Keep samples with `start <= t <= end`. Both bounds are inclusive.
pub fn slice(stream: &SensorStream, window: SyncWindow) -> SensorStream {
    SensorStream {
        name: stream.name.clone(),
        path: stream.path.clone(),
        samples: stream
            .samples
            .iter()
            .filter(|s| window.contains(s.timestamp))
            .cloned()
            .collect(),
    }
}

/// Map `source` under `input_root` to the same relative location under `output_root`.
pub fn mirror_path(input_root: &Path, output_root: &Path, source: &Path) -> Result<PathBuf> {
    let relative = source.strip_prefix(input_root).map_err(|_| {
        SyncError::write(
            output_root,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} is not under input root {}",
                    source.display(),
                    input_root.display()
                ),
            ),
        )
    })?;
    Ok(output_root.join(relative))
}

/// Write samples back as their original rows, creating parent directories.
///
/// An empty slice produces an empty file.
pub fn write_samples(path: &Path, samples: &[Sample]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::write(parent, e))?;
    }
    let file = File::create(path).map_err(|e| SyncError::write(path, e))?;
    write_rows(file, samples).map_err(|e| SyncError::write(path, e))
}

/// Like `write_samples` but fails with `NamingConflict` instead of replacing an existing file.
///
/// Rows go to a hidden temporary file next to `path`, which is hard-linked into
/// place only once it is complete. A failed write leaves no file at `path`.
pub fn write_samples_new(path: &Path, samples: &[Sample]) -> Result<()> {
    write_new_with(path, |file| write_rows(file, samples))
}

fn write_new_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> io::Result<()>,
{
    if path.exists() {
        return Err(SyncError::NamingConflict(path.to_path_buf()));
    }
    let staging = staging_path(path);
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&staging)
        .map_err(|e| SyncError::write(path, e))?;

    if let Err(e) = write(file) {
        discard(&staging);
        return Err(SyncError::write(path, e));
    }

    // hard_link refuses to replace an existing target
    let linked = fs::hard_link(&staging, path);
    discard(&staging);
    linked.map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => SyncError::NamingConflict(path.to_path_buf()),
        _ => SyncError::write(path, e),
    })
}

/// `.<file name>.<uuid>.partial` in the same folder. Hidden, so discovery skips it.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.partial", name, uuid::Uuid::new_v4()))
}

fn discard(staging: &Path) {
    if let Err(e) = fs::remove_file(staging) {
        log::warn!("Failed to remove {}: {}", staging.display(), e);
    }
}

fn write_rows(file: File, samples: &[Sample]) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for sample in samples {
        writer.write_all(sample.line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Slice a stream and persist the result. Returns the number of rows written.
pub fn slice_to_file(stream: &SensorStream, window: SyncWindow, output: &Path) -> Result<usize> {
    let sliced = slice(stream, window);
    write_samples(output, &sliced.samples)?;
    log::info!(
        "Synchronized {} -> {} ({} of {} rows)",
        stream.label(),
        output.display(),
        sliced.len(),
        stream.len()
    );
    Ok(sliced.len())
}
