//! Complementary-filter gravity estimation.
//!
//! Roll and pitch are integrated from the gyroscope and pulled towards the
//! accelerometer's tilt estimate on every sample; the fused angles then
//! decompose a calibrated gravity constant onto the device axes.

use crate::config::PipelineConfig;
use crate::error::{Result, SyncError};
use crate::loader::load_stream;
use crate::types::{GravitySample, SensorStream};
use nalgebra::Vector3;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const GRAVITY_HEADER: &str = "timestamp,gravity_x,gravity_y,gravity_z";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
    /// Weight of the gyro-integrated angle
    pub alpha: f64,
    /// Gravity calibration constant
    pub gravity: f64,
}

impl Default for FusionParams {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self::from(&config)
    }
}

impl From<&PipelineConfig> for FusionParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            alpha: config.alpha,
            gravity: config.gravity,
        }
    }
}

/// One timestamp present in all three input streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    pub timestamp: i64,
    pub accel: Vector3<f64>,
    /// Degrees per second
    pub gyro: Vector3<f64>,
    /// Join key only, not used by the filter
    pub mag: Vector3<f64>,
}

/// Carried between consecutive samples of one fusion pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationState {
    /// Radians
    pub roll: f64,
    /// Radians
    pub pitch: f64,
    pub timestamp: i64,
}

impl OrientationState {
    /// Level orientation anchored at the first sample's timestamp, so its `dt` is 0.
    pub fn initial(timestamp: i64) -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            timestamp,
        }
    }
}

/// Advance the filter by one sample.
pub fn step(
    state: OrientationState,
    sample: &ImuSample,
    params: &FusionParams,
) -> (OrientationState, GravitySample) {
    let dt = (sample.timestamp - state.timestamp) as f64 / 1000.0;
    let a = sample.accel;

    let roll_acc = a.y.atan2(a.z);
    let pitch_acc = (-a.x).atan2((a.y * a.y + a.z * a.z).sqrt());

    let roll_gyro = state.roll + sample.gyro.x.to_radians() * dt;
    let pitch_gyro = state.pitch + sample.gyro.y.to_radians() * dt;

    let alpha = params.alpha;
    let roll = alpha * roll_gyro + (1.0 - alpha) * roll_acc;
    let pitch = alpha * pitch_gyro + (1.0 - alpha) * pitch_acc;

    let g = params.gravity;
    let output = GravitySample {
        timestamp: sample.timestamp,
        x: -g * pitch.sin(),
        y: g * roll.sin() * pitch.cos(),
        z: g * roll.cos() * pitch.cos(),
    };
    let next = OrientationState {
        roll,
        pitch,
        timestamp: sample.timestamp,
    };
    (next, output)
}

/// Fold `step` over samples already in ascending timestamp order.
pub fn fuse(samples: &[ImuSample], params: &FusionParams) -> Vec<GravitySample> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    samples
        .iter()
        .scan(OrientationState::initial(first.timestamp), |state, sample| {
            let (next, output) = step(*state, sample, params);
            *state = next;
            Some(output)
        })
        .collect()
}

fn axes(stream: &SensorStream) -> Result<Vec<(i64, Vector3<f64>)>> {
    stream
        .samples
        .iter()
        .map(|s| match s.values.as_slice() {
            [x, y, z] => Ok((s.timestamp, Vector3::new(*x, *y, *z))),
            other => Err(SyncError::MissingAxes {
                path: stream.label(),
                found: other.len(),
            }),
        })
        .collect()
}

/// Inner join on exact timestamp equality, sorted by timestamp.
///
/// Rows missing from any of the three streams are dropped. A repeated timestamp in
/// the gyroscope or magnetometer stream matches its first occurrence only.
pub fn join_streams(
    accel: &SensorStream,
    gyro: &SensorStream,
    mag: &SensorStream,
) -> Result<Vec<ImuSample>> {
    let mut gyro_by_ts = HashMap::new();
    for (t, v) in axes(gyro)? {
        gyro_by_ts.entry(t).or_insert(v);
    }
    let mut mag_by_ts = HashMap::new();
    for (t, v) in axes(mag)? {
        mag_by_ts.entry(t).or_insert(v);
    }

    let mut joined: Vec<ImuSample> = axes(accel)?
        .into_iter()
        .filter_map(|(timestamp, accel)| {
            Some(ImuSample {
                timestamp,
                accel,
                gyro: *gyro_by_ts.get(&timestamp)?,
                mag: *mag_by_ts.get(&timestamp)?,
            })
        })
        .collect();
    joined.sort_by_key(|s| s.timestamp);

    log::info!(
        "Joined {} of {} accelerometer rows with gyroscope and magnetometer",
        joined.len(),
        accel.len()
    );
    Ok(joined)
}

/// Headerless `timestamp,x,y,z` rows, optionally preceded by a header line.
pub fn write_gravity(path: &Path, samples: &[GravitySample], header: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SyncError::write(parent, e))?;
    }
    let file = File::create(path).map_err(|e| SyncError::write(path, e))?;
    write_gravity_rows(BufWriter::new(file), samples, header).map_err(|e| SyncError::write(path, e))
}

fn write_gravity_rows<W: Write>(
    mut writer: W,
    samples: &[GravitySample],
    header: bool,
) -> std::io::Result<()> {
    if header {
        writeln!(writer, "{}", GRAVITY_HEADER)?;
    }
    for s in samples {
        writeln!(writer, "{},{},{},{}", s.timestamp, s.x, s.y, s.z)?;
    }
    writer.flush()
}

/// Load three aligned recordings, fuse them and write the gravity stream.
///
/// Returns the number of rows written. Inputs are only read.
pub fn fuse_files(
    accel: &Path,
    gyro: &Path,
    mag: &Path,
    output: &Path,
    params: &FusionParams,
    header: bool,
) -> Result<usize> {
    crate::profile_scope!(format!("gravity {}", output.display()));
    let accel = load_stream(accel)?;
    let gyro = load_stream(gyro)?;
    let mag = load_stream(mag)?;

    let joined = join_streams(&accel, &gyro, &mag)?;
    let gravity = fuse(&joined, params);
    write_gravity(output, &gravity, header)?;

    log::info!("Wrote {} gravity rows to {}", gravity.len(), output.display());
    Ok(gravity.len())
}
