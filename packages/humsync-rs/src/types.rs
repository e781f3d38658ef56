use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One parsed row of a sensor recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Milliseconds, column 0
    pub timestamp: i64,
    /// Axis values from columns 1..=3 (fewer if the row is short)
    pub values: Vec<f64>,
    /// Verbatim source row, written back unchanged by the slicer and segmenter
    pub line: String,
}

impl Sample {
    pub fn new(timestamp: i64, values: Vec<f64>) -> Self {
        let mut line = timestamp.to_string();
        for v in &values {
            line.push(',');
            line.push_str(&v.to_string());
        }
        Self {
            timestamp,
            values,
            line,
        }
    }
}

/// Ordered samples of one sensor file for one subject and activity.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStream {
    /// Sensor-identifying prefix, the file stem (e.g. `glass_accelerometer`)
    pub name: String,
    pub path: Option<PathBuf>,
    pub samples: Vec<Sample>,
}

impl SensorStream {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            path: None,
            samples,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Smallest and largest timestamp. Assumes nothing about ordering.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let mut iter = self.samples.iter().map(|s| s.timestamp);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Last row's timestamp minus the first row's.
    pub fn duration_ms(&self) -> Option<i64> {
        let first = self.samples.first()?.timestamp;
        let last = self.samples.last()?.timestamp;
        Some(last - first)
    }

    /// Label used in logs and reports.
    pub fn label(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => self.name.clone(),
        }
    }
}

/// Closed interval `[start, end]` covered by every stream of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWindow {
    pub start: i64,
    pub end: i64,
}

impl SyncWindow {
    pub fn new(start: i64, end: i64) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    pub fn duration_ms(&self) -> i64 {
        self.end - self.start
    }
}

/// One subject/activity folder and the sensor files found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityDescriptor {
    pub subject: String,
    pub activity: String,
    pub dir: PathBuf,
    pub sensor_files: Vec<PathBuf>,
}

/// Output row of the gravity fusion filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GravitySample {
    pub timestamp: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_unordered() {
        let stream = SensorStream::new(
            "phone_gyroscope",
            vec![
                Sample::new(300, vec![]),
                Sample::new(100, vec![]),
                Sample::new(200, vec![]),
            ],
        );
        assert_eq!(stream.bounds(), Some((100, 300)));
        // duration follows row order, not min/max
        assert_eq!(stream.duration_ms(), Some(-100));
    }

    #[test]
    fn test_empty_stream_has_no_bounds() {
        let stream = SensorStream::new("x", vec![]);
        assert!(stream.bounds().is_none());
        assert!(stream.duration_ms().is_none());
    }

    #[test]
    fn test_window_validity() {
        assert!(SyncWindow::new(10, 10).is_some());
        assert!(SyncWindow::new(11, 10).is_none());
        let w = SyncWindow::new(10, 20).unwrap();
        assert!(w.contains(10));
        assert!(w.contains(20));
        assert!(!w.contains(21));
    }

    #[test]
    fn test_sample_line_rendering() {
        let s = Sample::new(1000, vec![0.5, -1.0, 2.25]);
        assert_eq!(s.line, "1000,0.5,-1,2.25");
    }
}
