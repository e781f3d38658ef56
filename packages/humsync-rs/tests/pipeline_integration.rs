use humsync_rs::report::Tallied;
use humsync_rs::{
    fuse_files, load_stream, run_segment, run_sync, FusionParams, PipelineConfig, SegmentOptions,
};
use std::fs;
use std::path::Path;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_recording(path: &Path, start: i64, end: i64, step: i64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let body: String = (0..)
        .map(|i| start + i * step)
        .take_while(|t| *t <= end)
        .map(|t| format!("{},{:.3},0.000,1.000\n", t, (t as f64 / 1000.0).sin()))
        .collect();
    fs::write(path, body).unwrap();
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// raw/
///   s1/walking  three devices overlapping on [1000, 18000]
///   s1/sitting  overlap of only 9 s
///   s2/standing no overlap at all
fn build_dataset(raw: &Path) {
    write_recording(&raw.join("s1/walking/phone_accelerometer.csv"), 0, 20_000, 20);
    write_recording(&raw.join("s1/walking/watch_accelerometer.csv"), 1_000, 25_000, 20);
    write_recording(&raw.join("s1/walking/glass_accelerometer.csv"), 500, 18_000, 20);

    write_recording(&raw.join("s1/sitting/phone_gyroscope.csv"), 0, 9_000, 20);
    write_recording(&raw.join("s1/sitting/watch_gyroscope.csv"), 0, 9_000, 20);

    write_recording(&raw.join("s2/standing/phone_gyroscope.csv"), 0, 4_000, 20);
    write_recording(&raw.join("s2/standing/watch_gyroscope.csv"), 5_000, 9_000, 20);
}

#[test]
fn test_sync_then_segment() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("raw");
    let synced = tmp.path().join("synced");
    build_dataset(&raw);
    let raw_before = fs::read_to_string(raw.join("s1/walking/phone_accelerometer.csv")).unwrap();

    let config = PipelineConfig::default();
    let sync = run_sync(&raw, &synced, &config).unwrap();
    assert_eq!(sync.activities.len(), 3);

    let tally = sync.tally();
    assert_eq!(tally.succeeded, 5);
    assert_eq!(tally.skipped, 1);
    assert_eq!(tally.failed, 0);

    let walking = load_stream(&synced.join("s1/walking/watch_accelerometer.csv")).unwrap();
    assert_eq!(walking.bounds(), Some((1_000, 18_000)));
    assert!(!synced.join("s2").exists());
    // inputs are never modified
    assert_eq!(
        fs::read_to_string(raw.join("s1/walking/phone_accelerometer.csv")).unwrap(),
        raw_before
    );

    let segment = run_segment(&synced, &config, SegmentOptions::default()).unwrap();
    let walking_report = segment
        .activities
        .iter()
        .find(|a| a.activity == "walking")
        .unwrap();
    assert_eq!(walking_report.tally().succeeded, 3);

    // 17 s window: three 5 s events, the trailing 2 s are dropped
    assert_eq!(
        file_names(&synced.join("s1/walking")),
        vec![
            "glass_accelerometer_e0.csv",
            "glass_accelerometer_e1.csv",
            "glass_accelerometer_e2.csv",
            "phone_accelerometer_e0.csv",
            "phone_accelerometer_e1.csv",
            "phone_accelerometer_e2.csv",
            "watch_accelerometer_e0.csv",
            "watch_accelerometer_e1.csv",
            "watch_accelerometer_e2.csv",
        ]
    );
    let e2 = load_stream(&synced.join("s1/walking/phone_accelerometer_e2.csv")).unwrap();
    assert_eq!(e2.bounds(), Some((11_000, 15_980)));

    // 9 s is below the 10 s minimum: left as is
    assert_eq!(
        file_names(&synced.join("s1/sitting")),
        vec!["phone_gyroscope.csv", "watch_gyroscope.csv"]
    );
    let sitting = segment
        .activities
        .iter()
        .find(|a| a.activity == "sitting")
        .unwrap();
    assert_eq!(sitting.tally().skipped, 2);
}

#[test]
fn test_segment_rerun_is_safe() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let act = tmp.path().join("s1/upstairs");
    write_recording(&act.join("phone_accelerometer.csv"), 0, 12_000, 10);
    let config = PipelineConfig {
        activities: Some(vec!["UPSTAIRS".to_string()]),
        ..Default::default()
    };

    run_segment(tmp.path(), &config, SegmentOptions::default()).unwrap();
    let first_pass = fs::read_to_string(act.join("phone_accelerometer_e0.csv")).unwrap();

    // a fresh recording dropped next to the events of the previous run
    write_recording(&act.join("phone_accelerometer.csv"), 50_000, 62_000, 10);
    let report = run_segment(tmp.path(), &config, SegmentOptions::default()).unwrap();

    let file = &report.activities[0].files[0];
    let outcome = file.outcome.as_ref().unwrap();
    assert!(outcome.events_written.is_empty());
    assert_eq!(outcome.conflicts, vec![0, 1]);
    assert!(!outcome.source_deleted);
    assert!(act.join("phone_accelerometer.csv").exists());
    assert_eq!(
        fs::read_to_string(act.join("phone_accelerometer_e0.csv")).unwrap(),
        first_pass
    );
}

#[test]
fn test_gravity_from_synced_streams() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("s1/laying");
    fs::create_dir_all(&dir).unwrap();
    let rows: String = (0..50).map(|i| format!("{},0,0,1\n", i * 20)).collect();
    fs::write(dir.join("phone_accelerometer.csv"), &rows).unwrap();
    fs::write(dir.join("phone_magnetometer.csv"), &rows).unwrap();
    let gyro: String = (0..50).map(|i| format!("{},0,0,0\n", i * 20)).collect();
    fs::write(dir.join("phone_gyroscope.csv"), gyro).unwrap();

    let params = FusionParams {
        alpha: 0.9,
        gravity: 9.81,
    };
    let out = tmp.path().join("derived/phone_gravity.csv");
    let written = fuse_files(
        &dir.join("phone_accelerometer.csv"),
        &dir.join("phone_gyroscope.csv"),
        &dir.join("phone_magnetometer.csv"),
        &out,
        &params,
        false,
    )
    .unwrap();
    assert_eq!(written, 50);

    let gravity = load_stream(&out).unwrap();
    assert_eq!(gravity.len(), 50);
    for sample in &gravity.samples {
        assert_eq!(sample.values[2], 9.81);
    }
}
