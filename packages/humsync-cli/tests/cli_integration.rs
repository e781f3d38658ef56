use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn humsync() -> Command {
    let mut cmd = Command::cargo_bin("humsync").unwrap();
    // keep a developer's own config.json out of the runs
    cmd.env_remove("HUMSYNC_CONFIG")
        .env("XDG_CONFIG_HOME", "/nonexistent_humsync_config");
    cmd
}

fn write_recording(path: &Path, start: i64, end: i64, step: i64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let body: String = (0..)
        .map(|i| start + i * step)
        .take_while(|t| *t <= end)
        .map(|t| format!("{},0.1,0.2,9.8\n", t))
        .collect();
    fs::write(path, body).unwrap();
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    humsync()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    humsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("humsync"));
}

#[test]
fn test_help_lists_subcommands() {
    humsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("segment"))
        .stdout(predicate::str::contains("gravity"));
}

// =============================================================================
// CONFIG SUBCOMMAND
// =============================================================================

#[test]
fn test_config_defaults() {
    humsync()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"event_duration_ms\": 5000"))
        .stdout(predicate::str::contains("\"min_duration_ms\": 10000"))
        .stdout(predicate::str::contains("\"gravity\": 13.25"));
}

#[test]
fn test_config_compact_is_one_line() {
    humsync()
        .args(["config", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"event_duration_ms\":5000"))
        .stdout(predicate::str::is_match("^\\{[^\n]*\\}\n$").unwrap());
}

#[test]
fn test_config_file_overrides_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");
    fs::write(&path, r#"{"event_duration_ms": 2000, "activities": ["walking"]}"#).unwrap();

    humsync()
        .args(["config", "--config", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"event_duration_ms\": 2000"))
        .stdout(predicate::str::contains("\"alpha\": 0.98"))
        .stdout(predicate::str::contains("walking"));
}

#[test]
fn test_invalid_config_is_input_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");
    fs::write(&path, r#"{"alpha": 3.0}"#).unwrap();

    humsync()
        .args(["config", "--config", path.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("alpha"));
}

#[test]
fn test_malformed_config_is_input_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    humsync()
        .args(["config", "--config", path.to_str().unwrap()])
        .assert()
        .code(2);
}

// =============================================================================
// SYNC SUBCOMMAND
// =============================================================================

#[test]
fn test_sync_writes_mirrored_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("raw");
    let out = tmp.path().join("synced");
    write_recording(&raw.join("s1/walking/phone_accelerometer.csv"), 0, 3000, 10);
    write_recording(&raw.join("s1/walking/watch_accelerometer.csv"), 500, 4000, 10);

    humsync()
        .args(["sync", "--input", raw.to_str().unwrap()])
        .args(["--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("[500, 3000]"))
        .stderr(predicate::str::contains("2 succeeded"));

    let phone = fs::read_to_string(out.join("s1/walking/phone_accelerometer.csv")).unwrap();
    assert_eq!(phone.lines().next(), Some("500,0.1,0.2,9.8"));
    assert_eq!(phone.lines().last(), Some("3000,0.1,0.2,9.8"));
}

#[test]
fn test_sync_json_report() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("raw");
    let out = tmp.path().join("synced");
    write_recording(&raw.join("s1/sitting/a.csv"), 0, 1000, 10);
    write_recording(&raw.join("s1/sitting/b.csv"), 2000, 3000, 10);

    let output = humsync()
        .args(["sync", "--json", "--input", raw.to_str().unwrap()])
        .args(["--output", out.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["id"].as_str().map(str::len), Some(36));
    assert_eq!(report["activities"][0]["error"]["kind"], "no_overlap");
    assert_eq!(report["activities"][0]["error"]["skipped"], true);
}

#[test]
fn test_sync_missing_input_is_input_error() {
    let tmp = tempfile::tempdir().unwrap();
    humsync()
        .args(["sync", "--input", "/nonexistent_dir_12345"])
        .args(["--output", tmp.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_sync_refuses_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().to_str().unwrap();
    humsync()
        .args(["sync", "--input", root, "--output", root])
        .assert()
        .code(2);
}

// =============================================================================
// SEGMENT / REPAIR SUBCOMMANDS
// =============================================================================

#[test]
fn test_segment_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let act = tmp.path().join("s1/walking");
    write_recording(&act.join("phone_gyroscope.csv"), 0, 17_000, 20);

    humsync()
        .args(["segment", "--root", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 event(s) written"));

    assert!(!act.join("phone_gyroscope.csv").exists());
    assert!(act.join("phone_gyroscope_e0.csv").exists());
    assert!(act.join("phone_gyroscope_e2.csv").exists());
    assert!(!act.join("phone_gyroscope_e3.csv").exists());
}

#[test]
fn test_segment_custom_event_length() {
    let tmp = tempfile::tempdir().unwrap();
    let act = tmp.path().join("s1/walking");
    write_recording(&act.join("phone_gyroscope.csv"), 0, 9_000, 20);

    humsync()
        .args(["segment", "--event-ms", "2000", "--root", tmp.path().to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(count_files(&act), 4);
    assert!(act.join("phone_gyroscope_e3.csv").exists());
}

#[test]
fn test_segment_dry_run_lists_plan() {
    let tmp = tempfile::tempdir().unwrap();
    let act = tmp.path().join("s1/walking");
    write_recording(&act.join("phone_gyroscope.csv"), 0, 12_000, 20);

    humsync()
        .args(["segment", "--dry-run", "--root", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("phone_gyroscope_e0.csv"))
        .stdout(predicate::str::contains("phone_gyroscope_e1.csv"));

    assert_eq!(count_files(&act), 1);
    assert!(act.join("phone_gyroscope.csv").exists());
}

#[test]
fn test_segment_short_recording_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let act = tmp.path().join("s1/walking");
    write_recording(&act.join("phone_gyroscope.csv"), 0, 9_000, 20);

    humsync()
        .args(["segment", "--root", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 skipped"));

    assert!(act.join("phone_gyroscope.csv").exists());
}

#[test]
fn test_repair_renames_chained_events() {
    let tmp = tempfile::tempdir().unwrap();
    write_recording(&tmp.path().join("watch_gyroscope_e0_e4.csv"), 0, 100, 10);
    write_recording(&tmp.path().join("watch_gyroscope_e1.csv"), 0, 100, 10);
    write_recording(&tmp.path().join("watch_gyroscope_e0_e1.csv"), 0, 100, 10);

    humsync()
        .args(["repair", "--dir", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("renamed"))
        .stdout(predicate::str::contains("conflict"));

    assert!(tmp.path().join("watch_gyroscope_e4.csv").exists());
    // the existing e1 blocks the rename; both files stay
    assert!(tmp.path().join("watch_gyroscope_e0_e1.csv").exists());
    assert!(tmp.path().join("watch_gyroscope_e1.csv").exists());
}

#[test]
fn test_repair_missing_dir() {
    humsync()
        .args(["repair", "--dir", "/nonexistent_dir_12345"])
        .assert()
        .code(2);
}

// =============================================================================
// GRAVITY / INSPECT SUBCOMMANDS
// =============================================================================

#[test]
fn test_gravity_at_rest() {
    let tmp = tempfile::tempdir().unwrap();
    let rows: String = (0..10).map(|i| format!("{},0,0,1\n", i * 20)).collect();
    let still: String = (0..10).map(|i| format!("{},0,0,0\n", i * 20)).collect();
    let acc = tmp.path().join("acc.csv");
    let gyro = tmp.path().join("gyro.csv");
    let mag = tmp.path().join("mag.csv");
    fs::write(&acc, &rows).unwrap();
    fs::write(&gyro, still).unwrap();
    fs::write(&mag, &rows).unwrap();
    let out = tmp.path().join("gravity.csv");

    humsync()
        .args(["gravity", "--header", "--g", "9.81"])
        .args(["--acc", acc.to_str().unwrap()])
        .args(["--gyro", gyro.to_str().unwrap()])
        .args(["--mag", mag.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("10 gravity sample(s)"));

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("timestamp,gravity_x,gravity_y,gravity_z"));
    assert_eq!(lines.count(), 10);
    assert!(text.contains(",9.81"));
}

#[test]
fn test_gravity_rejects_bad_alpha() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("x.csv");
    fs::write(&p, "0,0,0,1\n").unwrap();
    let p = p.to_str().unwrap();

    humsync()
        .args(["gravity", "--alpha", "1.5", "--acc", p, "--gyro", p, "--mag", p])
        .args(["-o", tmp.path().join("out.csv").to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn test_inspect_json() {
    let tmp = tempfile::tempdir().unwrap();
    write_recording(&tmp.path().join("s1/walking/a.csv"), 100, 900, 100);
    fs::write(tmp.path().join("s1/walking/b.csv"), "").unwrap();

    let output = humsync()
        .args(["inspect", "--json", "--root", tmp.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summaries[0]["rows"], 9);
    assert_eq!(summaries[0]["duration_ms"], 800);
    assert_eq!(summaries[1]["error"]["kind"], "empty_stream");
}

#[test]
fn test_inspect_table() {
    let tmp = tempfile::tempdir().unwrap();
    write_recording(&tmp.path().join("s1/walking/a.csv"), 100, 900, 100);

    humsync()
        .args(["inspect", "--root", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("SPAN_MS"))
        .stdout(predicate::str::contains("800"));
}
