use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::tempdir;

use gen_config_migrate::error::MigrateError;
use gen_config_migrate::migrate::{backup_path, migrate_file, migrate_files};

const LEGACY: &str = r#"{
  "description": "default preset",
  "inner_rad_mut_prob": 0.25,
  "inner_size_mut_prob": 0.5,
  "shift_weights": [0.4, 0.22, 0.2, 0.18],
  "inner_size_probs": [[3, 0.25], [5, 0.75]],
  "outer_margin_probs": [[0, 0.5], [2, 0.5]],
  "circ_probs": [[0.0, 0.75], [0.6, 0.15], [0.8, 0.05]],
  "platform_distance_bounds": [500, 750]
}"#;

fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn top_level_keys(path: &Path) -> Vec<String> {
    read_json(path)
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

#[test]
fn migrate_file_writes_v1_and_keeps_exact_backup() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "hard.json", LEGACY);

    let report = migrate_file(&path).unwrap();

    assert_eq!(report.backup, dir.path().join("hard.json.bak"));
    assert_eq!(fs::read_to_string(&report.backup).unwrap(), LEGACY);

    assert_eq!(
        top_level_keys(&path),
        [
            "description",
            "inner_rad_mut_prob",
            "version",
            "inner_size_mut_prob",
            "shift_weights",
            "inner_size_probs",
            "outer_margin_probs",
            "circ_probs",
            "platform_distance_bounds"
        ]
    );

    let migrated = read_json(&path);
    assert_eq!(migrated["version"], "1.0");
    assert_eq!(migrated["inner_size_probs"]["values"], serde_json::json!([3, 5]));
    assert_eq!(migrated["outer_margin_probs"]["probs"], serde_json::json!([0.5, 0.5]));
    assert!(migrated["shift_weights"]["values"].is_null());
    assert_eq!(migrated["circ_probs"], read_json(&report.backup)["circ_probs"]);

    let sum: f64 = migrated["shift_weights"]["probs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_f64().unwrap())
        .sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn migrated_file_is_two_space_pretty_json() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "small.json",
        r#"{"a":1,"b":2,"inner_size_probs":[[0,0.5],[1,0.5]],"outer_margin_probs":[],"shift_weights":[1,3]}"#,
    );

    migrate_file(&path).unwrap();

    let expected = r#"{
  "a": 1,
  "b": 2,
  "version": "1.0",
  "inner_size_probs": {
    "values": [
      0,
      1
    ],
    "probs": [
      0.5,
      0.5
    ]
  },
  "outer_margin_probs": {
    "values": [],
    "probs": []
  },
  "shift_weights": {
    "values": null,
    "probs": [
      0.25,
      0.75
    ]
  }
}"#;
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn second_run_fails_without_touching_files() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "twice.json", LEGACY);

    migrate_file(&path).unwrap();
    let migrated = fs::read_to_string(&path).unwrap();

    let err = migrate_file(&path).unwrap_err();
    assert!(matches!(err, MigrateError::AlreadyVersioned(ref v) if v == "1.0"));

    assert_eq!(fs::read_to_string(&path).unwrap(), migrated);
    assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), LEGACY);
}

#[test]
fn occupied_backup_slot_aborts_before_rename() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "taken.json", LEGACY);
    let backup = write_config(dir.path(), "taken.json.bak", "older backup");

    let err = migrate_file(&path).unwrap_err();

    assert!(matches!(err, MigrateError::BackupExists(ref p) if p == &backup));
    assert_eq!(fs::read_to_string(&path).unwrap(), LEGACY);
    assert_eq!(fs::read_to_string(&backup).unwrap(), "older backup");
}

#[test]
fn malformed_json_leaves_file_in_place() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "broken.json", "{\"shift_weights\": [1, 2,");

    let err = migrate_file(&path).unwrap_err();

    assert_eq!(err.code(), "json_error");
    assert!(err.to_string().contains("broken.json"));
    assert!(!backup_path(&path).exists());
}

#[test]
fn zero_weight_sum_leaves_file_in_place() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "flat.json", r#"{"shift_weights": [0, 0, 0]}"#);

    let err = migrate_file(&path).unwrap_err();

    assert!(matches!(err, MigrateError::ZeroWeightSum));
    assert!(!backup_path(&path).exists());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = migrate_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, MigrateError::Io { .. }));
}

#[test]
fn batch_stops_at_first_failure() {
    let dir = tempdir().unwrap();
    let first = write_config(dir.path(), "first.json", LEGACY);
    let missing = dir.path().join("missing.json");
    let last = write_config(dir.path(), "last.json", LEGACY);

    let err = migrate_files(&[first.clone(), missing, last.clone()]).unwrap_err();

    assert_eq!(err.code(), "io_error");
    assert_eq!(read_json(&first)["version"], "1.0");
    assert!(backup_path(&first).exists());
    assert_eq!(fs::read_to_string(&last).unwrap(), LEGACY);
    assert!(!backup_path(&last).exists());
}
