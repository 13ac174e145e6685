// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn record(name: &str, dir: &str) -> ModuleRecord {
    ModuleRecord {
        name: name.to_string(),
        source_dir: PathBuf::from(dir),
        config_path: PathBuf::from(dir).join("orgloop.json"),
        loaded_at: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().unwrap(),
    }
}

#[test]
fn upsert_and_list_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modules.json");

    let registry = ModuleRegistry::open(&path).unwrap();
    registry.upsert(record("a", "/proj/a")).unwrap();
    registry.upsert(record("b", "/proj/b")).unwrap();

    let reopened = ModuleRegistry::open(&path).unwrap();
    assert_eq!(reopened.list().len(), 2);
    assert_eq!(reopened.get("a").unwrap().source_dir, PathBuf::from("/proj/a"));
}

#[test]
fn same_name_replaces_prior_entry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModuleRegistry::open(&dir.path().join("modules.json")).unwrap();

    registry.upsert(record("a", "/proj/a")).unwrap();
    registry.upsert(record("a", "/proj/a2")).unwrap();

    let records = registry.list();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_dir, PathBuf::from("/proj/a2"));
}

#[test]
fn same_source_dir_replaces_prior_entry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModuleRegistry::open(&dir.path().join("modules.json")).unwrap();

    registry.upsert(record("a", "/proj/shared")).unwrap();
    registry.upsert(record("b", "/proj/shared")).unwrap();

    let records = registry.list();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "b");
}

#[test]
fn remove_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModuleRegistry::open(&dir.path().join("modules.json")).unwrap();

    registry.upsert(record("a", "/proj/a")).unwrap();
    registry.remove("a").unwrap();
    assert!(registry.list().is_empty());
}

#[test]
fn wire_format_uses_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modules.json");
    let registry = ModuleRegistry::open(&path).unwrap();
    registry.upsert(record("a", "/proj/a")).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value["modules"][0].get("sourceDir").is_some());
    assert!(value["modules"][0].get("configPath").is_some());
    assert!(value["modules"][0].get("loadedAt").is_some());
}
