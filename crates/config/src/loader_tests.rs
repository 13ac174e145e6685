// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::io::Write;

fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

const JSON_CONFIG: &str = r#"{
    "name": "m1",
    "sources": [{"id": "s1", "connector": "cron", "config": {"schedule": "tick"},
                 "poll": {"interval": "30s"}}],
    "actors": [{"id": "a1", "connector": "http", "config": {"url": "http://127.0.0.1:1/x"}}],
    "routes": [{"name": "r1", "when": {"source": "s1", "events": ["resource.changed"]},
                "then": {"actor": "a1"}}]
}"#;

#[test]
fn loads_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "module.json", JSON_CONFIG);

    let config = load_module_config(&path).unwrap();
    assert_eq!(config.name, "m1");
    assert_eq!(config.module_path.as_deref(), Some(dir.path()));
}

#[test]
fn loads_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "module.toml",
        r#"
name = "m2"

[[sources]]
id = "s1"
connector = "cron"

[sources.poll]
interval = "1m"

[[actors]]
id = "a1"
connector = "http"

[[routes]]
name = "r1"

[routes.when]
source = "s1"
events = ["resource.changed"]

[routes.then]
actor = "a1"
"#,
    );

    let config = load_module_config(&path).unwrap();
    assert_eq!(config.name, "m2");
    assert_eq!(config.sources[0].poll.as_ref().unwrap().interval, "1m");
}

#[test]
fn rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "module.yaml", "name: nope");
    assert!(matches!(
        load_module_config(&path),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "module.json", "{not json");
    assert!(matches!(
        load_module_config(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
#[serial]
fn applies_env_substitution_before_validation() {
    std::env::set_var("OL_TEST_REPO", "acme/widgets");
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "module.json",
        r#"{
            "name": "m3",
            "sources": [{"id": "gh", "connector": "github",
                         "config": {"repo": "${OL_TEST_REPO}"},
                         "poll": {"interval": "5m"}}]
        }"#,
    );

    let config = load_module_config(&path).unwrap();
    assert_eq!(config.sources[0].config["repo"], "acme/widgets");
    std::env::remove_var("OL_TEST_REPO");
}
