//! Environment loading integration tests: merge order, identity injection,
//! and error reporting.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use prism_core::{
    environment::{self, APPLICATION_KEY, PROJECT_KEY},
    types::{DEFAULT_APPLICATION, DEFAULT_PROJECT},
    EnvName, EnvironmentError, ProjectIdentity,
};
use rstest::rstest;
use serde_json::json;

fn env(name: &str) -> EnvName {
    EnvName::from(name)
}

// ---------------------------------------------------------------------------
// 1. Identity extraction
// ---------------------------------------------------------------------------

#[rstest]
#[case("acme-billing-origin", "acme", "billing")]
#[case("acme-billing-api-origin", "acme", "billing-api")]
#[case("randomfolder", DEFAULT_PROJECT, DEFAULT_APPLICATION)]
#[case("acme-billing", DEFAULT_PROJECT, DEFAULT_APPLICATION)]
#[case("acme-origin", DEFAULT_PROJECT, DEFAULT_APPLICATION)]
fn identity_from_leaf(#[case] leaf: &str, #[case] project: &str, #[case] application: &str) {
    let id = ProjectIdentity::from_leaf(leaf);
    assert_eq!(id.project, project);
    assert_eq!(id.application, application);
}

#[test]
fn workspace_scopes_use_workspace_leaf_for_identity() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let ws = root.child("acme-billing-origin");
    ws.child("environment/dev.json").write_str("{}").expect("write");

    let set = environment::load_workspace_scopes(ws.path()).expect("load");
    let dev = set.get(&env("dev")).expect("dev scope");
    assert_eq!(dev.get(PROJECT_KEY), Some(&json!("acme")));
    assert_eq!(dev.get(APPLICATION_KEY), Some(&json!("billing")));
}

// ---------------------------------------------------------------------------
// 2. Merge order
// ---------------------------------------------------------------------------

#[test]
fn shared_keys_appear_in_every_environment() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    ws.child("environment/all.json")
        .write_str(r#"{"region":"eu","limits":{"cpu":2}}"#)
        .expect("write");
    ws.child("environment/dev.json").write_str(r#"{"debug":true}"#).expect("write");
    ws.child("environment/prod.json").write_str(r#"{"replicas":3}"#).expect("write");

    let set = environment::load_workspace_scopes(ws.path()).expect("load");
    assert_eq!(set.len(), 2);
    for (name, scope) in set.iter() {
        assert_eq!(scope.get("region"), Some(&json!("eu")), "env {name}");
        assert_eq!(scope.get("limits"), Some(&json!({"cpu": 2})), "env {name}");
    }
    assert_eq!(set.get(&env("dev")).unwrap().get("debug"), Some(&json!(true)));
    assert_eq!(set.get(&env("prod")).unwrap().get("replicas"), Some(&json!(3)));
    assert!(set.get(&env("prod")).unwrap().get("debug").is_none());
}

#[test]
fn shared_value_overwrites_environment_value() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    ws.child("environment/all.json").write_str(r#"{"name":"shared"}"#).expect("write");
    ws.child("environment/dev.json").write_str(r#"{"name":"dev-only"}"#).expect("write");

    let set = environment::load_workspace_scopes(ws.path()).expect("load");
    assert_eq!(set.get(&env("dev")).unwrap().get("name"), Some(&json!("shared")));
}

#[test]
fn shared_only_workspace_has_no_environments() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    ws.child("environment/all.json").write_str(r#"{"name":"shared"}"#).expect("write");

    let set = environment::load_workspace_scopes(ws.path()).expect("load");
    assert!(set.is_empty());
    assert_eq!(set.shared.get("name"), Some(&json!("shared")));
    assert!(set.shared.contains_key(PROJECT_KEY));
}

#[test]
fn absent_environment_dir_is_not_fatal() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    ws.child("app.template.json").write_str("{}").expect("write");
    let set = environment::load_workspace_scopes(ws.path()).expect("load");
    assert!(set.is_empty());
}

// ---------------------------------------------------------------------------
// 3. Error messages
// ---------------------------------------------------------------------------

#[test]
fn malformed_json_names_the_file() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    ws.child("environment/dev.json").write_str("{}").expect("write");
    ws.child("environment/prod.json").write_str(r#"{"name": "#).expect("write");

    let err = environment::load_workspace_scopes(ws.path()).unwrap_err();
    assert!(matches!(err, EnvironmentError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("prod.json"), "must contain file path, got: {msg}");
}

#[test]
fn malformed_shared_file_is_fatal() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    ws.child("environment/all.json").write_str("not json").expect("write");
    ws.child("environment/dev.json").write_str("{}").expect("write");

    let err = environment::load_workspace_scopes(ws.path()).unwrap_err();
    assert!(err.to_string().contains("all.json"));
}

#[test]
fn loading_does_not_modify_environment_files() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    let dev = ws.child("environment/dev.json");
    dev.write_str(r#"{"a":1}"#).expect("write");
    ws.child("environment/all.json").write_str(r#"{"b":2}"#).expect("write");

    environment::load_workspace_scopes(ws.path()).expect("load");
    dev.assert(predicate::str::diff(r#"{"a":1}"#));
}
