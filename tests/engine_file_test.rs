//! File-backed engine: configuration, persistence across reopen, audit log.

mod common;

use common::{build_tree, grant, inherit, init_tracing, SPACE};
use page_permissions::{EngineConfig, GranteeInput, PermissionEngine, PermissionError};

fn file_config(dir: &tempfile::TempDir) -> EngineConfig {
    let path = dir.path().join("permissions.db");
    EngineConfig::from_toml(&format!(
        "db_path = {:?}\nread_pool_size = 2\nbusy_timeout_ms = 2000\n",
        path.to_string_lossy()
    ))
    .unwrap()
}

#[test]
fn grants_survive_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);

    let root_grant_id = {
        let engine = PermissionEngine::open(config.clone()).unwrap();
        build_tree(&engine, &[("r", None), ("c", Some("r"))]);
        let root_grant = grant(&engine, "r", GranteeInput::space(SPACE), "edit");
        inherit(&engine, "c", &root_grant.id);

        // Readers see committed writes.
        assert_eq!(engine.list_permissions("c").unwrap().len(), 1);
        root_grant.id.clone()
    };

    let engine = PermissionEngine::open(config).unwrap();
    let rows = engine.list_permissions("c").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].inherited_from_permission.as_deref(), Some(root_grant_id.as_str()));
    assert_eq!(engine.get_page("c").unwrap().unwrap().parent_id.as_deref(), Some("r"));
}

#[test]
fn structural_operations_are_audited() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let engine = PermissionEngine::open(file_config(&dir)).unwrap();
    build_tree(&engine, &[("r", None), ("c", Some("r"))]);

    let root_grant = grant(&engine, "r", GranteeInput::space(SPACE), "view");
    engine.inherit_from("r", "c").unwrap();
    engine.break_inheritance("c").unwrap();

    let events = engine.recent_events(10).unwrap();
    let kinds: Vec<&str> = events.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["break_inheritance", "inherit_from", "create"]);
    assert_eq!(events[2].permission_id.as_deref(), Some(root_grant.id.as_str()));
    assert_eq!(events[1].affected_rows, 1);
    assert_eq!(events[0].page_id, "c");
}

#[test]
fn audit_log_can_be_disabled() {
    init_tracing();
    let engine = PermissionEngine::open(EngineConfig {
        record_events: false,
        ..EngineConfig::default()
    })
    .unwrap();
    build_tree(&engine, &[("r", None)]);
    grant(&engine, "r", GranteeInput::user("u1"), "view");
    assert!(engine.recent_events(10).unwrap().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let err = EngineConfig::from_toml("busy_timeout_ms = 0").unwrap_err();
    assert!(matches!(err, PermissionError::Config(_)));

    let err = EngineConfig::from_toml("read_pool_size = \"many\"").unwrap_err();
    assert!(matches!(err, PermissionError::Config(_)));
}
