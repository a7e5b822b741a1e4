//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use page_permissions::{
    GranteeInput, Page, PermissionEngine, PermissionInput, PermissionWithSource,
};

pub const SPACE: &str = "space-1";

/// Install a test subscriber once; honours RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn engine() -> PermissionEngine {
    init_tracing();
    PermissionEngine::open_in_memory().expect("in-memory engine")
}

/// Register `(id, parent)` pairs in order; parents must come first.
pub fn build_tree(engine: &PermissionEngine, pages: &[(&str, Option<&str>)]) {
    for (id, parent) in pages {
        let page = match parent {
            Some(parent) => Page::child(*id, *parent, SPACE),
            None => Page::root(*id, SPACE),
        };
        engine.register_page(&page).expect("register page");
    }
}

pub fn grant(
    engine: &PermissionEngine,
    page_id: &str,
    grantee: GranteeInput,
    level: &str,
) -> PermissionWithSource {
    engine
        .create_permission(PermissionInput::fresh(page_id, grantee, level))
        .expect("fresh grant")
}

pub fn inherit(engine: &PermissionEngine, page_id: &str, source_id: &str) -> PermissionWithSource {
    engine
        .create_permission(PermissionInput::inherited(page_id, source_id))
        .expect("inherited grant")
}

/// The single row on `page_id` for `grantee`.
pub fn row_for(
    engine: &PermissionEngine,
    page_id: &str,
    grantee: GranteeInput,
) -> page_permissions::PagePermission {
    engine
        .find_existing_permission(page_id, grantee)
        .expect("lookup")
        .expect("row present")
}
