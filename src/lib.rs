//! # page-permissions
//!
//! Page permission inheritance engine. Pages form a tree; each page holds
//! explicit grants (Local rows) or copies of an ancestor's grants (Inherited
//! rows). Writes at any node propagate atomically through the rows that
//! depend on them.
//!
//! ## Modules
//! - `config`: EngineConfig, TOML loading, validation
//! - `errors`: PermissionError, RecoveryAction
//! - `permissions`: store, propagation, break-inheritance, copier, comparator
//! - `queries`: row-level SQL over pages, permissions, audit events
//! - `storage`: SQLite pool, PRAGMAs, schema, migrations
//! - `tree`: ancestor/descendant resolution
//! - `types`: Page, Grantee, PermissionLevel, PagePermission, inputs
//!
//! Every write operation on [`PermissionEngine`] runs in a single SQLite
//! transaction on the writer connection.

pub mod config;
pub mod errors;
pub mod permissions;
pub mod queries;
pub mod storage;
pub mod tree;
pub mod types;

pub use config::EngineConfig;
pub use errors::{PermissionError, PermissionResult, RecoveryAction};
pub use types::{
    Capability, CapabilitySet, Grantee, GranteeInput, Page, PagePermission, PageWithPermissions,
    PermissionInput, PermissionLevel, PermissionWithSource, TemplateLevel,
};

use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use queries::{event_ops, page_ops, permission_ops, PermissionEventRow};
use storage::ConnectionPool;

/// Entry point: owns the connection pool and exposes every engine operation.
pub struct PermissionEngine {
    pool: ConnectionPool,
    config: EngineConfig,
}

impl PermissionEngine {
    /// Open the database named by `config.db_path`, or an in-memory one.
    pub fn open(config: EngineConfig) -> PermissionResult<Self> {
        config.validate()?;
        let pool = match config.db_path.as_deref() {
            Some(path) => {
                ConnectionPool::open(Path::new(path), config.read_pool_size, config.busy_timeout_ms)?
            }
            None => ConnectionPool::open_in_memory(config.busy_timeout_ms)?,
        };
        info!(
            db_path = config.db_path.as_deref().unwrap_or(":memory:"),
            readers = pool.reader_count(),
            "permission engine opened"
        );
        Ok(Self { pool, config })
    }

    /// In-memory engine with default settings.
    pub fn open_in_memory() -> PermissionResult<Self> {
        Self::open(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn record(
        &self,
        conn: &Connection,
        kind: &str,
        page_id: &str,
        permission_id: Option<&str>,
        affected_rows: usize,
    ) -> PermissionResult<()> {
        if self.config.record_events {
            event_ops::log_event(conn, kind, page_id, permission_id, affected_rows)?;
        }
        Ok(())
    }

    // ── Page mirror ──

    /// Mirror a page from the page-management collaborator. The parent must be mirrored first.
    pub fn register_page(&self, page: &Page) -> PermissionResult<()> {
        self.pool.with_transaction(|conn| page_ops::upsert_page(conn, page))
    }

    pub fn get_page(&self, page_id: &str) -> PermissionResult<Option<Page>> {
        self.pool.with_reader(|conn| page_ops::get_page(conn, page_id))
    }

    // ── Tree resolver ──

    pub fn resolve_descendants(&self, page_id: &str) -> PermissionResult<Vec<Page>> {
        self.pool
            .with_reader(|conn| tree::resolve_descendants(conn, page_id))
    }

    pub fn resolve_ancestors(&self, page_id: &str) -> PermissionResult<Vec<Page>> {
        self.pool.with_reader(|conn| tree::resolve_ancestors(conn, page_id))
    }

    // ── Permission record store ──

    /// All rows for a page, each joined with its source.
    pub fn list_permissions(&self, page_id: &str) -> PermissionResult<Vec<PermissionWithSource>> {
        self.pool.with_reader(|conn| {
            page_ops::require_page(conn, page_id)?;
            permissions::store::list(conn, page_id)
        })
    }

    pub fn get_permission(&self, permission_id: &str) -> PermissionResult<Option<PermissionWithSource>> {
        self.pool
            .with_reader(|conn| permission_ops::get_permission_with_source(conn, permission_id))
    }

    /// The row a write for `(page_id, grantee)` would update, if any.
    pub fn find_existing_permission(
        &self,
        page_id: &str,
        grantee: GranteeInput,
    ) -> PermissionResult<Option<PagePermission>> {
        let grantee = grantee.into_grantee()?;
        self.pool
            .with_reader(|conn| permission_ops::find_for_grantee(conn, page_id, &grantee))
    }

    /// Create or update the row for `(page_id, grantee)` and propagate the change.
    pub fn create_permission(&self, input: PermissionInput) -> PermissionResult<PermissionWithSource> {
        self.pool.with_transaction(|conn| {
            let propagated = permissions::create_permission(conn, input)?;
            self.record(
                conn,
                "create",
                &propagated.permission.page_id,
                Some(&propagated.permission.id),
                propagated.cascaded_rows,
            )?;
            Ok(propagated.permission)
        })
    }

    /// Delete a permission and every row inheriting from it.
    pub fn delete_permission(&self, permission_id: &str) -> PermissionResult<bool> {
        self.pool.with_transaction(|conn| {
            let page_id = permission_ops::require_permission(conn, permission_id)?.page_id;
            let removed = permissions::store::delete(conn, permission_id)?;
            self.record(conn, "delete", &page_id, Some(permission_id), removed)?;
            Ok(removed > 0)
        })
    }

    // ── Inheritance operations ──

    pub fn inherit_from(
        &self,
        source_page_id: &str,
        target_page_id: &str,
    ) -> PermissionResult<PageWithPermissions> {
        self.pool.with_transaction(|conn| {
            let (page, stats) = permissions::inherit_from(conn, source_page_id, target_page_id)?;
            self.record(conn, "inherit_from", target_page_id, None, stats.copied)?;
            Ok(page)
        })
    }

    pub fn inherit_across_subtree(
        &self,
        source_page_id: &str,
        target_page_id: &str,
    ) -> PermissionResult<PageWithPermissions> {
        self.pool.with_transaction(|conn| {
            let (page, stats) =
                permissions::inherit_across_subtree(conn, source_page_id, target_page_id)?;
            self.record(conn, "inherit_across_subtree", target_page_id, None, stats.copied)?;
            Ok(page)
        })
    }

    pub fn break_inheritance(&self, page_id: &str) -> PermissionResult<PageWithPermissions> {
        self.pool.with_transaction(|conn| {
            let broken = permissions::break_inheritance(conn, page_id)?;
            self.record(
                conn,
                "break_inheritance",
                page_id,
                None,
                broken.relocalized.len() + broken.repointed_rows,
            )?;
            Ok(broken.page)
        })
    }

    /// Copy the parent's permissions onto a newly created page.
    pub fn setup_permissions_after_page_created(
        &self,
        page_id: &str,
    ) -> PermissionResult<PageWithPermissions> {
        self.pool.with_transaction(|conn| {
            let (page, stats) = permissions::setup_after_page_created(conn, page_id)?;
            self.record(conn, "setup_after_create", page_id, None, stats.copied)?;
            Ok(page)
        })
    }

    // ── Comparator ──

    pub fn can_inherit_from_parent(
        &self,
        page_id: &str,
        ignore_permission_id: Option<&str>,
    ) -> PermissionResult<bool> {
        self.pool.with_reader(|conn| {
            permissions::can_inherit_from_parent(conn, page_id, ignore_permission_id)
        })
    }

    // ── Audit ──

    /// Most recent structural operations first.
    pub fn recent_events(&self, limit: usize) -> PermissionResult<Vec<PermissionEventRow>> {
        self.pool.with_reader(|conn| event_ops::recent_events(conn, limit))
    }
}
