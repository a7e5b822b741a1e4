//! Break inheritance: localize a page's inherited rows, then re-root the pages below it.
//!
//! Effective access is unchanged everywhere; only the nearest authority of the
//! former lineage moves down to this page.

use rusqlite::Connection;
use tracing::info;

use super::cascade::{self, RowChange};
use super::store::{self, ResolvedWrite};
use crate::errors::PermissionResult;
use crate::queries::{page_ops, permission_ops};
use crate::types::{PageWithPermissions, PermissionLevel};

/// One localized row: the source it used to mirror and the Local row replacing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocalized {
    pub old_source_id: String,
    pub new_local_id: String,
    pub permission_level: PermissionLevel,
}

#[derive(Debug, Clone)]
pub struct BrokenInheritance {
    pub page: PageWithPermissions,
    pub relocalized: Vec<Relocalized>,
    /// Descendant rows repointed onto the localized rows.
    pub repointed_rows: usize,
}

pub fn break_inheritance(conn: &Connection, page_id: &str) -> PermissionResult<BrokenInheritance> {
    let page = page_ops::require_page(conn, page_id)?;

    let mut relocalized = Vec::new();
    for row in permission_ops::list_page_rows(conn, page_id)? {
        let Some(old_source_id) = row.inherited_from_permission else {
            continue;
        };
        let outcome = store::upsert_resolved(
            conn,
            ResolvedWrite {
                page_id: row.page_id,
                grantee: row.grantee,
                permission_level: row.permission_level,
                inherited_from_permission: None,
            },
        )?;
        relocalized.push(Relocalized {
            old_source_id,
            new_local_id: outcome.written.id,
            permission_level: outcome.written.permission_level,
        });
    }

    let mut changes: Vec<RowChange> = Vec::new();
    if !relocalized.is_empty() {
        let below = cascade::descendant_page_ids(conn, page_id)?;
        for pair in &relocalized {
            changes.extend(cascade::plan_repoint(
                conn,
                &below,
                &pair.old_source_id,
                &pair.new_local_id,
                &pair.permission_level,
            )?);
        }
    }
    let repointed_rows = cascade::apply_changes(conn, &changes)?;

    info!(
        page_id,
        localized = relocalized.len(),
        repointed_rows,
        "broke permission inheritance"
    );

    Ok(BrokenInheritance {
        page: PageWithPermissions {
            permissions: permission_ops::list_page_permissions(conn, page_id)?,
            page,
        },
        relocalized,
        repointed_rows,
    })
}
