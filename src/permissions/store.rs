//! Permission record store: listing, validated upsert by `(page_id, grantee)`, cascading delete.
//!
//! Functions here never propagate values to other rows; see `propagation`.

use rusqlite::Connection;
use tracing::{debug, warn};
use uuid::Uuid;

use super::validation::check_inheritance_link;
use crate::errors::{PermissionError, PermissionResult};
use crate::queries::{page_ops, permission_ops};
use crate::types::{
    FreshPermission, Grantee, PagePermission, PermissionInput, PermissionLevel,
    PermissionWithSource,
};

/// A validated write, ready to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWrite {
    pub page_id: String,
    pub grantee: Grantee,
    pub permission_level: PermissionLevel,
    pub inherited_from_permission: Option<String>,
}

/// State of the `(page_id, grantee)` row before and after an upsert.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub previous: Option<PagePermission>,
    pub written: PagePermission,
}

/// All rows for a page, joined with their sources.
pub fn list(conn: &Connection, page_id: &str) -> PermissionResult<Vec<PermissionWithSource>> {
    permission_ops::list_page_permissions(conn, page_id)
}

/// Validate a raw input into a typed write.
///
/// Inherited writes copy grantee and value from the source row.
pub fn resolve_input(conn: &Connection, input: PermissionInput) -> PermissionResult<ResolvedWrite> {
    match input {
        PermissionInput::Fresh(FreshPermission {
            page_id,
            grantee,
            permission_level,
            custom_capabilities,
        }) => Ok(ResolvedWrite {
            grantee: grantee.into_grantee()?,
            permission_level: PermissionLevel::parse(&permission_level, &custom_capabilities)?,
            page_id,
            inherited_from_permission: None,
        }),
        PermissionInput::Inherited {
            page_id,
            inherited_from_permission,
        } => {
            let source = permission_ops::require_permission(conn, &inherited_from_permission)?;
            let source_of_source = match &source.inherited_from_permission {
                Some(upstream_id) => permission_ops::get_permission(conn, upstream_id)?,
                None => None,
            };
            check_inheritance_link(&page_id, &source, source_of_source.as_ref())?;

            Ok(ResolvedWrite {
                page_id,
                grantee: source.grantee,
                permission_level: source.permission_level,
                inherited_from_permission: Some(source.id),
            })
        }
    }
}

/// Insert or update the row for `(page_id, grantee)`. The row id is stable across updates.
pub fn upsert_resolved(conn: &Connection, write: ResolvedWrite) -> PermissionResult<UpsertOutcome> {
    page_ops::require_page(conn, &write.page_id)?;

    let previous = permission_ops::find_for_grantee(conn, &write.page_id, &write.grantee)?;
    let written = match &previous {
        Some(existing) => {
            permission_ops::update_permission(
                conn,
                &existing.id,
                &write.permission_level,
                write.inherited_from_permission.as_deref(),
            )?;
            debug!(permission_id = %existing.id, page_id = %write.page_id, "updated permission");
            PagePermission {
                id: existing.id.clone(),
                page_id: write.page_id,
                grantee: write.grantee,
                permission_level: write.permission_level,
                inherited_from_permission: write.inherited_from_permission,
            }
        }
        None => {
            let permission = PagePermission {
                id: Uuid::new_v4().to_string(),
                page_id: write.page_id,
                grantee: write.grantee,
                permission_level: write.permission_level,
                inherited_from_permission: write.inherited_from_permission,
            };
            permission_ops::insert_permission(conn, &permission)?;
            debug!(permission_id = %permission.id, page_id = %permission.page_id, "inserted permission");
            permission
        }
    };

    Ok(UpsertOutcome { previous, written })
}

/// Validate and upsert without propagating to dependent rows.
pub fn upsert_permission(
    conn: &Connection,
    input: PermissionInput,
) -> PermissionResult<UpsertOutcome> {
    let page_id = input.page_id().to_string();
    let write = resolve_input(conn, input).inspect_err(|e| {
        warn!(page_id = %page_id, error = %e, "rejected permission write");
    })?;
    upsert_resolved(conn, write)
}

/// Delete a row and every row whose source link equals it.
///
/// Returns the number of rows removed directly; rows inheriting from those
/// are removed by the foreign-key cascade.
pub fn delete(conn: &Connection, permission_id: &str) -> PermissionResult<usize> {
    if permission_ops::get_permission(conn, permission_id)?.is_none() {
        return Err(PermissionError::permission_not_found(permission_id));
    }

    let inheritors = permission_ops::delete_inheriting_from(conn, permission_id)?;
    let removed = permission_ops::delete_permission_row(conn, permission_id)?;
    debug!(permission_id, inheritors, "deleted permission");
    Ok(inheritors + removed)
}
