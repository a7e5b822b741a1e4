//! Permission-set comparison, used to decide whether a page may switch back to inheriting.

use rusqlite::Connection;
use tracing::debug;

use crate::errors::PermissionResult;
use crate::queries::{page_ops, permission_ops};
use crate::types::{CapabilitySet, PagePermission};

/// Capabilities a row grants: the template's set, or the custom set verbatim.
pub fn capabilities_of(permission: &PagePermission) -> CapabilitySet {
    permission.permission_level.capabilities()
}

/// True when every `base` row has a `comparison` row for the same grantee
/// granting at least the same capabilities.
pub fn has_full_set_of_base_permissions(
    base: &[PagePermission],
    comparison: &[PagePermission],
) -> bool {
    base.iter().all(|base_row| {
        comparison
            .iter()
            .find(|candidate| candidate.grantee == base_row.grantee)
            .is_some_and(|matching| capabilities_of(matching).is_superset(&capabilities_of(base_row)))
    })
}

/// Whether `page_id` already carries at least its parent's access, so it could
/// switch back to inheriting without losing anything. Root pages never can.
///
/// With `ignore_permission_id`, that permission and every row sourced from it
/// are left out on both sides.
pub fn can_inherit_from_parent(
    conn: &Connection,
    page_id: &str,
    ignore_permission_id: Option<&str>,
) -> PermissionResult<bool> {
    let page = page_ops::require_page(conn, page_id)?;
    let Some(parent_id) = page.parent_id else {
        return Ok(false);
    };

    let keep = |row: &PagePermission| match ignore_permission_id {
        Some(ignored) => {
            row.id != ignored && row.inherited_from_permission.as_deref() != Some(ignored)
        }
        None => true,
    };

    let parent_rows: Vec<PagePermission> = permission_ops::list_page_rows(conn, &parent_id)?
        .into_iter()
        .filter(|row| keep(row))
        .collect();
    let page_rows: Vec<PagePermission> = permission_ops::list_page_rows(conn, page_id)?
        .into_iter()
        .filter(|row| keep(row))
        .collect();

    let eligible = has_full_set_of_base_permissions(&parent_rows, &page_rows);
    debug!(page_id, parent_id = %parent_id, eligible, "compared page with parent");
    Ok(eligible)
}
