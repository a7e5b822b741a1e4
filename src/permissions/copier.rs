//! Subtree inheritance copier: copy a page's permission set onto a page below it.
//!
//! Copies always point at the root of the source row's lineage, never at an
//! intermediate copy. A target row with a different level is a local override
//! and is left alone.

use rusqlite::Connection;
use tracing::{debug, info};

use super::propagation;
use crate::errors::{PermissionError, PermissionResult};
use crate::queries::{page_ops, permission_ops};
use crate::tree;
use crate::types::{PageWithPermissions, PermissionInput};

/// Counts for one copy onto one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    pub overrides_kept: usize,
    pub cascaded_rows: usize,
}

impl CopyStats {
    fn absorb(&mut self, other: CopyStats) {
        self.copied += other.copied;
        self.overrides_kept += other.overrides_kept;
        self.cascaded_rows += other.cascaded_rows;
    }
}

/// Fail with `CannotInheritOutsideTree` unless `target_page_id` is below `source_page_id`.
pub fn require_below(
    conn: &Connection,
    source_page_id: &str,
    target_page_id: &str,
) -> PermissionResult<()> {
    page_ops::require_page(conn, source_page_id)?;
    let target = page_ops::require_page(conn, target_page_id)?;

    let direct_child = target.parent_id.as_deref() == Some(source_page_id);
    if direct_child || tree::is_ancestor(conn, source_page_id, target_page_id)? {
        return Ok(());
    }

    Err(PermissionError::CannotInheritOutsideTree {
        source_page_id: source_page_id.to_string(),
        target_page_id: target_page_id.to_string(),
    })
}

fn copy_onto(
    conn: &Connection,
    source_page_id: &str,
    target_page_id: &str,
) -> PermissionResult<CopyStats> {
    let mut stats = CopyStats::default();

    for source_row in permission_ops::list_page_rows(conn, source_page_id)? {
        let lineage_root = source_row.lineage_root().to_string();

        if let Some(existing) =
            permission_ops::find_for_grantee(conn, target_page_id, &source_row.grantee)?
        {
            // Levels compare by name; two custom rows count as the same level.
            if existing.permission_level.name() != source_row.permission_level.name() {
                debug!(
                    page_id = target_page_id,
                    grantee = %existing.grantee,
                    "keeping local override"
                );
                stats.overrides_kept += 1;
                continue;
            }
            if existing.inherited_from_permission.as_deref() == Some(lineage_root.as_str()) {
                continue;
            }
        }

        let propagated = propagation::create_permission(
            conn,
            PermissionInput::inherited(target_page_id, lineage_root),
        )?;
        stats.copied += 1;
        stats.cascaded_rows += propagated.cascaded_rows;
    }

    Ok(stats)
}

fn page_with_permissions(conn: &Connection, page_id: &str) -> PermissionResult<PageWithPermissions> {
    Ok(PageWithPermissions {
        page: page_ops::require_page(conn, page_id)?,
        permissions: permission_ops::list_page_permissions(conn, page_id)?,
    })
}

/// Copy the permissions of `source_page_id` onto `target_page_id`.
pub fn inherit_from(
    conn: &Connection,
    source_page_id: &str,
    target_page_id: &str,
) -> PermissionResult<(PageWithPermissions, CopyStats)> {
    require_below(conn, source_page_id, target_page_id)?;
    let stats = copy_onto(conn, source_page_id, target_page_id)?;

    info!(
        source_page_id,
        target_page_id,
        copied = stats.copied,
        overrides_kept = stats.overrides_kept,
        "inherited permissions"
    );
    Ok((page_with_permissions(conn, target_page_id)?, stats))
}

/// `inherit_from` onto `target_page_id` and every page below it.
///
/// The pages below the target are resolved once, before any copy is written.
pub fn inherit_across_subtree(
    conn: &Connection,
    source_page_id: &str,
    target_page_id: &str,
) -> PermissionResult<(PageWithPermissions, CopyStats)> {
    require_below(conn, source_page_id, target_page_id)?;
    let descendants = tree::resolve_descendants(conn, target_page_id)?;

    let mut stats = copy_onto(conn, source_page_id, target_page_id)?;
    for page in &descendants {
        stats.absorb(copy_onto(conn, source_page_id, &page.id)?);
    }

    info!(
        source_page_id,
        target_page_id,
        pages = descendants.len() + 1,
        copied = stats.copied,
        overrides_kept = stats.overrides_kept,
        "inherited permissions across subtree"
    );
    Ok((page_with_permissions(conn, target_page_id)?, stats))
}

/// Give a newly created page its parent's permissions. Root pages are returned as they are.
pub fn setup_after_page_created(
    conn: &Connection,
    page_id: &str,
) -> PermissionResult<(PageWithPermissions, CopyStats)> {
    let page = page_ops::require_page(conn, page_id)?;
    match page.parent_id {
        Some(parent_id) => inherit_from(conn, &parent_id, page_id),
        None => Ok((page_with_permissions(conn, page_id)?, CopyStats::default())),
    }
}
