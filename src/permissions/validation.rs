//! Write-time validation of inheritance links.
//!
//! Cycle freedom is maintained inductively: a new link is checked two hops
//! deep, and every source it can point at already passed the same check.

use crate::errors::{PermissionError, PermissionResult};
use crate::types::PagePermission;

/// Reject a link from a row on `target_page_id` to `source`.
///
/// `source_of_source` is the row `source` itself inherits from, if any.
pub fn check_inheritance_link(
    target_page_id: &str,
    source: &PagePermission,
    source_of_source: Option<&PagePermission>,
) -> PermissionResult<()> {
    if source.page_id == target_page_id {
        return Err(PermissionError::SelfInheritancePermission {
            page_id: target_page_id.to_string(),
            source_permission_id: source.id.clone(),
        });
    }

    if let Some(upstream) = source_of_source {
        if upstream.page_id == target_page_id {
            return Err(PermissionError::CircularPermission {
                page_id: target_page_id.to_string(),
                source_permission_id: source.id.clone(),
            });
        }
    }

    Ok(())
}
