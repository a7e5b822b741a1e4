//! Ancestor/descendant resolution over the `parent_id` pointers.
//!
//! Both walks keep a visited set, so a corrupted (cyclic) mirror still terminates.

use std::collections::{HashSet, VecDeque};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::errors::PermissionResult;
use crate::queries::page_ops;
use crate::types::Page;

/// Every page below `page_id`, each exactly once, breadth-first.
///
/// Fails with `PageNotFound` if `page_id` is unknown.
pub fn resolve_descendants(conn: &Connection, page_id: &str) -> PermissionResult<Vec<Page>> {
    page_ops::require_page(conn, page_id)?;

    let mut visited: HashSet<String> = HashSet::from([page_id.to_string()]);
    let mut frontier: VecDeque<String> = VecDeque::from([page_id.to_string()]);
    let mut descendants = Vec::new();

    while let Some(parent_id) = frontier.pop_front() {
        for child in page_ops::list_children(conn, &parent_id)? {
            if !visited.insert(child.id.clone()) {
                warn!(page_id = %child.id, "page reached twice while resolving descendants");
                continue;
            }
            frontier.push_back(child.id.clone());
            descendants.push(child);
        }
    }

    debug!(page_id, count = descendants.len(), "resolved descendants");
    Ok(descendants)
}

/// The parent chain of `page_id`, nearest first, ending at the root.
/// The page itself is not included.
pub fn resolve_ancestors(conn: &Connection, page_id: &str) -> PermissionResult<Vec<Page>> {
    let page = page_ops::require_page(conn, page_id)?;

    let mut visited: HashSet<String> = HashSet::from([page.id.clone()]);
    let mut ancestors = Vec::new();
    let mut next = page.parent_id;

    while let Some(parent_id) = next {
        if !visited.insert(parent_id.clone()) {
            warn!(page_id, "cycle in page parents while resolving ancestors");
            break;
        }
        let Some(parent) = page_ops::get_page(conn, &parent_id)? else {
            break;
        };
        next = parent.parent_id.clone();
        ancestors.push(parent);
    }

    Ok(ancestors)
}

/// Whether `ancestor_id` is a strict ancestor of `page_id`.
pub fn is_ancestor(conn: &Connection, ancestor_id: &str, page_id: &str) -> PermissionResult<bool> {
    Ok(resolve_ancestors(conn, page_id)?
        .iter()
        .any(|page| page.id == ancestor_id))
}
