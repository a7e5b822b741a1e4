//! Dependent-row changes: planned against the current rows first, then applied as one batch.

use std::collections::{HashSet, VecDeque};

use rusqlite::Connection;
use tracing::debug;

use super::validation::check_inheritance_link;
use crate::errors::PermissionResult;
use crate::queries::permission_ops;
use crate::tree;
use crate::types::PermissionLevel;

/// One planned write to a dependent permission row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowChange {
    /// Point a row at a new source and mirror that source's value.
    Repoint {
        permission_id: String,
        source_id: String,
        permission_level: PermissionLevel,
    },
    /// Mirror a new value; the source link is unchanged.
    SyncLevel {
        permission_id: String,
        permission_level: PermissionLevel,
    },
}

impl RowChange {
    pub fn permission_id(&self) -> &str {
        match self {
            Self::Repoint { permission_id, .. } | Self::SyncLevel { permission_id, .. } => {
                permission_id
            }
        }
    }
}

/// Ids of every page below `page_id`, resolved once.
pub fn descendant_page_ids(conn: &Connection, page_id: &str) -> PermissionResult<HashSet<String>> {
    Ok(tree::resolve_descendants(conn, page_id)?
        .into_iter()
        .map(|page| page.id)
        .collect())
}

/// Repoint rows on `page_ids` from `from_source` to `to_source`.
pub fn plan_repoint(
    conn: &Connection,
    page_ids: &HashSet<String>,
    from_source: &str,
    to_source: &str,
    permission_level: &PermissionLevel,
) -> PermissionResult<Vec<RowChange>> {
    if page_ids.is_empty() || from_source == to_source {
        return Ok(Vec::new());
    }

    Ok(
        permission_ops::list_inheriting_from_on_pages(conn, from_source, page_ids)?
            .into_iter()
            .map(|row| RowChange::Repoint {
                permission_id: row.id,
                source_id: to_source.to_string(),
                permission_level: permission_level.clone(),
            })
            .collect(),
    )
}

/// Run the two-hop link check on every planned repoint.
///
/// A repoint may move a row onto a source that already inherits from it.
pub fn validate_repoints(conn: &Connection, changes: &[RowChange]) -> PermissionResult<()> {
    for change in changes {
        let RowChange::Repoint {
            permission_id,
            source_id,
            ..
        } = change
        else {
            continue;
        };
        let row = permission_ops::require_permission(conn, permission_id)?;
        let source = permission_ops::require_permission(conn, source_id)?;
        let source_of_source = match &source.inherited_from_permission {
            Some(upstream_id) => permission_ops::get_permission(conn, upstream_id)?,
            None => None,
        };
        check_inheritance_link(&row.page_id, &source, source_of_source.as_ref())?;
    }
    Ok(())
}

/// Bring every row that inherits from `source_id`, directly or through
/// intermediate copies, to `permission_level`.
///
/// Rows in `skip` are already covered by another planned change.
pub fn plan_value_sync(
    conn: &Connection,
    source_id: &str,
    permission_level: &PermissionLevel,
    skip: &HashSet<String>,
) -> PermissionResult<Vec<RowChange>> {
    let mut visited: HashSet<String> = HashSet::from([source_id.to_string()]);
    let mut frontier: VecDeque<String> = VecDeque::from([source_id.to_string()]);
    let mut changes = Vec::new();

    while let Some(current) = frontier.pop_front() {
        for row in permission_ops::list_inheriting_from(conn, &current)? {
            if !visited.insert(row.id.clone()) {
                continue;
            }
            frontier.push_back(row.id.clone());
            if skip.contains(&row.id) || &row.permission_level == permission_level {
                continue;
            }
            changes.push(RowChange::SyncLevel {
                permission_id: row.id,
                permission_level: permission_level.clone(),
            });
        }
    }

    Ok(changes)
}

/// Apply planned changes. Returns the number of rows written.
pub fn apply_changes(conn: &Connection, changes: &[RowChange]) -> PermissionResult<usize> {
    let mut written = 0;
    for change in changes {
        written += match change {
            RowChange::Repoint {
                permission_id,
                source_id,
                permission_level,
            } => permission_ops::update_permission(
                conn,
                permission_id,
                permission_level,
                Some(source_id),
            )?,
            RowChange::SyncLevel {
                permission_id,
                permission_level,
            } => permission_ops::update_level(conn, permission_id, permission_level)?,
        };
    }
    debug!(planned = changes.len(), written, "applied cascade");
    Ok(written)
}
