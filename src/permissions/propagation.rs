//! Inheritance propagator: `create` plus the cascades that keep dependent rows consistent.
//!
//! After the upsert of `(page_id, grantee)`:
//! 1. a row that became Local takes over, for the pages below it, the lineage
//!    that used to point at its old source;
//! 2. a row that became Inherited hands the rows below it that pointed at it
//!    over to its new source;
//! 3. every row inheriting from the written row mirrors its new value.
//!
//! Re-sourcing is planned before value sync, so a write that changes both
//! the value and the Local/Inherited status leaves every dependent row on
//! the new value regardless of which lineage it ends up in.

use std::collections::HashSet;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::cascade::{self, RowChange};
use super::store::{self, UpsertOutcome};
use crate::errors::PermissionResult;
use crate::queries::permission_ops;
use crate::types::{PagePermission, PermissionInput, PermissionWithSource};

/// Result of a propagated write.
#[derive(Debug, Clone)]
pub struct Propagated {
    pub permission: PermissionWithSource,
    /// Dependent rows rewritten by the cascades.
    pub cascaded_rows: usize,
}

/// Validate, upsert, and cascade one permission write.
pub fn create_permission(conn: &Connection, input: PermissionInput) -> PermissionResult<Propagated> {
    let outcome = store::upsert_permission(conn, input)?;
    let changes = plan_cascade(conn, &outcome)?;
    cascade::validate_repoints(conn, &changes).inspect_err(|e| {
        warn!(permission_id = %outcome.written.id, error = %e, "cascade would create a cycle");
    })?;
    let cascaded_rows = cascade::apply_changes(conn, &changes)?;

    if cascaded_rows > 0 {
        info!(
            permission_id = %outcome.written.id,
            page_id = %outcome.written.page_id,
            cascaded_rows,
            "propagated permission write"
        );
    }

    Ok(Propagated {
        permission: permission_ops::with_source(conn, outcome.written)?,
        cascaded_rows,
    })
}

/// Every dependent-row change implied by one upsert.
pub fn plan_cascade(conn: &Connection, outcome: &UpsertOutcome) -> PermissionResult<Vec<RowChange>> {
    let written = &outcome.written;
    let repoints = plan_resource(conn, outcome.previous.as_ref(), written)?;

    let mut covered: HashSet<String> = repoints
        .iter()
        .map(|change| change.permission_id().to_string())
        .collect();
    let mut changes = repoints.clone();

    // Copies chained below a repointed row follow its new value too.
    for change in &repoints {
        if let RowChange::Repoint {
            permission_id,
            permission_level,
            ..
        } = change
        {
            let synced = cascade::plan_value_sync(conn, permission_id, permission_level, &covered)?;
            covered.extend(synced.iter().map(|c| c.permission_id().to_string()));
            changes.extend(synced);
        }
    }
    changes.extend(cascade::plan_value_sync(
        conn,
        &written.id,
        &written.permission_level,
        &covered,
    )?);

    Ok(changes)
}

fn plan_resource(
    conn: &Connection,
    previous: Option<&PagePermission>,
    written: &PagePermission,
) -> PermissionResult<Vec<RowChange>> {
    let Some(previous) = previous else {
        return Ok(Vec::new());
    };

    match (
        previous.inherited_from_permission.as_deref(),
        written.inherited_from_permission.as_deref(),
    ) {
        // Localized: this page is now the nearest authority for the old lineage.
        (Some(old_source), None) => {
            debug!(permission_id = %written.id, old_source, "re-sourcing descendants onto localized permission");
            let below = cascade::descendant_page_ids(conn, &written.page_id)?;
            cascade::plan_repoint(conn, &below, old_source, &written.id, &written.permission_level)
        }
        // Inherited: rows below that pointed here now point at the new source.
        (None, Some(new_source)) => {
            debug!(permission_id = %written.id, new_source, "re-sourcing descendants onto inherited source");
            let below = cascade::descendant_page_ids(conn, &written.page_id)?;
            cascade::plan_repoint(conn, &below, &written.id, new_source, &written.permission_level)
        }
        _ => Ok(Vec::new()),
    }
}
