//! Reads over the mirrored page tree, plus the mirror upsert.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{PermissionError, PermissionResult};
use crate::types::Page;

fn row_to_page(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        space_id: row.get(2)?,
    })
}

/// Mirror a page from the page-management collaborator.
///
/// The parent must already be mirrored, and must not be the page itself or
/// anything below it.
pub fn upsert_page(conn: &Connection, page: &Page) -> PermissionResult<()> {
    if let Some(parent_id) = &page.parent_id {
        let parent = require_page(conn, parent_id)?;
        if chain_reaches(conn, parent, &page.id)? {
            return Err(PermissionError::CircularPageParent {
                page_id: page.id.clone(),
                parent_id: parent_id.clone(),
            });
        }
    }

    conn.execute(
        "INSERT INTO pages (id, parent_id, space_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET parent_id = excluded.parent_id, space_id = excluded.space_id",
        params![page.id, page.parent_id, page.space_id],
    )?;
    Ok(())
}

/// Whether `page_id` is `start` or one of its ancestors.
fn chain_reaches(conn: &Connection, start: Page, page_id: &str) -> PermissionResult<bool> {
    let mut visited = HashSet::new();
    let mut current = Some(start);
    while let Some(page) = current {
        if page.id == page_id {
            return Ok(true);
        }
        if !visited.insert(page.id.clone()) {
            return Ok(false);
        }
        current = match page.parent_id {
            Some(parent_id) => get_page(conn, &parent_id)?,
            None => None,
        };
    }
    Ok(false)
}

pub fn get_page(conn: &Connection, id: &str) -> PermissionResult<Option<Page>> {
    let page = conn
        .query_row(
            "SELECT id, parent_id, space_id FROM pages WHERE id = ?1",
            params![id],
            row_to_page,
        )
        .optional()?;
    Ok(page)
}

/// Get a page or fail with `PageNotFound`.
pub fn require_page(conn: &Connection, id: &str) -> PermissionResult<Page> {
    get_page(conn, id)?.ok_or_else(|| PermissionError::page_not_found(id))
}

/// Direct children of a page.
pub fn list_children(conn: &Connection, parent_id: &str) -> PermissionResult<Vec<Page>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, parent_id, space_id FROM pages WHERE parent_id = ?1 ORDER BY rowid",
    )?;
    let pages = stmt
        .query_map(params![parent_id], row_to_page)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pages)
}
