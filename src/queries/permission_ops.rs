//! Permission row CRUD: point reads, page listings, upsert halves, bulk repointing.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{PermissionError, PermissionResult};
use crate::types::{Grantee, PagePermission, PermissionLevel, PermissionWithSource};

const PERMISSION_COLUMNS: &str = "id, page_id, user_id, role_id, space_id, permission_level, \
                                  custom_capabilities, inherited_from_permission";

/// Row as stored, before level/grantee validation.
struct RawPermissionRow {
    id: String,
    page_id: String,
    user_id: Option<String>,
    role_id: Option<String>,
    space_id: Option<String>,
    permission_level: String,
    custom_capabilities: String,
    inherited_from_permission: Option<String>,
}

impl RawPermissionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            page_id: row.get(1)?,
            user_id: row.get(2)?,
            role_id: row.get(3)?,
            space_id: row.get(4)?,
            permission_level: row.get(5)?,
            custom_capabilities: row.get(6)?,
            inherited_from_permission: row.get(7)?,
        })
    }

    fn into_permission(self) -> PermissionResult<PagePermission> {
        let capabilities: Vec<String> = serde_json::from_str(&self.custom_capabilities)?;
        Ok(PagePermission {
            permission_level: PermissionLevel::parse(&self.permission_level, &capabilities)?,
            grantee: Grantee::from_columns(self.user_id, self.role_id, self.space_id)?,
            id: self.id,
            page_id: self.page_id,
            inherited_from_permission: self.inherited_from_permission,
        })
    }
}

fn query_permissions<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> PermissionResult<Vec<PagePermission>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let raw = stmt
        .query_map(params, RawPermissionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    raw.into_iter().map(RawPermissionRow::into_permission).collect()
}

fn encode_capabilities(level: &PermissionLevel) -> PermissionResult<String> {
    let names: Vec<&str> = level
        .custom_capabilities()
        .map(|caps| caps.iter().map(|c| c.as_str()).collect())
        .unwrap_or_default();
    Ok(serde_json::to_string(&names)?)
}

pub fn get_permission(conn: &Connection, id: &str) -> PermissionResult<Option<PagePermission>> {
    let raw = conn
        .query_row(
            &format!("SELECT {PERMISSION_COLUMNS} FROM page_permissions WHERE id = ?1"),
            params![id],
            RawPermissionRow::from_row,
        )
        .optional()?;
    raw.map(RawPermissionRow::into_permission).transpose()
}

/// Get a permission or fail with `PermissionNotFound`.
pub fn require_permission(conn: &Connection, id: &str) -> PermissionResult<PagePermission> {
    get_permission(conn, id)?.ok_or_else(|| PermissionError::permission_not_found(id))
}

/// Join a row with its source. A dangling source link reads as `None`.
pub fn with_source(
    conn: &Connection,
    permission: PagePermission,
) -> PermissionResult<PermissionWithSource> {
    let source_permission = match &permission.inherited_from_permission {
        Some(source_id) => get_permission(conn, source_id)?,
        None => None,
    };
    Ok(PermissionWithSource {
        permission,
        source_permission,
    })
}

pub fn get_permission_with_source(
    conn: &Connection,
    id: &str,
) -> PermissionResult<Option<PermissionWithSource>> {
    get_permission(conn, id)?
        .map(|permission| with_source(conn, permission))
        .transpose()
}

/// All rows of a page in insertion order.
pub fn list_page_rows(conn: &Connection, page_id: &str) -> PermissionResult<Vec<PagePermission>> {
    query_permissions(
        conn,
        &format!(
            "SELECT {PERMISSION_COLUMNS} FROM page_permissions WHERE page_id = ?1 ORDER BY rowid"
        ),
        params![page_id],
    )
}

/// All rows of a page, each joined with its source.
pub fn list_page_permissions(
    conn: &Connection,
    page_id: &str,
) -> PermissionResult<Vec<PermissionWithSource>> {
    list_page_rows(conn, page_id)?
        .into_iter()
        .map(|permission| with_source(conn, permission))
        .collect()
}

/// The row for `(page_id, grantee)`, if any.
pub fn find_for_grantee(
    conn: &Connection,
    page_id: &str,
    grantee: &Grantee,
) -> PermissionResult<Option<PagePermission>> {
    let (column, value) = match grantee {
        Grantee::User(id) => ("user_id", id),
        Grantee::Role(id) => ("role_id", id),
        Grantee::Space(id) => ("space_id", id),
    };
    let rows = query_permissions(
        conn,
        &format!(
            "SELECT {PERMISSION_COLUMNS} FROM page_permissions WHERE page_id = ?1 AND {column} = ?2"
        ),
        params![page_id, value],
    )?;
    Ok(rows.into_iter().next())
}

/// Rows whose source link equals `source_id`.
pub fn list_inheriting_from(
    conn: &Connection,
    source_id: &str,
) -> PermissionResult<Vec<PagePermission>> {
    query_permissions(
        conn,
        &format!(
            "SELECT {PERMISSION_COLUMNS} FROM page_permissions
             WHERE inherited_from_permission = ?1 ORDER BY rowid"
        ),
        params![source_id],
    )
}

/// Rows on any of `page_ids` whose source link equals `source_id`.
pub fn list_inheriting_from_on_pages(
    conn: &Connection,
    source_id: &str,
    page_ids: &HashSet<String>,
) -> PermissionResult<Vec<PagePermission>> {
    Ok(list_inheriting_from(conn, source_id)?
        .into_iter()
        .filter(|row| page_ids.contains(&row.page_id))
        .collect())
}

pub fn insert_permission(conn: &Connection, permission: &PagePermission) -> PermissionResult<()> {
    let (user_id, role_id, space_id) = permission.grantee.columns();
    conn.execute(
        "INSERT INTO page_permissions (
            id, page_id, user_id, role_id, space_id,
            permission_level, custom_capabilities, inherited_from_permission
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            permission.id,
            permission.page_id,
            user_id,
            role_id,
            space_id,
            permission.permission_level.name(),
            encode_capabilities(&permission.permission_level)?,
            permission.inherited_from_permission,
        ],
    )?;
    Ok(())
}

/// Overwrite value and source link of an existing row.
pub fn update_permission(
    conn: &Connection,
    id: &str,
    level: &PermissionLevel,
    inherited_from_permission: Option<&str>,
) -> PermissionResult<usize> {
    let rows = conn.execute(
        "UPDATE page_permissions
         SET permission_level = ?2, custom_capabilities = ?3, inherited_from_permission = ?4
         WHERE id = ?1",
        params![
            id,
            level.name(),
            encode_capabilities(level)?,
            inherited_from_permission
        ],
    )?;
    Ok(rows)
}

/// Overwrite only the value of an existing row.
pub fn update_level(conn: &Connection, id: &str, level: &PermissionLevel) -> PermissionResult<usize> {
    let rows = conn.execute(
        "UPDATE page_permissions SET permission_level = ?2, custom_capabilities = ?3 WHERE id = ?1",
        params![id, level.name(), encode_capabilities(level)?],
    )?;
    Ok(rows)
}

/// Delete every row whose source link equals `source_id`.
pub fn delete_inheriting_from(conn: &Connection, source_id: &str) -> PermissionResult<usize> {
    let rows = conn.execute(
        "DELETE FROM page_permissions WHERE inherited_from_permission = ?1",
        params![source_id],
    )?;
    Ok(rows)
}

pub fn delete_permission_row(conn: &Connection, id: &str) -> PermissionResult<usize> {
    let rows = conn.execute("DELETE FROM page_permissions WHERE id = ?1", params![id])?;
    Ok(rows)
}
