//! Forward-only schema migrations tracked in a single-row version table.

use rusqlite::Connection;
use tracing::info;

use super::schema::PERMISSION_TABLES_V1;
use crate::errors::PermissionResult;

/// Current schema version. Bump this when adding new migrations.
pub const CURRENT_VERSION: u32 = 1;

/// Get the current schema version. Returns 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> PermissionResult<u32> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='permission_schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let result = conn.query_row(
        "SELECT version FROM permission_schema_version LIMIT 1",
        [],
        |row| row.get::<_, u32>(0),
    );
    match result {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn set_schema_version(conn: &Connection, version: u32) -> PermissionResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS permission_schema_version (
            version INTEGER NOT NULL
        ) STRICT;",
    )?;
    conn.execute("DELETE FROM permission_schema_version", [])?;
    conn.execute(
        "INSERT INTO permission_schema_version (version) VALUES (?1)",
        rusqlite::params![version],
    )?;
    Ok(())
}

/// Run all pending migrations to bring the database up to CURRENT_VERSION.
///
/// Each step runs in its own transaction. Returns the version migrated to.
pub fn migrate(conn: &Connection) -> PermissionResult<u32> {
    let current = get_schema_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(current);
    }

    if current < 1 {
        info!("Migrating permission schema: 0 → 1 (initial tables)");
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(PERMISSION_TABLES_V1)?;
        set_schema_version(&tx, 1)?;
        tx.commit()?;
    }

    let final_version = get_schema_version(conn)?;
    info!(from = current, to = final_version, "Permission schema migration complete");
    Ok(final_version)
}
