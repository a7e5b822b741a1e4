//! SQLite PRAGMA configuration for engine connections.
//!
//! Must be called on every connection immediately after opening.

use rusqlite::Connection;

use crate::errors::PermissionResult;

/// Configure the writer connection.
///
/// - WAL for concurrent readers during writes
/// - foreign_keys for the inheritance cascade
/// - busy_timeout for lock contention (primary concurrency mechanism)
pub fn configure_connection(conn: &Connection, busy_timeout_ms: u32) -> PermissionResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -8000;
        PRAGMA mmap_size = 268435456;
        PRAGMA temp_store = MEMORY;
        ",
    )?;
    conn.pragma_update(None, "busy_timeout", busy_timeout_ms)?;
    Ok(())
}

/// Configure a reader connection. Adds `query_only = ON` on top of the writer PRAGMAs.
pub fn configure_readonly_connection(
    conn: &Connection,
    busy_timeout_ms: u32,
) -> PermissionResult<()> {
    configure_connection(conn, busy_timeout_ms)?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    Ok(())
}
