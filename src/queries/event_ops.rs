//! Append-only audit log of structural permission operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::warn;

use crate::errors::PermissionResult;

/// Row from the permission_events table.
#[derive(Debug, Clone)]
pub struct PermissionEventRow {
    pub kind: String,
    pub page_id: String,
    pub permission_id: Option<String>,
    pub affected_rows: usize,
    pub recorded_at: DateTime<Utc>,
}

pub fn log_event(
    conn: &Connection,
    kind: &str,
    page_id: &str,
    permission_id: Option<&str>,
    affected_rows: usize,
) -> PermissionResult<()> {
    conn.execute(
        "INSERT INTO permission_events (kind, page_id, permission_id, affected_rows, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            kind,
            page_id,
            permission_id,
            affected_rows as i64,
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Most recent events first.
pub fn recent_events(conn: &Connection, limit: usize) -> PermissionResult<Vec<PermissionEventRow>> {
    let mut stmt = conn.prepare(
        "SELECT kind, page_id, permission_id, affected_rows, recorded_at
         FROM permission_events ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .filter_map(|(kind, page_id, permission_id, affected, recorded)| {
            let recorded_at = match DateTime::parse_from_rfc3339(&recorded) {
                Ok(t) => t.with_timezone(&Utc),
                Err(e) => {
                    warn!(kind = %kind, page_id = %page_id, recorded_at = %recorded, error = %e, "skipping event with unreadable timestamp");
                    return None;
                }
            };
            Some(PermissionEventRow {
                kind,
                page_id,
                permission_id,
                affected_rows: affected.max(0) as usize,
                recorded_at,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        storage::configure_connection(&conn, 5000).unwrap();
        storage::migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_recent_events_newest_first_with_limit() {
        let conn = setup();
        log_event(&conn, "create", "p1", Some("perm-1"), 0).unwrap();
        log_event(&conn, "delete", "p1", Some("perm-1"), 3).unwrap();
        log_event(&conn, "break_inheritance", "p2", None, 1).unwrap();

        let events = recent_events(&conn, 2).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, "break_inheritance");
        assert!(events[0].permission_id.is_none());
        assert_eq!(events[1].affected_rows, 3);
    }

    #[test]
    fn test_unreadable_timestamp_is_skipped() {
        let conn = setup();
        log_event(&conn, "create", "p1", Some("perm-1"), 0).unwrap();
        log_event(&conn, "create", "p2", Some("perm-2"), 0).unwrap();
        conn.execute(
            "UPDATE permission_events SET recorded_at = 'yesterday-ish' WHERE page_id = 'p1'",
            [],
        )
        .unwrap();

        let events = recent_events(&conn, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].page_id, "p2");
    }
}
