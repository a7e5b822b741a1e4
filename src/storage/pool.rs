//! ConnectionPool: one writer + read pool with round-robin selection.
//!
//! The only place in the crate that holds `Mutex<Connection>`. Every write
//! operation runs on the writer, so SQLite's single-writer rule and the
//! writer mutex together serialize structural operations.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};

use crate::errors::{PermissionError, PermissionResult};
use crate::storage;

/// Default number of reader connections.
const DEFAULT_READ_POOL_SIZE: usize = 2;

pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
}

impl ConnectionPool {
    /// Open a file-backed pool and run pending migrations on the writer.
    ///
    /// Readers are opened after migration so they see the schema.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> PermissionResult<Self> {
        let pool_size = if read_pool_size == 0 {
            DEFAULT_READ_POOL_SIZE
        } else {
            read_pool_size
        };

        let writer = Connection::open(path).map_err(|e| {
            PermissionError::Config(format!("Failed to open {} writer: {}", path.display(), e))
        })?;
        storage::configure_connection(&writer, busy_timeout_ms)?;
        storage::migrate(&writer)?;

        let mut readers = Vec::with_capacity(pool_size);
        for i in 0..pool_size {
            let reader = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| {
                PermissionError::Config(format!(
                    "Failed to open {} reader {}: {}",
                    path.display(),
                    i,
                    e
                ))
            })?;
            storage::configure_readonly_connection(&reader, busy_timeout_ms)?;
            readers.push(Mutex::new(reader));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Open an in-memory pool. There are no readers; reads use the writer.
    pub fn open_in_memory(busy_timeout_ms: u32) -> PermissionResult<Self> {
        let writer = Connection::open_in_memory().map_err(|e| {
            PermissionError::Config(format!("Failed to open in-memory writer: {}", e))
        })?;
        storage::configure_connection(&writer, busy_timeout_ms)?;
        storage::migrate(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
        })
    }

    /// Execute a closure with the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> PermissionResult<T>
    where
        F: FnOnce(&Connection) -> PermissionResult<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| PermissionError::Config(format!("Writer lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a closure inside one transaction on the writer.
    ///
    /// The transaction is IMMEDIATE: the write lock is taken up front, so a
    /// writer in another process waits out the busy timeout instead of
    /// failing a read-to-write upgrade. Commits when the closure returns
    /// `Ok`; any error drops the transaction, which rolls every statement back.
    pub fn with_transaction<F, T>(&self, f: F) -> PermissionResult<T>
    where
        F: FnOnce(&Connection) -> PermissionResult<T>,
    {
        self.with_writer(|conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }

    /// Execute a closure with a reader connection (round-robin).
    ///
    /// The closure runs inside one read transaction, so every statement it
    /// issues sees the same snapshot. Falls back to the writer if no readers
    /// are available (in-memory mode).
    pub fn with_reader<F, T>(&self, f: F) -> PermissionResult<T>
    where
        F: FnOnce(&Connection) -> PermissionResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_writer(|conn| read_snapshot(conn, f));
        }

        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[index]
            .lock()
            .map_err(|e| PermissionError::Config(format!("Reader lock poisoned: {}", e)))?;
        read_snapshot(&conn, f)
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Check WAL mode on the writer connection.
    pub fn is_wal_mode(&self) -> bool {
        self.with_writer(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap_or_default();
            Ok(mode.to_lowercase() == "wal")
        })
        .unwrap_or(false)
    }
}

fn read_snapshot<F, T>(conn: &Connection, f: F) -> PermissionResult<T>
where
    F: FnOnce(&Connection) -> PermissionResult<T>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Deferred)?;
    let value = f(&tx)?;
    // Nothing was written; ending the transaction releases the snapshot.
    tx.rollback()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::page_ops;
    use crate::types::Page;

    fn count_pages(conn: &Connection) -> PermissionResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?)
    }

    #[test]
    fn test_file_pool_uses_wal_and_readers() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(&dir.path().join("pool.db"), 3, 1000).unwrap();
        assert!(pool.is_wal_mode());
        assert_eq!(pool.reader_count(), 3);
    }

    #[test]
    fn test_zero_read_pool_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(&dir.path().join("pool.db"), 0, 1000).unwrap();
        assert_eq!(pool.reader_count(), DEFAULT_READ_POOL_SIZE);
    }

    #[test]
    fn test_reader_sees_one_snapshot_across_statements() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(&dir.path().join("pool.db"), 1, 1000).unwrap();

        let (before, after) = pool
            .with_reader(|conn| {
                let before = count_pages(conn)?;
                pool.with_transaction(|writer| {
                    page_ops::upsert_page(writer, &Page::root("late", "space"))
                })?;
                Ok((before, count_pages(conn)?))
            })
            .unwrap();
        assert_eq!(before, 0);
        assert_eq!(after, 0, "commit during a read must not leak into it");

        let fresh = pool.with_reader(count_pages).unwrap();
        assert_eq!(fresh, 1);
    }

    #[test]
    fn test_write_transaction_holds_the_lock_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let pool = ConnectionPool::open(&path, 1, 1000).unwrap();

        let other = Connection::open(&path).unwrap();
        other.pragma_update(None, "busy_timeout", 0).unwrap();

        let contended = pool
            .with_transaction(|_conn| Ok(other.execute_batch("BEGIN IMMEDIATE").is_err()))
            .unwrap();
        assert!(contended, "a second writer must not get the lock mid-transaction");

        other.execute_batch("BEGIN IMMEDIATE; ROLLBACK;").unwrap();
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let pool = ConnectionPool::open_in_memory(1000).unwrap();
        let result: PermissionResult<()> = pool.with_transaction(|conn| {
            page_ops::upsert_page(conn, &Page::root("doomed", "space"))?;
            Err(PermissionError::page_not_found("missing"))
        });
        assert!(result.is_err());
        assert!(pool.with_reader(|conn| page_ops::get_page(conn, "doomed")).unwrap().is_none());
    }
}
