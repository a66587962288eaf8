//! Pooled SQLite connections on top of r2d2.
//!
//! `pool_size` connections are kept open between checkouts (`min_idle`); up
//! to `max_overflow` more may be opened under load and are reaped once idle.
//! Connections are validated on checkout and replaced once older than
//! `recycle`. A checkout waits at most `connect_timeout` for a free or newly
//! opened connection.

use std::fs;
use std::path::Path;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::warn;

use crate::StoreError;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared pool of SQLite connections.
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// A checked-out connection, returned to the pool on drop.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Sizing and lifetime settings for [`SqlitePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub pool_size: usize,
    pub max_overflow: usize,
    pub recycle: Duration,
    pub connect_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            max_overflow: 20,
            recycle: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Maximum number of simultaneously open connections.
    pub fn capacity(&self) -> usize {
        self.pool_size + self.max_overflow
    }
}

/// Logs connection failures from the pool's background workers.
#[derive(Debug)]
struct TracingErrorHandler;

impl r2d2::HandleError<rusqlite::Error> for TracingErrorHandler {
    fn handle_error(&self, error: rusqlite::Error) {
        warn!("Database connection failed: {}", error);
    }
}

/// Builds a pool for the database file at `path`.
///
/// No connection is required to succeed here; an unreachable database shows
/// up as a failed checkout.
pub fn build_pool(path: &Path, config: PoolConfig) -> SqlitePool {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Could not create database directory {}: {}", parent.display(), e);
        }
    }

    let manager = SqliteConnectionManager::file(path).with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
    let max_size = u32::try_from(config.capacity().max(1)).unwrap_or(u32::MAX);
    let min_idle = u32::try_from(config.pool_size).unwrap_or(u32::MAX).min(max_size);

    // r2d2 panics on zero durations
    r2d2::Pool::builder()
        .max_size(max_size)
        .min_idle(Some(min_idle))
        .max_lifetime(Some(config.recycle).filter(|d| !d.is_zero()))
        .test_on_check_out(true)
        .connection_timeout(config.connect_timeout.max(Duration::from_millis(1)))
        .error_handler(Box::new(TracingErrorHandler))
        .build_unchecked(manager)
}

/// Checks out a connection from `pool`.
pub(crate) fn checkout(pool: &SqlitePool) -> Result<PooledConnection, StoreError> {
    Ok(pool.get()?)
}

/// Runs the trivial connectivity check on a connection.
pub(crate) fn ping(conn: &Connection) -> Result<(), StoreError> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn quick(pool_size: usize, max_overflow: usize) -> PoolConfig {
        PoolConfig {
            pool_size,
            max_overflow,
            connect_timeout: Duration::from_millis(100),
            ..PoolConfig::default()
        }
    }

    #[test]
    fn test_max_size_covers_overflow() {
        let dir = tempdir().unwrap();
        let config = PoolConfig::default();
        let pool = build_pool(&dir.path().join("pool.db"), config);
        assert_eq!(pool.max_size() as usize, config.capacity());
    }

    #[test]
    fn test_connection_returns_to_pool() {
        let dir = tempdir().unwrap();
        let pool = build_pool(&dir.path().join("pool.db"), quick(1, 0));

        {
            let conn = checkout(&pool).unwrap();
            ping(&conn).unwrap();
        }
        let conn = checkout(&pool).unwrap();
        ping(&conn).unwrap();
    }

    #[test]
    fn test_checkout_beyond_capacity_times_out() {
        let dir = tempdir().unwrap();
        let pool = build_pool(&dir.path().join("pool.db"), quick(1, 1));

        let first = checkout(&pool).unwrap();
        let second = checkout(&pool).unwrap();
        assert!(matches!(checkout(&pool), Err(StoreError::Pool(_))));

        drop(first);
        assert!(checkout(&pool).is_ok());
        drop(second);
    }

    #[test]
    fn test_missing_parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("pool.db");
        let pool = build_pool(&path, quick(1, 0));
        ping(&checkout(&pool).unwrap()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unopenable_path_fails_checkout() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let pool = build_pool(&blocker.join("pool.db"), quick(1, 0));

        assert!(checkout(&pool).is_err());
    }
}
