//! SQLite-backed prediction storage.

use std::path::PathBuf;

use rusqlite::params;
use tracing::info;

use crate::pool::{self, build_pool, PoolConfig, PooledConnection, SqlitePool};
use crate::record::{NewPrediction, PredictionRecord};
use crate::{PredictionRepository, StoreError};

/// Default database location when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/penguins.db";

/// Resolves a `DATABASE_URL` to a filesystem path.
///
/// Accepts `sqlite://path`, `sqlite:path` or a bare path.
pub fn database_path(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}

/// Prediction store over a pooled SQLite database.
pub struct SqliteStore {
    path: PathBuf,
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store for the database at `url`. Connections are opened by
    /// the pool in the background and on checkout.
    pub fn new(url: &str, config: PoolConfig) -> Self {
        let path = database_path(url);
        let pool = build_pool(&path, config);
        Self { path, pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn conn(&self) -> Result<PooledConnection, StoreError> {
        pool::checkout(&self.pool)
    }

    /// Checks out a connection and runs `SELECT 1` on it.
    pub fn ping(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        pool::ping(&conn)
    }

    /// Creates the `predictions` table if it does not exist.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                features TEXT NOT NULL,
                prediction TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_predictions_created_at ON predictions(created_at);
            "#,
        )?;
        info!("Database schema ready at {}", self.path.display());
        Ok(())
    }
}

impl PredictionRepository for SqliteStore {
    fn insert(&self, new: &NewPrediction) -> Result<PredictionRecord, StoreError> {
        let mut conn = self.conn()?;
        // An uncommitted transaction rolls back when dropped.
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO predictions (features, prediction, created_at) VALUES (?1, ?2, ?3)",
            params![new.features, new.prediction, new.created_at],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(PredictionRecord {
            id,
            features: new.features.clone(),
            prediction: new.prediction.clone(),
            created_at: new.created_at,
        })
    }

    fn list(&self) -> Result<Vec<PredictionRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, features, prediction, created_at FROM predictions ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(PredictionRecord {
                id: row.get(0)?,
                features: row.get(1)?,
                prediction: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    fn quick_config() -> PoolConfig {
        PoolConfig {
            pool_size: 2,
            max_overflow: 0,
            connect_timeout: Duration::from_millis(100),
            ..PoolConfig::default()
        }
    }

    fn temp_store() -> (TempDir, SqliteStore) {
        let dir = tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("penguins.db").display());
        let store = SqliteStore::new(&url, quick_config());
        (dir, store)
    }

    fn table_count(store: &SqliteStore) -> i64 {
        let conn = store.pool().get().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'predictions'",
            [],
            |r| r.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_database_path_strips_scheme() {
        assert_eq!(database_path("sqlite://data/p.db"), PathBuf::from("data/p.db"));
        assert_eq!(database_path("sqlite:///tmp/p.db"), PathBuf::from("/tmp/p.db"));
        assert_eq!(database_path("sqlite:p.db"), PathBuf::from("p.db"));
        assert_eq!(database_path("p.db"), PathBuf::from("p.db"));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let (_dir, store) = temp_store();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(table_count(&store), 1);
    }

    #[test]
    fn test_insert_and_list() {
        let (_dir, store) = temp_store();
        store.ensure_schema().unwrap();

        let first = store
            .insert(&NewPrediction::new(&[39.1, 18.7, 181.0, 3750.0], "Adelie"))
            .unwrap();
        let second = store
            .insert(&NewPrediction::new(&[46.5, 17.9, 192.0, 3500.0], "Chinstrap"))
            .unwrap();
        assert!(second.id > first.id);

        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].features, "[39.1, 18.7, 181.0, 3750.0]");
        assert_eq!(records[0].prediction, "Adelie");
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1].prediction, "Chinstrap");
    }

    #[test]
    fn test_missing_table_fails_insert_and_list() {
        let (_dir, store) = temp_store();
        assert!(store.insert(&NewPrediction::new(&[1.0], "Adelie")).is_err());
        assert!(store.list().is_err());
    }

    #[test]
    fn test_unreachable_database_fails_ping() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let store = SqliteStore::new(
            &blocker.join("penguins.db").display().to_string(),
            quick_config(),
        );
        assert!(store.ping().is_err());
        assert!(store.ensure_schema().is_err());
    }
}
