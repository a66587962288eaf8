//! SQLite persistence and startup readiness for the penguins prediction API.

mod pool;
mod readiness;
mod record;
mod store;

pub use pool::{build_pool, PoolConfig, PooledConnection, SqlitePool};
pub use readiness::{wait_for_database, RetryPolicy};
pub use record::{format_features, NewPrediction, PredictionRecord};
pub use store::{database_path, SqliteStore, DEFAULT_DATABASE_URL};

use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Database not ready after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

/// Storage seam for prediction records.
///
/// Implementations are blocking; async callers go through `spawn_blocking`.
pub trait PredictionRepository: Send + Sync {
    /// Inserts and commits a record, returning it with its assigned id.
    fn insert(&self, new: &NewPrediction) -> Result<PredictionRecord, StoreError>;
    /// Returns every stored record ordered by id.
    fn list(&self) -> Result<Vec<PredictionRecord>, StoreError>;
}
