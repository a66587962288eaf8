//! Startup sequence: readiness gate, schema, artifacts.

use std::sync::Arc;

use anyhow::{Context, Result};
use penguins_model::{load_model_bundle, ModelBundle};
use penguins_store::{wait_for_database, SqliteStore};
use tokio::task;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Builds the application state.
///
/// Fails only when the database never becomes reachable. Schema and model
/// failures are logged and leave the server in degraded mode.
pub async fn init_app_state(config: &ServerConfig) -> Result<AppState> {
    let store = Arc::new(SqliteStore::new(&config.database_url, config.pool));

    let ping_store = store.clone();
    let policy = config.retry;
    let attempts = task::spawn_blocking(move || wait_for_database(|| ping_store.ping(), &policy))
        .await
        .context("readiness check panicked")?
        .context("database unavailable")?;
    info!("Database reachable after {} attempt(s)", attempts);

    let schema_store = store.clone();
    match task::spawn_blocking(move || schema_store.ensure_schema()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("DB init failed: {}", e),
        Err(e) => error!("DB init task failed: {}", e),
    }

    let model_path = config.model_path.clone();
    let scaler_path = config.scaler_path.clone();
    let model = load_model_off_thread(move || load_model_bundle(&model_path, &scaler_path)).await;
    if !model.is_loaded() {
        warn!("Serving without a model: /predict will return 503");
    }

    Ok(AppState::new(model, store))
}

/// Runs artifact loading on the blocking pool. A failed task leaves the
/// bundle empty.
async fn load_model_off_thread<F>(load: F) -> ModelBundle
where
    F: FnOnce() -> ModelBundle + Send + 'static,
{
    match task::spawn_blocking(load).await {
        Ok(bundle) => bundle,
        Err(e) => {
            error!("Model loading task failed: {}", e);
            ModelBundle::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use penguins_store::{PoolConfig, PredictionRepository, RetryPolicy};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_artifacts_start_degraded() {
        let dir = tempdir().unwrap();
        let config = ServerConfig {
            database_url: dir.path().join("penguins.db").display().to_string(),
            model_path: dir.path().join("missing_model.json").display().to_string(),
            scaler_path: dir.path().join("missing_scaler.json").display().to_string(),
            ..ServerConfig::default()
        };

        let state = init_app_state(&config).await.unwrap();
        assert!(!state.model.is_loaded());
        assert!(state.store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_database_aborts_startup() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let config = ServerConfig {
            database_url: blocker.join("penguins.db").display().to_string(),
            pool: PoolConfig {
                connect_timeout: Duration::from_millis(100),
                ..PoolConfig::default()
            },
            retry: RetryPolicy {
                max_attempts: 2,
                delay: Duration::from_millis(1),
            },
            ..ServerConfig::default()
        };

        assert!(init_app_state(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_panicking_model_load_leaves_bundle_empty() {
        let bundle = load_model_off_thread(|| -> ModelBundle { panic!("corrupt artifact") }).await;
        assert!(!bundle.is_loaded());
    }
}
