use std::sync::Arc;

use penguins_model::ModelBundle;
use penguins_store::PredictionRepository;

/// Shared per-process context handed to every handler.
///
/// The model bundle is read-only after construction; the repository owns its
/// own connection pool.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelBundle>,
    pub store: Arc<dyn PredictionRepository>,
}

impl AppState {
    pub fn new(model: ModelBundle, store: Arc<dyn PredictionRepository>) -> Self {
        Self {
            model: Arc::new(model),
            store,
        }
    }
}
