use std::sync::Arc;

use engine::EngineConfig;
use queue::RequestQueue;

use crate::catalogue::Catalogue;

/// Shared handles every route closes over. Cheap to clone: the queue and
/// catalogue are themselves internally reference-counted / mutex-guarded.
#[derive(Clone)]
pub struct AppState {
    pub queue: RequestQueue,
    pub catalogue: Arc<Catalogue>,
    pub engine_config: EngineConfig,
}
