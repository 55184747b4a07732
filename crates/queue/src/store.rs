use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use engine::EngineResult;
use uuid::Uuid;

/// Shared `request-id -> Result` map. Reads return snapshots (cloned out
/// from behind the lock); no lock is ever held across a subprocess
/// invocation. Kept entirely in memory: a restart loses in-flight results.
#[derive(Clone, Default)]
pub struct ResultStore {
    inner: Arc<Mutex<HashMap<Uuid, EngineResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, result: EngineResult) {
        self.inner.lock().unwrap().insert(result.request_id, result);
    }

    pub fn get(&self, id: Uuid) -> Option<EngineResult> {
        self.inner.lock().unwrap().get(&id).cloned()
    }

    pub fn snapshot(&self) -> Vec<EngineResult> {
        self.inner.lock().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let store = ResultStore::new();
        let result = EngineResult::queued(Uuid::new_v4());
        let id = result.request_id;
        store.insert(result);
        assert_eq!(store.get(id).unwrap().request_id, id);
        assert!(store.get(Uuid::new_v4()).is_none());
    }
}
