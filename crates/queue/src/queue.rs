use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use engine::{EngineResult, ModRequest};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::store::ResultStore;

/// One item in flight between the HTTP boundary and the worker: the
/// request itself, its repository's post-checkout command (owned by the
/// catalogue, outside this crate), and a flag the worker checks between
/// refactorings to honor cancellation.
pub struct QueueItem {
    pub request: ModRequest,
    pub post_checkout: Option<String>,
    pub cancel_flag: Arc<AtomicBool>,
}

/// In-process FIFO: the HTTP boundary pushes a request and immediately
/// records it as `queued`; a single worker drains the channel. Multiple
/// concurrent submissions enqueue but are serialized by the worker.
#[derive(Clone)]
pub struct RequestQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
    results: ResultStore,
    cancel_flags: Arc<Mutex<std::collections::HashMap<Uuid, Arc<AtomicBool>>>>,
    pending: Arc<AtomicUsize>,
}

impl RequestQueue {
    pub fn new(results: ResultStore) -> (Self, mpsc::UnboundedReceiver<QueueItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                results,
                cancel_flags: Arc::new(Mutex::new(std::collections::HashMap::new())),
                pending: Arc::new(AtomicUsize::new(0)),
            },
            rx,
        )
    }

    /// Enqueue `request`, recording it as `queued` before returning so a
    /// caller that immediately polls status never observes a gap.
    pub fn submit(&self, request: ModRequest, post_checkout: Option<String>) -> Uuid {
        let id = request.id;
        let cancel_flag = Arc::new(AtomicBool::new(false));
        self.cancel_flags.lock().unwrap().insert(id, cancel_flag.clone());
        self.results.insert(EngineResult::queued(id));
        self.pending.fetch_add(1, Ordering::Relaxed);

        if self
            .tx
            .send(QueueItem { request, post_checkout, cancel_flag })
            .is_err()
        {
            tracing::error!(%id, "worker channel closed, request will never be processed");
        }
        id
    }

    /// Mark `id` cancelled. Effective immediately if still queued; if
    /// already being processed, the worker observes the flag between
    /// refactorings and finalizes early.
    pub fn cancel(&self, id: Uuid) -> bool {
        if let Some(flag) = self.cancel_flags.lock().unwrap().get(&id) {
            flag.store(true, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    pub fn queue_size(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub(crate) fn mark_popped(&self) {
        self.pending.fetch_sub(1, Ordering::Relaxed);
    }
}
