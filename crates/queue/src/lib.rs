mod queue;
mod store;
mod worker;

pub use queue::{QueueItem, RequestQueue};
pub use store::ResultStore;
pub use worker::{join_worker, start_worker, Worker};

/// Aggregate view for `GET /api/queue/status`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueueStatus {
    pub queue_size: usize,
    pub results: Vec<engine::EngineResult>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

pub fn queue_status(queue: &RequestQueue) -> QueueStatus {
    QueueStatus {
        queue_size: queue.queue_size(),
        results: queue.results().snapshot(),
        timestamp: chrono::Utc::now(),
    }
}
