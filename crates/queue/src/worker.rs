use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use engine::{EngineConfig, EngineResult, RequestStatus};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::queue::QueueItem;

const POP_TIMEOUT: Duration = Duration::from_millis(500);

/// Drives the single background worker. Pop uses a bounded timeout so
/// `join_worker` can request a clean shutdown without blocking forever on
/// an empty channel.
pub struct Worker {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

pub fn start_worker(
    cfg: EngineConfig,
    mut rx: mpsc::UnboundedReceiver<QueueItem>,
    results: crate::store::ResultStore,
    pending_tracker: crate::queue::RequestQueue,
) -> Worker {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_for_task = shutdown.clone();

    let handle = tokio::spawn(async move {
        loop {
            if shutdown_for_task.load(Ordering::Relaxed) {
                break;
            }
            let popped = tokio::time::timeout(POP_TIMEOUT, rx.recv()).await;
            let item = match popped {
                Ok(Some(item)) => item,
                Ok(None) => break, // sender dropped, nothing left to process
                Err(_elapsed) => continue,
            };
            pending_tracker.mark_popped();
            process_item(&cfg, item, &results).await;
        }
    });

    Worker { handle, shutdown }
}

async fn process_item(cfg: &EngineConfig, item: QueueItem, results: &crate::store::ResultStore) {
    let request_id = item.request.id;

    if item.cancel_flag.load(Ordering::Relaxed) {
        results.insert(cancelled_result(request_id));
        return;
    }

    results.insert(EngineResult::processing(request_id));

    let cfg = cfg.clone();
    let request = item.request.clone();
    let post_checkout = item.post_checkout.clone();
    let cancel_flag = item.cancel_flag.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine::run_request(&cfg, &request, post_checkout.as_deref(), &cancel_flag)
    })
    .await;

    let final_result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => error_result(request_id, &e.to_string()),
        Err(join_err) => error_result(request_id, &format!("worker task panicked: {join_err}")),
    };
    results.insert(final_result);
}

fn cancelled_result(request_id: uuid::Uuid) -> EngineResult {
    EngineResult {
        status: RequestStatus::Failed,
        message: "cancelled".to_string(),
        timestamp: chrono::Utc::now(),
        ..EngineResult::queued(request_id)
    }
}

fn error_result(request_id: uuid::Uuid, message: &str) -> EngineResult {
    EngineResult {
        status: RequestStatus::Error,
        message: message.to_string(),
        timestamp: chrono::Utc::now(),
        ..EngineResult::queued(request_id)
    }
}

/// Signal shutdown and wait for the worker to observe it and drain its
/// current iteration. Does not wait for any in-flight request to finish.
pub async fn join_worker(worker: Worker) {
    worker.shutdown.store(true, Ordering::Relaxed);
    let _ = worker.handle.await;
}
