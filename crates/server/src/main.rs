use anyhow::Context;
use engine::EngineConfig;
use queue::{start_worker, ResultStore};
use server::{catalogue::Catalogue, routes, state::AppState};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},engine={level},queue={level},refactor={level},mods={level},compiler={level},validator={level},symbols={level},repo={level},proc={level},utils={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).expect("failed to build tracing filter");
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let workspace_root = utils::path::default_workspace_root();
    std::fs::create_dir_all(&workspace_root)
        .with_context(|| format!("failed to create workspace root {}", workspace_root.display()))?;

    let compiler_id = std::env::var("COMPILER_ID").unwrap_or_else(|_| "clang".to_string());
    let optimization_batch_threshold = std::env::var("OPTIMIZATION_BATCH_THRESHOLD")
        .ok()
        .and_then(|s| s.parse::<f64>().ok());

    let engine_config = EngineConfig { workspace_root: workspace_root.clone(), compiler_id, optimization_batch_threshold };

    let catalogue = std::sync::Arc::new(Catalogue::load(&workspace_root)?);

    let results = ResultStore::new();
    let (queue, rx) = queue::RequestQueue::new(results.clone());
    let worker = start_worker(engine_config.clone(), rx, results, queue.clone());

    let state = AppState { queue, catalogue, engine_config };
    let app_router = routes::router(state);

    let port = std::env::var("BACKEND_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or(0);
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    queue::join_worker(worker).await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
