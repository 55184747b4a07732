use axum::{extract::State, routing::get, Json, Router};
use queue::QueueStatus;
use utils::response::ApiResponse;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/queue/status", get(status))
}

async fn status(State(state): State<AppState>) -> Json<ApiResponse<QueueStatus>> {
    Json(ApiResponse::success(queue::queue_status(&state.queue)))
}
