use axum::{routing::get, Json, Router};
use serde::Serialize;
use utils::response::ApiResponse;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/available/mods", get(available_mods))
        .route("/available/validators", get(available_validators))
        .route("/available/compilers", get(available_compilers))
}

#[derive(Debug, Serialize)]
struct AvailableEntry {
    id: String,
    name: String,
}

fn entries(pairs: Vec<(&'static str, &'static str)>) -> Vec<AvailableEntry> {
    pairs.into_iter().map(|(id, name)| AvailableEntry { id: id.to_string(), name: name.to_string() }).collect()
}

async fn available_mods() -> Json<ApiResponse<Vec<AvailableEntry>>> {
    Json(ApiResponse::success(entries(mods::available())))
}

async fn available_validators() -> Json<ApiResponse<Vec<AvailableEntry>>> {
    Json(ApiResponse::success(entries(validator::available())))
}

async fn available_compilers() -> Json<ApiResponse<Vec<AvailableEntry>>> {
    Json(ApiResponse::success(entries(compiler::available())))
}
