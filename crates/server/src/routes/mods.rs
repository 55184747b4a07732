use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use engine::{EngineResult, ModRequest};
use serde::Deserialize;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mods", axum::routing::post(submit_mod))
        .route("/mods/{id}/status", get(mod_status))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SubmitModRequest {
    Builtin { repo_name: String, repo_url: String, mod_type: String, description: String },
    Commit { repo_name: String, repo_url: String, commit_hash: String, description: String },
}

#[derive(Debug, serde::Serialize)]
struct SubmitModResponse {
    id: Uuid,
}

async fn submit_mod(
    State(state): State<AppState>,
    Json(body): Json<SubmitModRequest>,
) -> Result<Json<ApiResponse<SubmitModResponse>>, ApiError> {
    let (request, repo_name) = match body {
        SubmitModRequest::Builtin { repo_name, repo_url, mod_type, description } => {
            if mods::by_id(&mod_type).is_none() {
                return Err(ApiError::UnknownId(mod_type));
            }
            (ModRequest::builtin(repo_url, repo_name.clone(), mod_type, description), repo_name)
        }
        SubmitModRequest::Commit { repo_name, repo_url, commit_hash, description } => {
            (ModRequest::commit(repo_url, repo_name.clone(), commit_hash, description), repo_name)
        }
    };

    let post_checkout = state
        .catalogue
        .list()
        .into_iter()
        .find(|r| r.name == repo_name)
        .and_then(|r| r.post_checkout);

    let id = state.queue.submit(request, post_checkout);
    Ok(Json(ApiResponse::success(SubmitModResponse { id })))
}

async fn mod_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EngineResult>>, ApiError> {
    let result = state.queue.results().get(id).ok_or(ApiError::RequestNotFound(id))?;
    Ok(Json(ApiResponse::success(result)))
}
