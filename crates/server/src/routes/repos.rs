use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    catalogue::{NewRepo, RepoConfig, RepoUpdate},
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/repos", get(list_repos).post(create_repo))
        .route("/repos/{id}", axum::routing::put(update_repo).delete(delete_repo))
}

async fn list_repos(State(state): State<AppState>) -> Json<ApiResponse<Vec<RepoConfig>>> {
    Json(ApiResponse::success(state.catalogue.list()))
}

async fn create_repo(
    State(state): State<AppState>,
    Json(body): Json<NewRepo>,
) -> Result<Json<ApiResponse<RepoConfig>>, ApiError> {
    let repo = state.catalogue.create(body)?;
    Ok(Json(ApiResponse::success(repo)))
}

async fn update_repo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RepoUpdate>,
) -> Result<Json<ApiResponse<RepoConfig>>, ApiError> {
    let repo = state.catalogue.update(id, body)?.ok_or(ApiError::RepoNotFound(id))?;
    Ok(Json(ApiResponse::success(repo)))
}

async fn delete_repo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let removed = state.catalogue.delete(id)?;
    if !removed {
        return Err(ApiError::RepoNotFound(id));
    }
    Ok(Json(ApiResponse::success(true)))
}
