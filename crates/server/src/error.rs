use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("repository {0} not found")]
    RepoNotFound(uuid::Uuid),

    #[error("request {0} not found")]
    RequestNotFound(uuid::Uuid),

    #[error("unknown mod id `{0}`")]
    UnknownId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::RepoNotFound(_) => (StatusCode::NOT_FOUND, "repo_not_found"),
            ApiError::RequestNotFound(_) => (StatusCode::NOT_FOUND, "request_not_found"),
            ApiError::UnknownId(_) => (StatusCode::BAD_REQUEST, "unknown_id"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        };
        let response = ApiResponse::<()>::error(error_type, &self.to_string());
        (status, Json(response)).into_response()
    }
}
