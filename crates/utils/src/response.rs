use serde::Serialize;

/// Uniform envelope every HTTP handler returns. `error_type` is a stable,
/// machine-matchable tag for the failure kind (e.g. `"repo_not_found"`);
/// `message` is the human-readable `Display` text. Both are `None` on
/// success.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
    error_type: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), message: None, error_type: None }
    }

    pub fn error(error_type: &'static str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
            error_type: Some(error_type),
        }
    }
}
