use crate::models::RequestError;
use access_token::IssueError;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use log::error;
use serde_json::json;

/// Message returned when the credential pair is missing
pub const CREDENTIALS_NOT_CONFIGURED: &str = "credentials not configured on server";

/// Message returned when signing fails
pub const ISSUE_FAILED: &str = "failed to issue token";

#[derive(Debug, Clone)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
        }
    }

    /// Create new Internal Server Error (500) with a detail message
    pub fn internal<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_REQUEST)
    }

    /// Create new Method Not Allowed Error (405)
    pub fn method_not_allowed() -> Self {
        Self::new("method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    }

    /// Create new Not Found Error (404)
    pub fn not_found() -> Self {
        Self::new("not found", StatusCode::NOT_FOUND)
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        Self::bad_request(e)
    }
}

impl From<IssueError> for ApiError {
    fn from(e: IssueError) -> Self {
        match e {
            IssueError::InvalidInput(detail) => Self::bad_request(detail),
            IssueError::Configuration(detail) => {
                error!("Token issuance misconfigured: {}", detail);
                Self::internal(CREDENTIALS_NOT_CONFIGURED)
            }
            IssueError::Crypto(detail) | IssueError::Encoding(detail) => {
                error!("Token signing failed: {}", detail);
                Self::internal(ISSUE_FAILED)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "error": self.detail,
        });
        (status_code, Json(body)).into_response()
    }
}
