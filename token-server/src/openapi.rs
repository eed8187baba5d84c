use crate::api::{health, token};
use crate::models::{ErrorResponse, IssueTokenRequest, IssueTokenResponse, UserIdentifier};
use crate::state::AppState;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const TOKEN_TAG: &str = "Token API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::ready_check,
        token::issue_token,
        token::preflight,
    ),
    components(schemas(IssueTokenRequest, IssueTokenResponse, ErrorResponse, UserIdentifier)),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = TOKEN_TAG, description = "Channel access token issuance"),
    ),
    info(
        title = "RTC Token Server API",
        description = "Issues signed access tokens for real-time channels",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

/// Handler for the OpenAPI JSON specification endpoint
async fn openapi_json_handler() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Creates a router for OpenAPI documentation routes
pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json_handler))
}
