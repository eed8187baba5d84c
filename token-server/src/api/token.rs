use crate::errors::ApiError;
use crate::models::{ErrorResponse, IssueTokenRequest, IssueTokenResponse, TokenRequest};
use crate::openapi::TOKEN_TAG;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use log::{info, warn};

/// Issue an access token for a channel and user
#[utoipa::path(
    post,
    path = "/issueToken",
    tag = TOKEN_TAG,
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = IssueTokenResponse),
        (status = 400, description = "Missing, malformed or oversized fields", body = ErrorResponse),
        (status = 500, description = "Credentials missing or signing failed", body = ErrorResponse)
    )
)]
pub(crate) async fn issue_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    let request = TokenRequest::from_body(&body).map_err(|e| {
        warn!("Rejected token request: {}", e);
        ApiError::from(e)
    })?;

    let credential = state.credentials.credential()?;
    let token = access_token::issue(
        &request.channel_name,
        &request.user_identifier,
        state.role,
        state.settings.token_ttl,
        credential,
    )?;

    info!(
        "Token generated for channel {} and user {}",
        request.channel_name, request.user_identifier
    );
    Ok(Json(IssueTokenResponse { token }))
}

/// CORS preflight; never touches the request body
#[utoipa::path(
    options,
    path = "/issueToken",
    tag = TOKEN_TAG,
    responses(
        (status = 200, description = "Preflight accepted")
    )
)]
pub(crate) async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, "This was a preflight call!")
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/issueToken",
        post(issue_token)
            .options(preflight)
            .fallback(method_not_allowed),
    )
}

#[cfg(test)]
mod tests {
    use crate::errors::CREDENTIALS_NOT_CONFIGURED;
    use crate::models::IssueTokenResponse;
    use crate::test_utils::{TestFixture, TEST_APP_CERTIFICATE, TEST_APP_ID};
    use access_token::{AccessToken, Credential, Privilege};
    use axum::body::Body;
    use http::{Method, StatusCode};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn credential() -> Credential {
        Credential::new(TEST_APP_ID, TEST_APP_CERTIFICATE).unwrap()
    }

    fn now() -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as u32
    }

    #[tokio::test]
    async fn test_issue_token() {
        let fixture = TestFixture::new().await;
        let before = now();

        let response = fixture
            .post("/issueToken", &json!({"channelName": "room1", "uid": "42"}))
            .await;
        response.assert_ok().assert_cors();

        let token = response.json_as::<IssueTokenResponse>().token;
        let decoded = AccessToken::verify(&token, &credential()).unwrap();
        assert_eq!(decoded.app_id(), TEST_APP_ID);
        assert_eq!(decoded.channel_name(), "room1");
        assert_eq!(decoded.user_account(), "42");
        assert!(decoded.issue_ts() >= before && decoded.issue_ts() <= before + 5);
        assert_eq!(
            decoded.expire(),
            decoded.issue_ts() + fixture.settings.token_ttl
        );
        for privilege in Privilege::ALL {
            assert_eq!(decoded.privilege_expiry(privilege), Some(decoded.expire()));
        }
    }

    #[tokio::test]
    async fn test_numeric_uid_matches_string_uid() {
        let fixture = TestFixture::new().await;

        let numeric = fixture
            .post("/issueToken", &json!({"channelName": "room1", "uid": 42}))
            .await;
        let text = fixture
            .post("/issueToken", &json!({"channelName": "room1", "uid": "42"}))
            .await;
        numeric.assert_ok();
        text.assert_ok();

        let numeric = AccessToken::verify(&numeric.json_as::<IssueTokenResponse>().token, &credential()).unwrap();
        let text = AccessToken::verify(&text.json_as::<IssueTokenResponse>().token, &credential()).unwrap();
        assert_eq!(numeric.user_account(), text.user_account());
    }

    #[tokio::test]
    async fn test_identical_requests_give_distinct_tokens() {
        let fixture = TestFixture::new().await;
        let body = json!({"channelName": "room1", "uid": "42"});

        let first = fixture.post("/issueToken", &body).await;
        let second = fixture.post("/issueToken", &body).await;
        assert_ne!(
            first.json_as::<IssueTokenResponse>().token,
            second.json_as::<IssueTokenResponse>().token
        );
    }

    #[tokio::test]
    async fn test_missing_channel_name() {
        let fixture = TestFixture::new().await;
        let response = fixture.post("/issueToken", &json!({"uid": "42"})).await;
        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_cors();
        assert_eq!(
            response.json,
            json!({"error": "channelName and uid are required"})
        );
    }

    #[tokio::test]
    async fn test_missing_uid() {
        let fixture = TestFixture::new().await;
        let response = fixture
            .post("/issueToken", &json!({"channelName": "room1"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json,
            json!({"error": "channelName and uid are required"})
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let fixture = TestFixture::new().await;
        let request = fixture
            .request_builder(Method::POST, "/issueToken")
            .body(Body::from("{\"channelName\": "))
            .expect("Failed to build request");

        let response = fixture.send(request).await;
        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_cors();
        assert!(response.json["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed request body"));
    }

    #[tokio::test]
    async fn test_oversized_channel_name() {
        let fixture = TestFixture::new().await;
        let response = fixture
            .post(
                "/issueToken",
                &json!({"channelName": "c".repeat(65), "uid": "42"}),
            )
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json,
            json!({"error": "channelName must be at most 64 bytes"})
        );
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let fixture = TestFixture::without_credentials().await;
        let response = fixture
            .post("/issueToken", &json!({"channelName": "room1", "uid": "42"}))
            .await;
        response
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
            .assert_cors();
        assert_eq!(response.json, json!({"error": CREDENTIALS_NOT_CONFIGURED}));
    }

    #[tokio::test]
    async fn test_validation_runs_before_credential_check() {
        let fixture = TestFixture::without_credentials().await;
        let response = fixture.post("/issueToken", &json!({"uid": "42"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preflight() {
        let fixture = TestFixture::without_credentials().await;
        let request = fixture
            .request_builder(Method::OPTIONS, "/issueToken")
            .body(Body::from("not even json"))
            .expect("Failed to build request");

        let response = fixture.send(request).await;
        response.assert_ok().assert_cors();
    }

    #[tokio::test]
    async fn test_preflight_without_body() {
        let fixture = TestFixture::new().await;
        let response = fixture.options("/issueToken").await;
        response.assert_ok().assert_cors();
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let fixture = TestFixture::new().await;
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let request = fixture
                .request_builder(method, "/issueToken")
                .body(Body::empty())
                .expect("Failed to build request");
            let response = fixture.send(request).await;
            response
                .assert_status(StatusCode::METHOD_NOT_ALLOWED)
                .assert_cors();
            assert_eq!(response.json, json!({"error": "method not allowed"}));
        }
    }

    #[tokio::test]
    async fn test_response_never_contains_certificate() {
        let fixture = TestFixture::new().await;
        let bodies = [
            json!({"channelName": "room1", "uid": "42"}),
            json!({"channelName": "room1"}),
            json!({"channelName": "c".repeat(100), "uid": 1}),
        ];
        for body in bodies {
            let response = fixture.post("/issueToken", &body).await;
            assert!(!response.json.to_string().contains(TEST_APP_CERTIFICATE));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_issuance() {
        let fixture = std::sync::Arc::new(TestFixture::new().await);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let fixture = fixture.clone();
                tokio::spawn(async move {
                    let response = fixture
                        .post("/issueToken", &json!({"channelName": "room1", "uid": i + 1}))
                        .await;
                    response.assert_ok();
                    response.json_as::<IssueTokenResponse>().token
                })
            })
            .collect();

        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap());
        }
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 32);
        for token in tokens {
            assert!(AccessToken::verify(&token, &credential()).is_ok());
        }
    }
}
