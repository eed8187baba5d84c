use crate::config::{CredentialsConfig, Settings};
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_APP_ID: &str = "970CA35de60c44645bbae8a215061b33";
pub const TEST_APP_CERTIFICATE: &str = "5CFd2fd1755d40ecb72977518be15d3b";

/// Test fixture wrapping the application router.
///
/// Requests are driven through the router in-process with `oneshot`, so no
/// socket is bound.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post("/issueToken", &json!({"channelName": "room1", "uid": 42}))
///         .await;
///
///     response.assert_ok().assert_cors();
///     let result = response.json_as::<IssueTokenResponse>();
///     assert!(result.token.starts_with("007"));
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub settings: Settings,
}

impl TestFixture {
    /// Creates a fixture whose server holds the test credential pair
    pub async fn new() -> Self {
        Self::with_credentials(CredentialsConfig::new(TEST_APP_ID, TEST_APP_CERTIFICATE)).await
    }

    /// Creates a fixture whose server has no credential pair configured
    pub async fn without_credentials() -> Self {
        Self::with_credentials(CredentialsConfig::default()).await
    }

    pub async fn with_credentials(credentials: CredentialsConfig) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let settings = Settings::for_test(credentials);
        let state = AppState::for_testing(&settings);
        let app = create_app(state).await;

        Self { app, settings }
    }

    /// Initializes the test logger. Safe to call more than once.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Creates a request builder with a JSON content type
    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json")
    }

    /// Sends a GET request to the specified URI
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends an OPTIONS request without a body
    pub async fn options(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::OPTIONS, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request with a JSON body to the specified URI
    pub async fn post<T: Serialize>(&self, uri: impl AsRef<str>, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }
}

/// Response from a test request that provides convenient access to status and JSON body
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Asserts that all three CORS headers are present
    pub fn assert_cors(&self) -> &Self {
        assert_eq!(
            self.headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()),
            Some(&b"*"[..])
        );
        assert_eq!(
            self.headers.get(ACCESS_CONTROL_ALLOW_HEADERS).map(|v| v.as_bytes()),
            Some(&b"Content-Type"[..])
        );
        assert_eq!(
            self.headers.get(ACCESS_CONTROL_ALLOW_METHODS).map(|v| v.as_bytes()),
            Some(&b"POST, OPTIONS"[..])
        );
        self
    }

    /// Converts the response body to the specified type
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
