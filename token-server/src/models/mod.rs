use access_token::{MAX_CHANNEL_NAME_LEN, MAX_USER_ACCOUNT_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// User identity as sent by clients: either a number or a string
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserIdentifier {
    Numeric(u64),
    Text(String),
}

impl UserIdentifier {
    /// Canonical string form; `42` and `"42"` map to the same value
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Empty strings and the numeric id `0` do not identify anyone
    pub fn is_empty(&self) -> bool {
        match self {
            UserIdentifier::Numeric(n) => *n == 0,
            UserIdentifier::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIdentifier::Numeric(n) => write!(f, "{n}"),
            UserIdentifier::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Body of a token issuance request
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenRequest {
    /// Channel the token admits the user into (at most 64 bytes)
    #[serde(default)]
    pub channel_name: Option<String>,
    /// User identity, numeric or textual (at most 255 bytes once rendered)
    #[serde(default)]
    pub uid: Option<UserIdentifier>,
}

/// Successful issuance response
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct IssueTokenResponse {
    /// The signed access token
    pub token: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ErrorResponse {
    /// Human readable reason
    pub error: String,
}

/// Reasons a request cannot be turned into a [`TokenRequest`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("channelName and uid are required")]
    MissingField,

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    InvalidInput(String),
}

/// A validated, canonical issuance request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub channel_name: String,
    pub user_identifier: String,
}

impl TokenRequest {
    /// Parses and validates a raw request body
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        let request: IssueTokenRequest = serde_json::from_slice(body)
            .map_err(|e| RequestError::MalformedBody(e.to_string()))?;
        Self::try_from(request)
    }
}

impl TryFrom<IssueTokenRequest> for TokenRequest {
    type Error = RequestError;

    fn try_from(request: IssueTokenRequest) -> Result<Self, Self::Error> {
        let (channel_name, uid) = match (request.channel_name, request.uid) {
            (Some(channel_name), Some(uid)) if !channel_name.is_empty() && !uid.is_empty() => {
                (channel_name, uid)
            }
            _ => return Err(RequestError::MissingField),
        };

        if channel_name.len() > MAX_CHANNEL_NAME_LEN {
            return Err(RequestError::InvalidInput(format!(
                "channelName must be at most {MAX_CHANNEL_NAME_LEN} bytes"
            )));
        }

        let user_identifier = uid.canonical();
        if user_identifier.len() > MAX_USER_ACCOUNT_LEN {
            return Err(RequestError::InvalidInput(format!(
                "uid must be at most {MAX_USER_ACCOUNT_LEN} bytes"
            )));
        }

        Ok(Self {
            channel_name,
            user_identifier,
        })
    }
}
