use thiserror::Error;

/// Errors raised while building an access token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("credentials not configured: {0}")]
    Configuration(String),

    #[error("crypto failure: {0}")]
    Crypto(String),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Errors raised while decoding or verifying an access token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("unsupported token version")]
    UnsupportedVersion,

    #[error("token body cannot be decoded: {0}")]
    Decode(String),

    #[error("malformed token: {0}")]
    Malformed(#[from] PackError),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token was issued for app id '{0}'")]
    AppIdMismatch(String),
}

/// Errors raised by the length-prefixed binary codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("field of {0} bytes does not fit a u16 length prefix")]
    TooLong(usize),

    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after the last field")]
    TrailingBytes(usize),

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown privilege code {0}")]
    UnknownPrivilege(u16),

    #[error("unknown service type {0}")]
    UnknownService(u16),

    #[error("expected {expected} services, found {found}")]
    ServiceCount { expected: u16, found: u16 },
}

impl From<PackError> for IssueError {
    fn from(e: PackError) -> Self {
        IssueError::InvalidInput(e.to_string())
    }
}
