//! # access-token
//!
//! Issues and verifies signed, time-bounded tokens that admit a user into a
//! real-time communication channel.
//!
//! ## Components
//!
//! - **Packer:** little-endian, length-prefixed binary codec.
//! - **Privileges:** channel permissions, their expiries, and the roles granting them.
//! - **Token:** the `007` token format, HMAC-SHA256 signing and verification.
//! - **Builder:** role-based token issuance for a channel and user.

pub mod builder;
pub mod credential;
pub mod error;
pub mod packer;
pub mod privilege;
pub mod token;

pub use builder::{
    DEFAULT_TTL_SECS, MAX_CHANNEL_NAME_LEN, MAX_USER_ACCOUNT_LEN, RtcTokenBuilder, issue,
};
pub use credential::Credential;
pub use error::{IssueError, PackError, VerifyError};
pub use privilege::{Privilege, PrivilegeSet, Role};
pub use token::{AccessToken, VERSION};
