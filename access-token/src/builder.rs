use crate::credential::Credential;
use crate::error::IssueError;
use crate::privilege::{PrivilegeSet, Role};
use crate::token::AccessToken;
use log::debug;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default token lifetime (1 hour)
pub const DEFAULT_TTL_SECS: u32 = 3600;

/// Upper bound on channel name length, in bytes
pub const MAX_CHANNEL_NAME_LEN: usize = 64;

/// Upper bound on user account length, in bytes
pub const MAX_USER_ACCOUNT_LEN: usize = 255;

/// Builder for RTC channel tokens.
///
/// Issue time and salt are drawn fresh on every [`RtcTokenBuilder::build`]
/// unless pinned with [`RtcTokenBuilder::with_issue_ts`] and
/// [`RtcTokenBuilder::with_salt`].
///
/// ```
/// use access_token::{Credential, Role, RtcTokenBuilder};
///
/// let credential = Credential::new("my-app-id", "my-app-certificate").unwrap();
/// let token = RtcTokenBuilder::new("room1", "42")
///     .with_role(Role::Publisher)
///     .with_ttl(3600)
///     .build(&credential)
///     .unwrap();
/// assert!(token.starts_with("007"));
/// ```
#[derive(Debug, Clone)]
pub struct RtcTokenBuilder {
    channel_name: String,
    user_account: String,
    role: Role,
    ttl_secs: u32,
    issue_ts: Option<u32>,
    salt: Option<u32>,
    privileges: Option<PrivilegeSet>,
}

impl RtcTokenBuilder {
    pub fn new(channel_name: impl Into<String>, user_account: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            user_account: user_account.into(),
            role: Role::default(),
            ttl_secs: DEFAULT_TTL_SECS,
            issue_ts: None,
            salt: None,
            privileges: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_ttl(mut self, ttl_secs: u32) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Pins the issue time instead of reading the clock
    pub fn with_issue_ts(mut self, issue_ts: u32) -> Self {
        self.issue_ts = Some(issue_ts);
        self
    }

    /// Pins the salt instead of drawing a random one
    pub fn with_salt(mut self, salt: u32) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Replaces the role's privileges with an explicit set, e.g. to give
    /// individual privileges their own expiry
    pub fn with_privileges(mut self, privileges: PrivilegeSet) -> Self {
        self.privileges = Some(privileges);
        self
    }

    /// Validates the inputs and assembles the unsigned token
    pub fn token(&self, app_id: &str) -> Result<AccessToken, IssueError> {
        validate_field("channel name", &self.channel_name, MAX_CHANNEL_NAME_LEN)?;
        validate_field("user account", &self.user_account, MAX_USER_ACCOUNT_LEN)?;

        let issue_ts = match self.issue_ts {
            Some(ts) => ts,
            None => now()?,
        };
        let expire = issue_ts.checked_add(self.ttl_secs).ok_or_else(|| {
            IssueError::InvalidInput(format!(
                "ttl of {}s overflows the token expiry",
                self.ttl_secs
            ))
        })?;
        let salt = self.salt.unwrap_or_else(|| rand::thread_rng().r#gen());
        let privileges = self
            .privileges
            .clone()
            .unwrap_or_else(|| PrivilegeSet::for_role(self.role, expire));

        Ok(AccessToken::new(
            app_id,
            self.channel_name.as_str(),
            self.user_account.as_str(),
            issue_ts,
            expire,
            salt,
            privileges,
        ))
    }

    /// Builds and signs the token
    pub fn build(&self, credential: &Credential) -> Result<String, IssueError> {
        let token = self.token(credential.app_id())?;
        let encoded = token.build(credential)?;
        debug!(
            "Built {} token for channel '{}' and user '{}', expiring at {}",
            self.role,
            token.channel_name(),
            token.user_account(),
            token.expire()
        );
        Ok(encoded)
    }
}

/// Issues a token for `user_account` in `channel_name` with the privileges of `role`
pub fn issue(
    channel_name: &str,
    user_account: &str,
    role: Role,
    ttl_secs: u32,
    credential: &Credential,
) -> Result<String, IssueError> {
    RtcTokenBuilder::new(channel_name, user_account)
        .with_role(role)
        .with_ttl(ttl_secs)
        .build(credential)
}

/// Current time in seconds since the unix epoch
pub fn now() -> Result<u32, IssueError> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| IssueError::Crypto(format!("System time error: {e}")))?
        .as_secs();
    u32::try_from(secs)
        .map_err(|_| IssueError::Crypto(format!("System time {secs} does not fit in 32 bits")))
}

fn validate_field(name: &str, value: &str, max_len: usize) -> Result<(), IssueError> {
    if value.is_empty() {
        return Err(IssueError::InvalidInput(format!("{name} is empty")));
    }
    if value.len() > max_len {
        return Err(IssueError::InvalidInput(format!(
            "{name} must be at most {max_len} bytes"
        )));
    }
    Ok(())
}
