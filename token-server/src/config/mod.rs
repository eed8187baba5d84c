pub(crate) use crate::config::credentials::CredentialsConfig;
use access_token::{DEFAULT_TTL_SECS, Role};
use confique::Config;

pub mod credentials;

/// Main configuration structure for the token server
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// The port the token server will listen to (default: 8080)
    #[config(env = "TOKEN_SERVER_PORT", default = 8080)]
    pub port: u16,

    /// Token lifetime in seconds (default: 3600 = 1 hour)
    #[config(env = "TOKEN_SERVER_TTL", default = 3600)]
    pub token_ttl: u32,

    /// Role granted by issued tokens: "publisher" or "subscriber"
    /// (default: "publisher")
    #[config(env = "TOKEN_SERVER_ROLE", default = "publisher")]
    pub role: String,

    /// The credential pair tokens are signed with
    #[config(nested)]
    pub credentials: CredentialsConfig,
}

impl Settings {
    /// Creates a new Settings instance from environment variables
    pub fn new() -> Result<Self, String> {
        Self::builder().env().load().map_err(|e| e.to_string())
    }

    /// Parses the configured role
    pub fn role(&self) -> Result<Role, String> {
        self.role.parse()
    }

    #[cfg(test)]
    pub fn for_test(credentials: CredentialsConfig) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            token_ttl: DEFAULT_TTL_SECS,
            role: "publisher".to_string(),
            credentials,
        }
    }
}
