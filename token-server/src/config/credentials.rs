//! Credential pair configuration

use confique::Config;
use std::fmt;

/// The AppID / AppCertificate pair, read once at start-up.
///
/// Both halves are optional here; a missing half leaves the server running
/// with token issuance disabled.
#[derive(Config, Clone, Default)]
pub struct CredentialsConfig {
    /// Application identifier, sent in plaintext inside every token
    #[config(env = "AGORA_APP_ID")]
    pub app_id: Option<String>,

    /// Application certificate used to sign tokens (secret)
    #[config(env = "AGORA_APP_CERTIFICATE")]
    pub app_certificate: Option<String>,
}

impl CredentialsConfig {
    pub fn new(app_id: impl Into<String>, app_certificate: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            app_certificate: Some(app_certificate.into()),
        }
    }
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("app_id", &self.app_id)
            .field(
                "app_certificate",
                &self.app_certificate.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
