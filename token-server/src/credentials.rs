use crate::config::CredentialsConfig;
use access_token::{Credential, IssueError};
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::sync::Arc;

static PROVIDER: OnceCell<Arc<CredentialProvider>> = OnceCell::new();

/// Holds the credential pair for the lifetime of the process.
///
/// A provider built without both halves stays in a failed state: every
/// lookup returns a configuration error and configuration is never re-read.
#[derive(Debug)]
pub struct CredentialProvider {
    credential: Result<Credential, IssueError>,
}

impl CredentialProvider {
    pub fn from_config(config: &CredentialsConfig) -> Self {
        let credential = match (&config.app_id, &config.app_certificate) {
            (Some(app_id), Some(certificate)) => {
                Credential::new(app_id.as_str(), certificate.as_bytes())
            }
            (None, _) => Err(IssueError::Configuration(
                "AGORA_APP_ID is not set".to_string(),
            )),
            (_, None) => Err(IssueError::Configuration(
                "AGORA_APP_CERTIFICATE is not set".to_string(),
            )),
        };

        match &credential {
            Ok(_) => info!("Token signing credentials loaded"),
            Err(e) => warn!("Token issuance disabled: {}", e),
        }

        Self { credential }
    }

    /// Returns the process-wide provider, initializing it from `config` on
    /// first use. Later calls ignore `config`.
    pub fn global(config: &CredentialsConfig) -> Arc<Self> {
        PROVIDER
            .get_or_init(|| Arc::new(Self::from_config(config)))
            .clone()
    }

    pub fn credential(&self) -> Result<&Credential, IssueError> {
        self.credential.as_ref().map_err(Clone::clone)
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_ok()
    }
}
