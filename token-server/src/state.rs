use crate::{config::Settings, credentials::CredentialProvider};
use access_token::Role;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub credentials: Arc<CredentialProvider>,
    pub role: Role,
}

impl AppState {
    /// Builds the state around the process-wide credential provider
    pub fn new(settings: Settings) -> Result<Self, String> {
        let credentials = CredentialProvider::global(&settings.credentials);
        Self::with_credentials(settings, credentials)
    }

    /// Builds the state around a given credential provider
    pub fn with_credentials(
        settings: Settings,
        credentials: Arc<CredentialProvider>,
    ) -> Result<Self, String> {
        let role = settings.role()?;
        Ok(Self {
            settings: Arc::new(settings),
            credentials,
            role,
        })
    }

    /// Check if the server can issue tokens
    pub fn health_check(&self) -> bool {
        self.credentials.is_configured()
    }

    #[cfg(test)]
    pub fn for_testing(settings: &Settings) -> Self {
        let credentials = Arc::new(CredentialProvider::from_config(&settings.credentials));
        Self::with_credentials(settings.clone(), credentials)
            .expect("Failed to create test state")
    }
}
