use crate::error::IssueError;
use std::fmt;
use zeroize::Zeroizing;

/// The AppID / AppCertificate pair tokens are signed with.
///
/// The certificate is wiped from memory on drop and never shows up in
/// `Debug` output.
#[derive(Clone)]
pub struct Credential {
    app_id: String,
    certificate: Zeroizing<Vec<u8>>,
}

impl Credential {
    /// Both halves must be non-empty
    pub fn new(
        app_id: impl Into<String>,
        certificate: impl Into<Vec<u8>>,
    ) -> Result<Self, IssueError> {
        let app_id = app_id.into();
        let certificate = Zeroizing::new(certificate.into());

        if app_id.trim().is_empty() {
            return Err(IssueError::Configuration("app id is empty".to_string()));
        }
        if certificate.is_empty() {
            return Err(IssueError::Configuration(
                "app certificate is empty".to_string(),
            ));
        }

        Ok(Self {
            app_id,
            certificate,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub(crate) fn certificate(&self) -> &[u8] {
        &self.certificate
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("app_id", &self.app_id)
            .field("certificate", &"[REDACTED]")
            .finish()
    }
}
