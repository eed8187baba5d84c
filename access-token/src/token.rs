//! The access token wire format.
//!
//! ```text
//! token        = "007" base64(zlib(content))
//! content      = bytes(signature) signing_info
//! signing_info = string(app_id) u32(issue_ts) u32(expire) u32(salt)
//!                u16(service_count) service*
//! service      = u16(SERVICE_RTC) privileges string(channel_name) string(user_account)
//! privileges   = u16(count) (u16(code) u32(expire_ts))*
//! ```
//!
//! The signature is HMAC-SHA256 over `signing_info`, keyed by
//! `HMAC(u32(salt), HMAC(u32(issue_ts), certificate))`.

use crate::credential::Credential;
use crate::error::{IssueError, PackError, VerifyError};
use crate::packer::{Packer, Unpacker};
use crate::privilege::{Privilege, PrivilegeSet};
use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::io::{self, Read, Write};

/// Version tag every token starts with
pub const VERSION: &str = "007";

/// Service type of the real-time channel service
pub const SERVICE_RTC: u16 = 1;

type HmacSha256 = Hmac<Sha256>;

/// Decoded contents of an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    app_id: String,
    issue_ts: u32,
    expire: u32,
    salt: u32,
    channel_name: String,
    user_account: String,
    privileges: PrivilegeSet,
}

impl AccessToken {
    pub fn new(
        app_id: impl Into<String>,
        channel_name: impl Into<String>,
        user_account: impl Into<String>,
        issue_ts: u32,
        expire: u32,
        salt: u32,
        privileges: PrivilegeSet,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            issue_ts,
            expire,
            salt,
            channel_name: channel_name.into(),
            user_account: user_account.into(),
            privileges,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn issue_ts(&self) -> u32 {
        self.issue_ts
    }

    /// Token expiry, in seconds since the unix epoch
    pub fn expire(&self) -> u32 {
        self.expire
    }

    pub fn salt(&self) -> u32 {
        self.salt
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn user_account(&self) -> &str {
        &self.user_account
    }

    pub fn privileges(&self) -> &PrivilegeSet {
        &self.privileges
    }

    pub fn privilege_expiry(&self, privilege: Privilege) -> Option<u32> {
        self.privileges.expiry(privilege)
    }

    pub fn is_expired(&self, now: u32) -> bool {
        now >= self.expire
    }

    /// Signs the token with `credential` and encodes it
    pub fn build(&self, credential: &Credential) -> Result<String, IssueError> {
        if credential.app_id() != self.app_id {
            return Err(IssueError::InvalidInput(
                "token app id does not match the credential".to_string(),
            ));
        }

        let signing_info = self.signing_info()?;
        let key = signing_key(credential.certificate(), self.issue_ts, self.salt)
            .map_err(|e| IssueError::Crypto(e.to_string()))?;
        let signature = sign(&key, &signing_info).map_err(|e| IssueError::Crypto(e.to_string()))?;

        let mut content = Packer::new();
        content.put_bytes(&signature)?;
        let mut content = content.into_bytes();
        content.extend_from_slice(&signing_info);
        let compressed = compress(&content).map_err(|e| IssueError::Encoding(e.to_string()))?;

        Ok(format!("{VERSION}{}", STANDARD.encode(compressed)))
    }

    /// Decodes `token` and checks its signature against `credential`.
    ///
    /// Expiry is not checked here; see [`AccessToken::is_expired`].
    pub fn verify(token: &str, credential: &Credential) -> Result<Self, VerifyError> {
        let encoded = token
            .strip_prefix(VERSION)
            .ok_or(VerifyError::UnsupportedVersion)?;
        let compressed = STANDARD
            .decode(encoded)
            .map_err(|e| VerifyError::Decode(e.to_string()))?;
        let content = decompress(&compressed).map_err(|e| VerifyError::Decode(e.to_string()))?;

        let mut unpacker = Unpacker::new(&content);
        let signature = unpacker.get_bytes()?;
        let signing_info = unpacker.rest();
        let decoded = Self::unpack_signing_info(signing_info)?;

        let key = signing_key(credential.certificate(), decoded.issue_ts, decoded.salt)
            .map_err(|_| VerifyError::InvalidSignature)?;
        let mut mac =
            HmacSha256::new_from_slice(&key).map_err(|_| VerifyError::InvalidSignature)?;
        mac.update(signing_info);
        mac.verify_slice(signature)
            .map_err(|_| VerifyError::InvalidSignature)?;

        if decoded.app_id != credential.app_id() {
            return Err(VerifyError::AppIdMismatch(decoded.app_id));
        }

        Ok(decoded)
    }

    fn signing_info(&self) -> Result<Vec<u8>, PackError> {
        let mut packer = Packer::new();
        packer
            .put_string(&self.app_id)?
            .put_u32(self.issue_ts)
            .put_u32(self.expire)
            .put_u32(self.salt)
            .put_u16(1);

        // RTC service
        packer.put_u16(SERVICE_RTC);
        self.privileges.pack(&mut packer);
        packer
            .put_string(&self.channel_name)?
            .put_string(&self.user_account)?;

        Ok(packer.into_bytes())
    }

    fn unpack_signing_info(bytes: &[u8]) -> Result<Self, PackError> {
        let mut unpacker = Unpacker::new(bytes);
        let app_id = unpacker.get_string()?;
        let issue_ts = unpacker.get_u32()?;
        let expire = unpacker.get_u32()?;
        let salt = unpacker.get_u32()?;

        let service_count = unpacker.get_u16()?;
        if service_count != 1 {
            return Err(PackError::ServiceCount {
                expected: 1,
                found: service_count,
            });
        }
        let service_type = unpacker.get_u16()?;
        if service_type != SERVICE_RTC {
            return Err(PackError::UnknownService(service_type));
        }
        let privileges = PrivilegeSet::unpack(&mut unpacker)?;
        let channel_name = unpacker.get_string()?;
        let user_account = unpacker.get_string()?;
        unpacker.finish()?;

        Ok(Self {
            app_id,
            issue_ts,
            expire,
            salt,
            channel_name,
            user_account,
            privileges,
        })
    }
}

fn compress(content: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    encoder.finish()
}

fn decompress(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut content = Vec::new();
    ZlibDecoder::new(compressed).read_to_end(&mut content)?;
    Ok(content)
}

/// Derives the per-token signing key from the certificate, issue time and salt
fn signing_key(
    certificate: &[u8],
    issue_ts: u32,
    salt: u32,
) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
    let by_time = sign(&issue_ts.to_le_bytes(), certificate)?;
    sign(&salt.to_le_bytes(), &by_time)
}

fn sign(key: &[u8], message: &[u8]) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
