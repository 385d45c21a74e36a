use base64::{engine::general_purpose, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt::Debug;

use crate::error::TransportError;

type HmacSha256 = Hmac<Sha256>;

/// GSI credentials (client ID / client secret) used to sign every request
///
/// The secret is the base64 string issued by `CreateIdentifier`. Both fields
/// are redacted in Debug.
#[derive(Clone)]
pub struct Gs2Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Gs2Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Load credentials from the process environment
    ///
    /// Expected variables: GS2_CLIENT_ID, GS2_CLIENT_SECRET.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self {
            client_id: std::env::var("GS2_CLIENT_ID")?,
            client_secret: std::env::var("GS2_CLIENT_SECRET")?,
        })
    }

    /// Signature for one call: base64(HMAC-SHA256(secret, "{module}:{action}:{timestamp}"))
    pub fn sign(&self, module: &str, action: &str, timestamp: i64) -> Result<String, TransportError> {
        let key = general_purpose::STANDARD
            .decode(self.client_secret.trim())
            .map_err(|e| TransportError::Credentials(format!("client secret is not base64: {e}")))?;
        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| TransportError::Credentials(e.to_string()))?;
        mac.update(format!("{module}:{action}:{timestamp}").as_bytes());
        Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl Debug for Gs2Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Gs2Credentials))
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
