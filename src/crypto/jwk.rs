//! Symmetric JSON Web Key
//!
//! The decryptor takes its shared key the way JOSE libraries do: as an
//! `oct` JWK whose `k` member holds the raw bytes in unpadded base64url.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{UnsealError, UnsealResult};

use super::secure_memory::SecureBytes;

/// Key type value for symmetric keys
pub const OCT_KEY_TYPE: &str = "oct";

/// A symmetric (`kty = "oct"`) JSON Web Key
#[derive(Clone, Serialize, Deserialize)]
pub struct OctetKey {
    /// Key type, always "oct"
    pub kty: String,
    /// Key value, unpadded base64url
    pub k: String,
}

impl OctetKey {
    /// Create a key from its base64url value
    pub fn new(k: impl Into<String>) -> Self {
        Self {
            kty: OCT_KEY_TYPE.to_string(),
            k: k.into(),
        }
    }

    /// Create a key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decode the raw key bytes
    ///
    /// A wrong key type or an undecodable value is a key failure.
    pub fn decode(&self) -> UnsealResult<SecureBytes> {
        if self.kty != OCT_KEY_TYPE {
            return Err(UnsealError::Key);
        }

        URL_SAFE_NO_PAD
            .decode(&self.k)
            .map(SecureBytes::new)
            .map_err(|_| UnsealError::Key)
    }
}

impl Drop for OctetKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.k.zeroize();
    }
}

impl fmt::Debug for OctetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctetKey")
            .field("kty", &self.kty)
            .field("k", &"[REDACTED]")
            .finish()
    }
}
