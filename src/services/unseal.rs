//! Unseal service
//!
//! Holds the shared key once and opens tokens with it: raw compact tokens,
//! `Authorization` header values, and registration claims.

use tracing::debug;

use crate::claims::{extract_bearer_token, RegisterJwsClaims, RegistrationClaims};
use crate::crypto::{decrypt, derive_key, DerivedKey, OctetKey};
use crate::error::{UnsealError, UnsealResult};

/// Service for opening sealed tokens with one shared key
#[derive(Debug, Clone)]
pub struct UnsealService {
    key: OctetKey,
}

impl UnsealService {
    /// Create a service from an already derived key
    pub fn new(key: &DerivedKey) -> Self {
        Self { key: key.to_jwk() }
    }

    /// Create a service from a password
    pub fn from_password(password: &str) -> Self {
        Self::new(&derive_key(password))
    }

    /// Create a service from the stored hex digest of the password
    pub fn from_master_hash(hash: &str) -> UnsealResult<Self> {
        Ok(Self::new(&DerivedKey::from_hex(hash)?))
    }

    /// Decrypt a compact token to raw bytes
    pub fn open(&self, token: &str) -> UnsealResult<Vec<u8>> {
        let plaintext = decrypt(token, &self.key)?;
        debug!(len = plaintext.len(), "Token opened");
        Ok(plaintext)
    }

    /// Decrypt a compact token to text
    pub fn open_string(&self, token: &str) -> UnsealResult<String> {
        let plaintext = self.open(token)?;
        String::from_utf8(plaintext)
            .map_err(|e| UnsealError::Claims(format!("Invalid UTF-8 in decrypted data: {}", e)))
    }

    /// Decrypt a token and parse the registration claims it carries
    pub fn open_claims(&self, token: &str) -> UnsealResult<RegistrationClaims> {
        RegistrationClaims::from_payload(&self.open(token)?)
    }

    /// Decrypt a token and verify the signed registration token inside it
    pub fn open_verified(&self, token: &str, ttl_secs: u32) -> UnsealResult<RegisterJwsClaims> {
        self.open_claims(token)?.verify_now(ttl_secs)
    }

    /// Decrypt the token carried in an `Authorization: Bearer` header value
    pub fn open_authorization(&self, header: &str) -> UnsealResult<RegistrationClaims> {
        self.open_claims(extract_bearer_token(header)?)
    }
}

/// Derive the key from `password`, decrypt `token`, and return the text
pub fn unseal(password: &str, token: &str) -> UnsealResult<String> {
    UnsealService::from_password(password).open_string(token)
}
