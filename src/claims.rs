//! Registration claims carried inside a sealed token
//!
//! Tokens arrive as `Authorization: Bearer <jwe>`. Once decrypted, the
//! payload is a small JSON object whose `jws` member holds an EdDSA-signed
//! JWT. That inner token names the Ed25519 public key it was signed with, so
//! verification proves possession of the key and freshness via `iat`.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{UnsealError, UnsealResult};

/// Scheme expected in the Authorization header
pub const BEARER_SCHEME: &str = "Bearer";

/// Lifetime of a registration token when none is configured
pub const DEFAULT_REGISTRATION_TTL_SECS: u32 = 10;

/// The only signing algorithm accepted for the inner token
const EDDSA: &str = "EdDSA";

/// Decrypted registration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationClaims {
    /// The inner signed token
    pub jws: String,
}

/// Claims of the inner token, returned only once its signature checked out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterJwsClaims {
    /// Standard base64 Ed25519 public key the token was signed with
    #[serde(rename = "publicKey")]
    pub public_key: String,
    pub username: String,
    /// Issue time, seconds since the Unix epoch
    #[serde(rename = "iat")]
    pub issued_at: i64,
}

impl RegistrationClaims {
    /// Parse claims from decrypted payload bytes
    pub fn from_payload(payload: &[u8]) -> UnsealResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| UnsealError::Claims(format!("Failed to parse payload: {}", e)))
    }

    /// Verify the inner token against the current time
    pub fn verify_now(&self, ttl_secs: u32) -> UnsealResult<RegisterJwsClaims> {
        self.verify(ttl_secs, Utc::now())
    }

    /// Verify the inner token
    ///
    /// Checks, in order: the token shape, that `iat + ttl_secs` is not before
    /// `now`, that `publicKey` decodes to an Ed25519 key, that the header
    /// names `EdDSA`, and finally the signature over `header.payload`.
    pub fn verify(&self, ttl_secs: u32, now: DateTime<Utc>) -> UnsealResult<RegisterJwsClaims> {
        let segments: Vec<&str> = self.jws.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
            return Err(rejected(format!(
                "failed to parse JWT: expected 3 segments, got {}",
                segments.len()
            )));
        };

        let header = decode_json_object(header_b64, "header")?;
        let claims = read_claims(&decode_json_object(payload_b64, "claims")?);

        let expires_at = claims.issued_at.saturating_add(i64::from(ttl_secs));
        if expires_at < now.timestamp() {
            return Err(rejected("JWT has expired"));
        }

        let key = decode_public_key(&claims.public_key)?;

        let alg = header.get("alg").and_then(Value::as_str).unwrap_or_default();
        if alg != EDDSA {
            return Err(rejected(format!("unexpected signing method: {}", alg)));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .ok()
            .and_then(|bytes| Signature::from_slice(&bytes).ok())
            .ok_or_else(|| rejected("JWT signature verification failed"))?;

        let signing_input = format!("{}.{}", header_b64, payload_b64);
        key.verify(signing_input.as_bytes(), &signature)
            .map_err(|_| rejected("JWT signature verification failed"))?;

        debug!(username = %claims.username, "Registration token verified");
        Ok(claims)
    }
}

fn rejected(reason: impl Into<String>) -> UnsealError {
    UnsealError::Verification(reason.into())
}

fn decode_json_object(segment: &str, what: &str) -> UnsealResult<Map<String, Value>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| rejected(format!("failed to parse JWT {}: {}", what, e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| rejected(format!("failed to parse JWT {}: {}", what, e)))
}

/// Missing or mistyped members read as empty, like an unset field
fn read_claims(claims: &Map<String, Value>) -> RegisterJwsClaims {
    let text = |name: &str| {
        claims
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    RegisterJwsClaims {
        public_key: text("publicKey"),
        username: text("username"),
        issued_at: claims
            .get("iat")
            .and_then(Value::as_f64)
            .map(|iat| iat as i64)
            .unwrap_or_default(),
    }
}

fn decode_public_key(encoded: &str) -> UnsealResult<VerifyingKey> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| rejected(format!("failed to decode public key: {}", e)))?;

    let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
        rejected(format!(
            "invalid public key size: expected {}, got {}",
            PUBLIC_KEY_LENGTH,
            bytes.len()
        ))
    })?;

    VerifyingKey::from_bytes(&bytes).map_err(|e| rejected(format!("invalid public key: {}", e)))
}

/// Pull the token out of an `Authorization` header value
///
/// The value must be exactly `Bearer <token>`, separated by a single space.
pub fn extract_bearer_token(header: &str) -> UnsealResult<&str> {
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME => Ok(*token),
        _ => Err(UnsealError::Claims(
            "invalid Authorization header format".into(),
        )),
    }
}
