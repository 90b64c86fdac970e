//! Key derivation from a password
//!
//! Derives the 16-byte shared key by taking the MD5 digest of the password's
//! UTF-8 bytes. This matches how existing tokens were produced.
//!
//! MD5 is fast and unsalted. It is NOT a password-based key derivation
//! function and offers no resistance to brute-force or precomputed-table
//! attacks. It is kept only so tokens issued by the existing system can be
//! read; do not use it to protect new data.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use md5::{Digest, Md5};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{UnsealError, UnsealResult};

use super::jwk::OctetKey;

/// Length of the derived key in bytes (128 bits)
pub const DERIVED_KEY_LEN: usize = 16;

/// A key derived from a password
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; DERIVED_KEY_LEN],
}

impl DerivedKey {
    /// Parse the hex form stored as the "master password hash"
    ///
    /// Exactly 32 hex digits are accepted.
    pub fn from_hex(hash: &str) -> UnsealResult<Self> {
        let bytes = hex::decode(hash.trim()).map_err(|_| UnsealError::Key)?;
        if bytes.len() != DERIVED_KEY_LEN {
            return Err(UnsealError::Key);
        }

        let mut key = [0u8; DERIVED_KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.key
    }

    /// URL-safe base64 without padding, the form a symmetric JWK carries
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.key)
    }

    /// Lowercase hex, the form stored as the "master password hash"
    pub fn to_hex(&self) -> String {
        hex::encode(self.key)
    }

    /// Build the symmetric JWK handed to the envelope decryptor
    pub fn to_jwk(&self) -> OctetKey {
        OctetKey::new(self.to_base64url())
    }
}

// Never print the key bytes
impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("len", &DERIVED_KEY_LEN)
            .finish()
    }
}

/// Derive the shared key from a password
///
/// Any string is accepted, including the empty string.
pub fn derive_key(password: &str) -> DerivedKey {
    let digest = Md5::digest(password.as_bytes());

    let mut key = [0u8; DERIVED_KEY_LEN];
    key.copy_from_slice(&digest);

    DerivedKey { key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_password() {
        let key = derive_key("Prappser2025");
        assert_eq!(key.to_hex(), "086c846547fd8a5750fb8ea740c5e6bb");
        assert_eq!(key.to_base64url(), "CGyEZUf9ildQ-46nQMXmuw");
    }

    #[test]
    fn test_empty_password() {
        let key = derive_key("");
        assert_eq!(key.to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(key.to_base64url(), "1B2M2Y8AsgTpgAmY7PhCfg");
    }

    #[test]
    fn test_same_password_same_key() {
        let key1 = derive_key("test_passphrase");
        let key2 = derive_key("test_passphrase");
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_password_different_key() {
        let empty = derive_key("");
        for password in ["a", "Prappser2025", "admin-password", "passphrase1"] {
            assert_ne!(empty.as_bytes(), derive_key(password).as_bytes());
        }
        assert_ne!(
            derive_key("passphrase1").as_bytes(),
            derive_key("passphrase2").as_bytes()
        );
    }

    #[test]
    fn test_base64url_has_no_padding() {
        let encoded = derive_key("anything").to_base64url();
        assert_eq!(encoded.len(), 22);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn test_hex_round_trip() {
        let key = derive_key("Prappser2025");
        let parsed = DerivedKey::from_hex("086C846547FD8A5750FB8EA740C5E6BB").unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(DerivedKey::from_hex("zz"), Err(UnsealError::Key)));
        assert!(matches!(DerivedKey::from_hex("abcd"), Err(UnsealError::Key)));
        assert!(matches!(
            DerivedKey::from_hex("086c846547fd8a5750fb8ea740c5e6bb00"),
            Err(UnsealError::Key)
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let key = derive_key("Prappser2025");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("086c"));
        assert!(debug.contains("DerivedKey"));
    }

    #[test]
    fn test_to_jwk() {
        let jwk = derive_key("Prappser2025").to_jwk();
        assert_eq!(jwk.kty, "oct");
        assert_eq!(jwk.k, "CGyEZUf9ildQ-46nQMXmuw");
    }
}
