//! JWE algorithm identifiers
//!
//! `alg` names how the content-encryption key is obtained, `enc` names the
//! authenticated cipher that protects the payload.

use std::fmt;
use std::str::FromStr;

use crate::error::UnsealError;

/// Key-management algorithm (`alg` header member)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyManagement {
    /// The shared key is the content-encryption key
    Direct,
    /// AES key wrap (RFC 3394) with a 128-bit key
    A128Kw,
    /// AES key wrap with a 192-bit key
    A192Kw,
    /// AES key wrap with a 256-bit key
    A256Kw,
}

impl KeyManagement {
    /// Header value for this algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "dir",
            Self::A128Kw => "A128KW",
            Self::A192Kw => "A192KW",
            Self::A256Kw => "A256KW",
        }
    }

    /// Required length of the shared key when wrapping, `None` for `dir`
    pub fn wrapping_key_len(&self) -> Option<usize> {
        match self {
            Self::Direct => None,
            Self::A128Kw => Some(16),
            Self::A192Kw => Some(24),
            Self::A256Kw => Some(32),
        }
    }
}

impl FromStr for KeyManagement {
    type Err = UnsealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dir" => Ok(Self::Direct),
            "A128KW" => Ok(Self::A128Kw),
            "A192KW" => Ok(Self::A192Kw),
            "A256KW" => Ok(Self::A256Kw),
            other => Err(UnsealError::Unsupported(format!("alg={}", other))),
        }
    }
}

impl fmt::Display for KeyManagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-encryption algorithm (`enc` header member)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncryption {
    /// AES-GCM with a 128-bit key
    A128Gcm,
    /// AES-GCM with a 192-bit key
    A192Gcm,
    /// AES-GCM with a 256-bit key
    A256Gcm,
}

impl ContentEncryption {
    /// Header value for this algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A128Gcm => "A128GCM",
            Self::A192Gcm => "A192GCM",
            Self::A256Gcm => "A256GCM",
        }
    }

    /// Required content-encryption key length in bytes
    pub fn key_len(&self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A256Gcm => 32,
        }
    }
}

impl FromStr for ContentEncryption {
    type Err = UnsealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A128GCM" => Ok(Self::A128Gcm),
            "A192GCM" => Ok(Self::A192Gcm),
            "A256GCM" => Ok(Self::A256Gcm),
            other => Err(UnsealError::Unsupported(format!("enc={}", other))),
        }
    }
}

impl fmt::Display for ContentEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_management() {
        assert_eq!("dir".parse::<KeyManagement>().unwrap(), KeyManagement::Direct);
        assert_eq!("A256KW".parse::<KeyManagement>().unwrap(), KeyManagement::A256Kw);
        assert!(matches!(
            "RSA-OAEP".parse::<KeyManagement>(),
            Err(UnsealError::Unsupported(_))
        ));
        // Header values are case-sensitive
        assert!("DIR".parse::<KeyManagement>().is_err());
    }

    #[test]
    fn test_parse_content_encryption() {
        assert_eq!(
            "A128GCM".parse::<ContentEncryption>().unwrap(),
            ContentEncryption::A128Gcm
        );
        assert!(matches!(
            "A128CBC-HS256".parse::<ContentEncryption>(),
            Err(UnsealError::Unsupported(_))
        ));
    }

    #[test]
    fn test_key_lengths() {
        assert_eq!(ContentEncryption::A128Gcm.key_len(), 16);
        assert_eq!(ContentEncryption::A192Gcm.key_len(), 24);
        assert_eq!(ContentEncryption::A256Gcm.key_len(), 32);
        assert_eq!(KeyManagement::Direct.wrapping_key_len(), None);
        assert_eq!(KeyManagement::A192Kw.wrapping_key_len(), Some(24));
    }

    #[test]
    fn test_display_matches_header_value() {
        for alg in [
            KeyManagement::Direct,
            KeyManagement::A128Kw,
            KeyManagement::A192Kw,
            KeyManagement::A256Kw,
        ] {
            assert_eq!(alg.to_string().parse::<KeyManagement>().unwrap(), alg);
        }
    }
}
