//! JWE protected header
//!
//! Only the members that change how a token is decrypted are modelled.
//! Anything else in the header is ignored, except `zip` and `crit`, which
//! would change the meaning of the payload and are therefore refused.

use serde::{Deserialize, Serialize};

use crate::error::{UnsealError, UnsealResult};

use super::algorithms::{ContentEncryption, KeyManagement};

/// Decoded protected header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedHeader {
    /// Content-encryption algorithm
    pub enc: ContentEncryption,
    /// Key-management algorithm
    pub alg: KeyManagement,
    /// Key identifier, informational only
    pub kid: Option<String>,
    /// Media type of the complete token
    pub typ: Option<String>,
    /// Media type of the payload
    pub cty: Option<String>,
}

/// Wire shape of the header. Member order here is the order used when
/// serializing, which keeps freshly sealed tokens byte-compatible with the
/// ones issued by the existing system (`{"enc":...,"alg":...}`).
#[derive(Serialize, Deserialize)]
struct RawHeader {
    enc: String,
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cty: Option<String>,
    #[serde(default, skip_serializing)]
    zip: Option<String>,
    #[serde(default, skip_serializing)]
    crit: Option<Vec<String>>,
}

impl ProtectedHeader {
    /// Create a header with just the two algorithm members
    pub fn new(alg: KeyManagement, enc: ContentEncryption) -> Self {
        Self {
            enc,
            alg,
            kid: None,
            typ: None,
            cty: None,
        }
    }

    /// Parse the decoded header bytes
    pub fn from_json(bytes: &[u8]) -> UnsealResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| UnsealError::Parse(format!("Header is not valid JSON: {}", e)))?;

        if !value.is_object() {
            return Err(UnsealError::Parse("Header is not a JSON object".into()));
        }

        let raw: RawHeader = serde_json::from_value(value)
            .map_err(|e| UnsealError::Parse(format!("Invalid header: {}", e)))?;

        if let Some(zip) = raw.zip {
            return Err(UnsealError::Unsupported(format!("zip={}", zip)));
        }
        if let Some(crit) = raw.crit.filter(|c| !c.is_empty()) {
            return Err(UnsealError::Unsupported(format!("crit={}", crit.join(","))));
        }

        Ok(Self {
            enc: raw.enc.parse()?,
            alg: raw.alg.parse()?,
            kid: raw.kid,
            typ: raw.typ,
            cty: raw.cty,
        })
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> UnsealResult<Vec<u8>> {
        let raw = RawHeader {
            enc: self.enc.as_str().to_string(),
            alg: self.alg.as_str().to_string(),
            kid: self.kid.clone(),
            typ: self.typ.clone(),
            cty: self.cty.clone(),
            zip: None,
            crit: None,
        };
        Ok(serde_json::to_vec(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_header() {
        let header = ProtectedHeader::from_json(br#"{"enc":"A128GCM","alg":"dir"}"#).unwrap();
        assert_eq!(header.enc, ContentEncryption::A128Gcm);
        assert_eq!(header.alg, KeyManagement::Direct);
        assert_eq!(header.kid, None);
    }

    #[test]
    fn test_serialize_member_order() {
        let header = ProtectedHeader::new(KeyManagement::Direct, ContentEncryption::A128Gcm);
        assert_eq!(
            header.to_json().unwrap(),
            br#"{"enc":"A128GCM","alg":"dir"}"#.to_vec()
        );
    }

    #[test]
    fn test_optional_members_kept() {
        let header = ProtectedHeader::from_json(
            br#"{"alg":"A128KW","enc":"A256GCM","kid":"k1","typ":"JWE","extra":true}"#,
        )
        .unwrap();
        assert_eq!(header.kid.as_deref(), Some("k1"));
        assert_eq!(header.typ.as_deref(), Some("JWE"));
    }

    #[test]
    fn test_not_json() {
        let err = ProtectedHeader::from_json(b"not json").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_not_an_object() {
        let err = ProtectedHeader::from_json(br#"["A128GCM","dir"]"#).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_missing_alg() {
        let err = ProtectedHeader::from_json(br#"{"enc":"A128GCM"}"#).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = ProtectedHeader::from_json(br#"{"enc":"A128GCM","alg":"RSA1_5"}"#).unwrap_err();
        assert!(matches!(err, UnsealError::Unsupported(_)));
    }

    #[test]
    fn test_zip_and_crit_refused() {
        let zip =
            ProtectedHeader::from_json(br#"{"enc":"A128GCM","alg":"dir","zip":"DEF"}"#).unwrap_err();
        assert!(matches!(zip, UnsealError::Unsupported(_)));

        let crit = ProtectedHeader::from_json(
            br#"{"enc":"A128GCM","alg":"dir","crit":["exp"],"exp":1}"#,
        )
        .unwrap_err();
        assert!(matches!(crit, UnsealError::Unsupported(_)));

        let empty_crit =
            ProtectedHeader::from_json(br#"{"enc":"A128GCM","alg":"dir","crit":[]}"#);
        assert!(empty_crit.is_ok());
    }
}
