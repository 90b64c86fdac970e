//! JWE compact serialization
//!
//! A compact token is five base64url segments joined by dots:
//! `header.encrypted_key.iv.ciphertext.tag`. The encoded header text itself
//! is the additional authenticated data, so it is kept verbatim alongside
//! the decoded form.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::{UnsealError, UnsealResult};

use super::header::ProtectedHeader;

/// Number of dot-separated segments in a compact token
pub const SEGMENT_COUNT: usize = 5;

/// A parsed compact-serialized JWE
#[derive(Debug, Clone)]
pub struct CompactEnvelope {
    encoded_header: String,
    header: ProtectedHeader,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

impl CompactEnvelope {
    /// Parse a compact token
    pub fn parse(token: &str) -> UnsealResult<Self> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(UnsealError::Parse(format!(
                "expected {} segments, found {}",
                SEGMENT_COUNT,
                segments.len()
            )));
        }

        let encoded_header = segments[0];
        if encoded_header.is_empty() {
            return Err(UnsealError::Parse("protected header is empty".into()));
        }

        let header_json = decode_segment("protected header", encoded_header)?;
        let header = ProtectedHeader::from_json(&header_json)?;

        Ok(Self {
            encoded_header: encoded_header.to_string(),
            header,
            encrypted_key: decode_segment("encrypted key", segments[1])?,
            iv: decode_segment("initialization vector", segments[2])?,
            ciphertext: decode_segment("ciphertext", segments[3])?,
            tag: decode_segment("authentication tag", segments[4])?,
        })
    }

    /// Assemble an envelope from freshly produced parts
    pub(crate) fn from_parts(
        header: ProtectedHeader,
        encrypted_key: Vec<u8>,
        iv: Vec<u8>,
        ciphertext: Vec<u8>,
        tag: Vec<u8>,
    ) -> UnsealResult<Self> {
        let encoded_header = URL_SAFE_NO_PAD.encode(header.to_json()?);
        Ok(Self {
            encoded_header,
            header,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        })
    }

    /// The decoded protected header
    pub fn header(&self) -> &ProtectedHeader {
        &self.header
    }

    /// Additional authenticated data: the ASCII bytes of the encoded header
    pub fn aad(&self) -> &[u8] {
        self.encoded_header.as_bytes()
    }

    /// The encrypted-key segment, empty for direct key management
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// The initialization vector
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// The ciphertext
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The authentication tag
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// Serialize back to the compact form
    pub fn serialize(&self) -> String {
        [
            self.encoded_header.clone(),
            URL_SAFE_NO_PAD.encode(&self.encrypted_key),
            URL_SAFE_NO_PAD.encode(&self.iv),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
            URL_SAFE_NO_PAD.encode(&self.tag),
        ]
        .join(".")
    }

    #[cfg(test)]
    pub(crate) fn parts_mut(&mut self) -> (&mut Vec<u8>, &mut Vec<u8>, &mut Vec<u8>, &mut Vec<u8>) {
        (
            &mut self.encrypted_key,
            &mut self.iv,
            &mut self.ciphertext,
            &mut self.tag,
        )
    }
}

impl FromStr for CompactEnvelope {
    type Err = UnsealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CompactEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

fn decode_segment(name: &str, segment: &str) -> UnsealResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| UnsealError::Parse(format!("invalid base64url in {}: {}", name, e)))
}
