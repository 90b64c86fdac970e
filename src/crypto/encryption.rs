//! JWE decryption and encryption with AES-GCM
//!
//! Decryption either fully succeeds and returns the plaintext, or fails
//! without exposing any of it. The ciphertext and tag are handed to the AEAD
//! together, so no plaintext byte exists until the tag has been verified.

use aes::Aes192;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, Nonce, OsRng, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use aes_kw::{KekAes128, KekAes192, KekAes256};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tracing::{debug, warn};

use crate::error::{UnsealError, UnsealResult};

use super::algorithms::{ContentEncryption, KeyManagement};
use super::envelope::CompactEnvelope;
use super::header::ProtectedHeader;
use super::jwk::OctetKey;
use super::secure_memory::SecureBytes;

/// AES-GCM with a 192-bit key and the standard 96-bit nonce
type Aes192Gcm = AesGcm<Aes192, U12>;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

/// Overhead added by AES key wrap (one 64-bit integrity block)
const KEY_WRAP_OVERHEAD: usize = 8;

/// Decrypt a compact token
pub fn decrypt(token: &str, key: &OctetKey) -> UnsealResult<Vec<u8>> {
    let envelope = CompactEnvelope::parse(token)?;
    decrypt_envelope(&envelope, key)
}

/// Decrypt an already parsed envelope
pub fn decrypt_envelope(envelope: &CompactEnvelope, key: &OctetKey) -> UnsealResult<Vec<u8>> {
    let header = envelope.header();
    debug!(
        alg = %header.alg,
        enc = %header.enc,
        ciphertext_len = envelope.ciphertext().len(),
        "Decrypting envelope"
    );

    if envelope.iv().len() != NONCE_SIZE {
        return Err(UnsealError::Parse(format!(
            "invalid initialization vector size: expected {}, got {}",
            NONCE_SIZE,
            envelope.iv().len()
        )));
    }

    // A key failure still runs the AEAD under a zero key of the right size,
    // so it costs the same as a tag failure
    let resolved = key
        .decode()
        .and_then(|shared| resolve_content_key(header, envelope.encrypted_key(), &shared));
    let (content_key, key_error) = match resolved {
        Ok(content_key) => (content_key, None),
        Err(err) => (SecureBytes::zeroed(header.enc.key_len()), Some(err)),
    };

    let mut sealed = Vec::with_capacity(envelope.ciphertext().len() + envelope.tag().len());
    sealed.extend_from_slice(envelope.ciphertext());
    sealed.extend_from_slice(envelope.tag());

    let payload = Payload {
        msg: &sealed,
        aad: envelope.aad(),
    };

    let opened = match header.enc {
        ContentEncryption::A128Gcm => open::<Aes128Gcm>(&content_key, envelope.iv(), payload),
        ContentEncryption::A192Gcm => open::<Aes192Gcm>(&content_key, envelope.iv(), payload),
        ContentEncryption::A256Gcm => open::<Aes256Gcm>(&content_key, envelope.iv(), payload),
    };

    if let Some(err) = key_error {
        return Err(err);
    }
    if envelope.tag().len() != TAG_SIZE {
        return Err(UnsealError::Integrity);
    }

    opened
}

/// Decrypt a compact token whose payload is UTF-8 text
pub fn decrypt_string(token: &str, key: &OctetKey) -> UnsealResult<String> {
    let plaintext = decrypt(token, key)?;
    String::from_utf8(plaintext)
        .map_err(|e| UnsealError::Claims(format!("Invalid UTF-8 in decrypted data: {}", e)))
}

/// Encrypt plaintext into a compact token
///
/// Generates a random nonce for every call, and a random content key when
/// `alg` wraps keys.
pub fn encrypt(
    plaintext: &[u8],
    key: &OctetKey,
    alg: KeyManagement,
    enc: ContentEncryption,
) -> UnsealResult<String> {
    let shared = key.decode()?;

    let (content_key, encrypted_key) = match alg {
        KeyManagement::Direct => (shared.clone(), Vec::new()),
        _ => {
            let mut cek = SecureBytes::zeroed(enc.key_len());
            OsRng.fill_bytes(cek.as_bytes_mut());
            let wrapped = wrap_key(alg, &shared, &cek)?;
            (cek, wrapped)
        }
    };

    if content_key.len() != enc.key_len() {
        return Err(key_size_error(enc.key_len(), enc));
    }

    let header = ProtectedHeader::new(alg, enc);
    let aad = URL_SAFE_NO_PAD.encode(header.to_json()?);

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let payload = Payload {
        msg: plaintext,
        aad: aad.as_bytes(),
    };

    let mut sealed = match enc {
        ContentEncryption::A128Gcm => seal::<Aes128Gcm>(&content_key, &nonce, payload)?,
        ContentEncryption::A192Gcm => seal::<Aes192Gcm>(&content_key, &nonce, payload)?,
        ContentEncryption::A256Gcm => seal::<Aes256Gcm>(&content_key, &nonce, payload)?,
    };
    let tag = sealed.split_off(sealed.len() - TAG_SIZE);

    let envelope =
        CompactEnvelope::from_parts(header, encrypted_key, nonce.to_vec(), sealed, tag)?;
    Ok(envelope.serialize())
}

/// Encrypt a string into a compact token
pub fn encrypt_string(
    plaintext: &str,
    key: &OctetKey,
    alg: KeyManagement,
    enc: ContentEncryption,
) -> UnsealResult<String> {
    encrypt(plaintext.as_bytes(), key, alg, enc)
}

/// Work out the content-encryption key for an envelope
fn resolve_content_key(
    header: &ProtectedHeader,
    encrypted_key: &[u8],
    shared: &SecureBytes,
) -> UnsealResult<SecureBytes> {
    let content_key = match header.alg {
        KeyManagement::Direct => {
            if !encrypted_key.is_empty() {
                warn!(
                    len = encrypted_key.len(),
                    "Ignoring encrypted key segment on a direct-key envelope"
                );
            }
            shared.clone()
        }
        alg => unwrap_key(alg, shared, encrypted_key)?,
    };

    if content_key.len() != header.enc.key_len() {
        return Err(UnsealError::Key);
    }

    Ok(content_key)
}

fn unwrap_key(alg: KeyManagement, kek: &[u8], wrapped: &[u8]) -> UnsealResult<SecureBytes> {
    if Some(kek.len()) != alg.wrapping_key_len() {
        return Err(UnsealError::Key);
    }
    if wrapped.len() < 2 * KEY_WRAP_OVERHEAD || wrapped.len() % KEY_WRAP_OVERHEAD != 0 {
        return Err(UnsealError::Key);
    }

    let mut out = SecureBytes::zeroed(wrapped.len() - KEY_WRAP_OVERHEAD);
    let result = match alg {
        KeyManagement::A128Kw => {
            KekAes128::from(to_array::<16>(kek)?).unwrap(wrapped, out.as_bytes_mut())
        }
        KeyManagement::A192Kw => {
            KekAes192::from(to_array::<24>(kek)?).unwrap(wrapped, out.as_bytes_mut())
        }
        KeyManagement::A256Kw => {
            KekAes256::from(to_array::<32>(kek)?).unwrap(wrapped, out.as_bytes_mut())
        }
        KeyManagement::Direct => return Err(UnsealError::Key),
    };

    result.map_err(|_| UnsealError::Key)?;
    Ok(out)
}

fn wrap_key(alg: KeyManagement, kek: &[u8], cek: &[u8]) -> UnsealResult<Vec<u8>> {
    let Some(kek_len) = alg.wrapping_key_len() else {
        return Err(UnsealError::Encryption(format!("{} does not wrap keys", alg)));
    };
    if kek.len() != kek_len {
        return Err(key_size_error(kek_len, alg));
    }

    let mut out = vec![0u8; cek.len() + KEY_WRAP_OVERHEAD];
    let result = match alg {
        KeyManagement::A128Kw => KekAes128::from(to_array::<16>(kek)?).wrap(cek, &mut out),
        KeyManagement::A192Kw => KekAes192::from(to_array::<24>(kek)?).wrap(cek, &mut out),
        KeyManagement::A256Kw => KekAes256::from(to_array::<32>(kek)?).wrap(cek, &mut out),
        KeyManagement::Direct => {
            return Err(UnsealError::Encryption(format!("{} does not wrap keys", alg)))
        }
    };

    result.map_err(|e| UnsealError::Encryption(format!("Key wrap failed: {}", e)))?;
    Ok(out)
}

fn key_size_error(expected: usize, alg: impl std::fmt::Display) -> UnsealError {
    UnsealError::Encryption(format!("key must be {} bytes for {}", expected, alg))
}

fn to_array<const N: usize>(bytes: &[u8]) -> UnsealResult<[u8; N]> {
    bytes.try_into().map_err(|_| UnsealError::Key)
}

#[cfg(test)]
thread_local! {
    static AEAD_OPENS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

fn open<C: Aead + KeyInit>(
    key: &[u8],
    iv: &[u8],
    payload: Payload<'_, '_>,
) -> UnsealResult<Vec<u8>> {
    #[cfg(test)]
    AEAD_OPENS.with(|count| count.set(count.get() + 1));

    let cipher = C::new_from_slice(key).map_err(|_| UnsealError::Key)?;
    cipher
        .decrypt(Nonce::<C>::from_slice(iv), payload)
        .map_err(|_| UnsealError::Integrity)
}

fn seal<C: Aead + KeyInit>(
    key: &[u8],
    iv: &[u8],
    payload: Payload<'_, '_>,
) -> UnsealResult<Vec<u8>> {
    let cipher = C::new_from_slice(key)
        .map_err(|_| UnsealError::Encryption("invalid content key length".into()))?;
    cipher
        .encrypt(Nonce::<C>::from_slice(iv), payload)
        .map_err(|e| UnsealError::Encryption(format!("Encryption failed: {}", e)))
}
