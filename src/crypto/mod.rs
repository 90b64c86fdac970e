//! Cryptographic functions for unseal
//!
//! Password-based key derivation (MD5, for compatibility only) and JWE
//! compact-serialization decryption with AES-GCM.

pub mod algorithms;
pub mod encryption;
pub mod envelope;
pub mod header;
pub mod jwk;
pub mod key_derivation;
pub mod secure_memory;

pub use algorithms::{ContentEncryption, KeyManagement};
pub use encryption::{decrypt, decrypt_envelope, decrypt_string, encrypt, encrypt_string};
pub use envelope::CompactEnvelope;
pub use header::ProtectedHeader;
pub use jwk::OctetKey;
pub use key_derivation::{derive_key, DerivedKey, DERIVED_KEY_LEN};
pub use secure_memory::{SecureBytes, SecureString};
