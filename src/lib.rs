//! unseal - decrypt compact JWE tokens with a password-derived key
//!
//! The shared key is the MD5 digest of a master password, handed to the
//! decryptor as an `oct` JWK. Tokens are JWE compact serializations using
//! direct key agreement (`dir`) or AES key wrap, with AES-GCM content
//! encryption.
//!
//! **Security note:** MD5 is a fast, unsalted digest and not a password KDF.
//! The derivation is reproduced only so existing tokens can be read. Do not
//! use it to protect anything new.
//!
//! # Architecture
//!
//! - `crypto`: key derivation, JWK handling, envelope parsing and AES-GCM
//! - `claims`: `Authorization` header, registration payload, and EdDSA
//!   registration token verification
//! - `services`: one-stop [`UnsealService`]
//! - `config`: config directory and settings
//! - `cli`: command handlers for the `unseal` binary
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use unseal::crypto::{decrypt_string, derive_key};
//!
//! let key = derive_key("Prappser2025").to_jwk();
//! let payload = decrypt_string(token, &key)?;
//! ```

pub mod claims;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod services;

pub use error::{UnsealError, UnsealResult};
pub use services::{unseal, UnsealService};
