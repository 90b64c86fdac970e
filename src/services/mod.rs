//! Service layer for unseal
//!
//! Ties key derivation, envelope decryption and claims parsing together for
//! callers that just want the payload.

pub mod unseal;

pub use unseal::{unseal, UnsealService};
