//! CLI command handlers
//!
//! This module bridges clap argument parsing with the service layer.

pub mod credentials;
pub mod derive;
pub mod open;
pub mod seal;

pub use credentials::KeyArgs;
pub use derive::{handle_derive_command, DeriveArgs, KeyFormat};
pub use open::{handle_open_command, OpenArgs};
pub use seal::{handle_seal_command, SealArgs};
