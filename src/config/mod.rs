//! Configuration module for unseal
//!
//! This module provides configuration management including:
//! - Config directory resolution
//! - Settings file persistence and environment overrides

pub mod paths;
pub mod settings;

pub use paths::UnsealPaths;
pub use settings::Settings;
