//! Path management for unseal
//!
//! ## Path Resolution Order
//!
//! 1. `UNSEAL_CONFIG_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/unseal` or `~/.config/unseal`
//! 3. Windows: `%APPDATA%\unseal`

use std::path::PathBuf;

use crate::error::UnsealError;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "UNSEAL_CONFIG_DIR";

/// Manages all paths used by unseal
#[derive(Debug, Clone)]
pub struct UnsealPaths {
    base_dir: PathBuf,
}

impl UnsealPaths {
    /// Create a new UnsealPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, UnsealError> {
        let base_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create UnsealPaths with a custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/unseal/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, UnsealError> {
    default_path_from(|name| std::env::var(name).ok())
}

#[cfg(not(windows))]
fn default_path_from<F>(lookup: F) -> Result<PathBuf, UnsealError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_base = match lookup("XDG_CONFIG_HOME").filter(|xdg| !xdg.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => {
            let home = lookup("HOME").filter(|home| !home.is_empty()).ok_or_else(|| {
                UnsealError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("unseal"))
}

#[cfg(windows)]
fn default_path_from<F>(lookup: F) -> Result<PathBuf, UnsealError>
where
    F: Fn(&str) -> Option<String>,
{
    let appdata = lookup("APPDATA")
        .filter(|appdata| !appdata.is_empty())
        .ok_or_else(|| UnsealError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("unseal"))
}
