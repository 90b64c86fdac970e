//! User settings for unseal
//!
//! The settings file may hold the master password (or only its hex digest),
//! the registration token lifetime, and logging preferences. `MASTER_PASSWORD`
//! and `REGISTRATION_TOKEN_TTL_SEC` in the environment win over the file.

use std::fmt;

use serde::Deserialize;

use super::paths::UnsealPaths;
use crate::claims::DEFAULT_REGISTRATION_TTL_SECS;
use crate::crypto::{derive_key, DerivedKey};
use crate::error::UnsealError;

/// Environment variable holding the master password
pub const MASTER_PASSWORD_ENV: &str = "MASTER_PASSWORD";

/// Environment variable holding the registration token lifetime in seconds
pub const REGISTRATION_TTL_ENV: &str = "REGISTRATION_TOKEN_TTL_SEC";

/// User settings for unseal
#[derive(Clone, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Plain master password
    #[serde(default)]
    pub master_password: Option<String>,

    /// Hex MD5 digest of the master password
    #[serde(default)]
    pub master_password_md5_hash: Option<String>,

    /// How long a registration token stays valid after its `iat`
    #[serde(default = "default_registration_ttl")]
    pub registration_token_ttl_sec: u32,

    /// Default log filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_registration_ttl() -> u32 {
    DEFAULT_REGISTRATION_TTL_SECS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            master_password: None,
            master_password_md5_hash: None,
            registration_token_ttl_sec: default_registration_ttl(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load(paths: &UnsealPaths) -> Result<Self, UnsealError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| UnsealError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| UnsealError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(MASTER_PASSWORD_ENV).filter(|p| !p.is_empty()) {
            self.master_password_md5_hash = Some(derive_key(&password).to_hex());
            self.master_password = Some(password);
        }

        // Unparseable values are ignored
        if let Some(ttl) = lookup(REGISTRATION_TTL_ENV).and_then(|v| v.trim().parse().ok()) {
            self.registration_token_ttl_sec = ttl;
        }
    }

    /// Resolve the shared key from the configured password or digest
    pub fn resolve_key(&self) -> Result<DerivedKey, UnsealError> {
        if let Some(password) = self.master_password.as_deref() {
            return Ok(derive_key(password));
        }

        match self.master_password_md5_hash.as_deref() {
            Some(hash) if !hash.is_empty() => DerivedKey::from_hex(hash).map_err(|_| {
                UnsealError::Config("master_password_md5_hash must be 32 hex digits".into())
            }),
            _ => Err(UnsealError::Config(format!(
                "{} environment variable is required",
                MASTER_PASSWORD_ENV
            ))),
        }
    }

    /// Check if any key source is configured
    pub fn has_key_source(&self) -> bool {
        self.master_password.is_some()
            || self
                .master_password_md5_hash
                .as_deref()
                .is_some_and(|h| !h.is_empty())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("schema_version", &self.schema_version)
            .field("has_master_password", &self.master_password.is_some())
            .field(
                "has_master_password_md5_hash",
                &self.master_password_md5_hash.is_some(),
            )
            .field(
                "registration_token_ttl_sec",
                &self.registration_token_ttl_sec,
            )
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.registration_token_ttl_sec, 10);
        assert!(!settings.json_logs);
        assert!(!settings.has_key_source());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UnsealPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{
                "master_password_md5_hash": "086c846547fd8a5750fb8ea740c5e6bb",
                "registration_token_ttl_sec": 30,
                "log_level": "debug"
            }"#,
        )
        .unwrap();

        let loaded = Settings::load(&paths).unwrap();
        assert_eq!(loaded.log_level, "debug");
        assert_eq!(loaded.registration_token_ttl_sec, 30);
        assert_eq!(loaded.master_password, None);
        assert_eq!(
            loaded.resolve_key().unwrap().to_base64url(),
            "CGyEZUf9ildQ-46nQMXmuw"
        );
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UnsealPaths::with_base_dir(temp_dir.path().join("missing"));
        let settings = Settings::load(&paths).unwrap();
        assert_eq!(settings.schema_version, 1);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UnsealPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "{ not json").unwrap();

        let err = Settings::load(&paths).unwrap_err();
        assert!(matches!(err, UnsealError::Config(_)));
    }

    #[test]
    fn test_env_password_overrides_file() {
        let mut settings = Settings {
            master_password: Some("from-file".into()),
            ..Settings::default()
        };

        settings.apply_overrides_from(|name| {
            (name == MASTER_PASSWORD_ENV).then(|| "Prappser2025".to_string())
        });

        assert_eq!(settings.master_password.as_deref(), Some("Prappser2025"));
        assert_eq!(
            settings.master_password_md5_hash.as_deref(),
            Some("086c846547fd8a5750fb8ea740c5e6bb")
        );
    }

    #[test]
    fn test_env_registration_ttl() {
        let mut settings = Settings::default();
        settings.apply_overrides_from(|name| (name == REGISTRATION_TTL_ENV).then(|| "45".to_string()));
        assert_eq!(settings.registration_token_ttl_sec, 45);

        settings.apply_overrides_from(|name| {
            (name == REGISTRATION_TTL_ENV).then(|| "soon".to_string())
        });
        assert_eq!(settings.registration_token_ttl_sec, 45);
    }

    #[test]
    fn test_empty_env_password_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides_from(|_| Some(String::new()));
        assert!(!settings.has_key_source());
    }

    #[test]
    fn test_password_preferred_over_hash() {
        let settings = Settings {
            master_password: Some("Prappser2025".into()),
            master_password_md5_hash: Some("00000000000000000000000000000000".into()),
            ..Settings::default()
        };
        assert_eq!(
            settings.resolve_key().unwrap().to_hex(),
            "086c846547fd8a5750fb8ea740c5e6bb"
        );
    }

    #[test]
    fn test_missing_key_source() {
        let err = Settings::default().resolve_key().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: MASTER_PASSWORD environment variable is required"
        );
    }

    #[test]
    fn test_bad_hash_is_config_error() {
        let settings = Settings {
            master_password_md5_hash: Some("xyz".into()),
            ..Settings::default()
        };
        assert!(matches!(settings.resolve_key(), Err(UnsealError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings = Settings {
            master_password: Some("hunter2".into()),
            ..Settings::default()
        };
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
