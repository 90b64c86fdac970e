//! Key source options shared by the CLI commands
//!
//! Precedence: `--prompt`, then `--password`, then `--key-hex`, then the
//! settings (where `MASTER_PASSWORD` already overrides the file).

use clap::Args;

use crate::config::Settings;
use crate::crypto::{derive_key, DerivedKey, SecureString};
use crate::error::{UnsealError, UnsealResult};

/// Where the shared key comes from
#[derive(Args, Debug, Default, Clone)]
pub struct KeyArgs {
    /// Master password the token was sealed with
    #[arg(short, long)]
    pub password: Option<String>,

    /// Hex MD5 digest of the master password (32 hex digits)
    #[arg(long, value_name = "HEX")]
    pub key_hex: Option<String>,

    /// Read the master password from the terminal without echo
    #[arg(long)]
    pub prompt: bool,
}

impl KeyArgs {
    /// Resolve the shared key
    pub fn resolve(&self, settings: &Settings) -> UnsealResult<DerivedKey> {
        if self.prompt {
            let password = prompt_password("Master password: ")?;
            return Ok(derive_key(&password));
        }

        if let Some(password) = self.password.as_deref() {
            return Ok(derive_key(password));
        }

        if let Some(hash) = self.key_hex.as_deref() {
            return DerivedKey::from_hex(hash)
                .map_err(|_| UnsealError::Config("--key-hex must be 32 hex digits".into()));
        }

        settings.resolve_key()
    }
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> UnsealResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| UnsealError::Io(format!("Failed to read password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_wins_over_settings() {
        let args = KeyArgs {
            password: Some("Prappser2025".into()),
            ..KeyArgs::default()
        };
        let settings = Settings {
            master_password: Some("other".into()),
            ..Settings::default()
        };
        assert_eq!(
            args.resolve(&settings).unwrap().to_hex(),
            "086c846547fd8a5750fb8ea740c5e6bb"
        );
    }

    #[test]
    fn test_key_hex() {
        let args = KeyArgs {
            key_hex: Some("086c846547fd8a5750fb8ea740c5e6bb".into()),
            ..KeyArgs::default()
        };
        assert_eq!(
            args.resolve(&Settings::default()).unwrap().to_base64url(),
            "CGyEZUf9ildQ-46nQMXmuw"
        );

        let bad = KeyArgs {
            key_hex: Some("nothex".into()),
            ..KeyArgs::default()
        };
        assert!(matches!(
            bad.resolve(&Settings::default()),
            Err(UnsealError::Config(_))
        ));
    }

    #[test]
    fn test_falls_back_to_settings() {
        let settings = Settings {
            master_password: Some("Prappser2025".into()),
            ..Settings::default()
        };
        assert_eq!(
            KeyArgs::default().resolve(&settings).unwrap().to_hex(),
            "086c846547fd8a5750fb8ea740c5e6bb"
        );

        assert!(KeyArgs::default().resolve(&Settings::default()).is_err());
    }
}
