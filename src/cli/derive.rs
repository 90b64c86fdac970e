//! Derive command
//!
//! Prints the shared key in the form other tools expect.

use clap::{Args, ValueEnum};

use super::credentials::KeyArgs;
use crate::config::Settings;
use crate::error::UnsealResult;

/// Output form for a derived key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KeyFormat {
    /// Unpadded base64url, the JWK `k` value
    #[default]
    Base64url,
    /// Lowercase hex, the stored master password hash
    Hex,
    /// Full symmetric JWK as JSON
    Jwk,
}

/// Arguments for `unseal derive`
#[derive(Args, Debug, Default, Clone)]
pub struct DeriveArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = KeyFormat::Base64url)]
    pub format: KeyFormat,

    #[command(flatten)]
    pub key: KeyArgs,
}

/// Handle `unseal derive`
pub fn handle_derive_command(settings: &Settings, args: &DeriveArgs) -> UnsealResult<()> {
    println!("{}", format_key(settings, args)?);
    Ok(())
}

/// Render the resolved key in the requested format
pub fn format_key(settings: &Settings, args: &DeriveArgs) -> UnsealResult<String> {
    let key = args.key.resolve(settings)?;

    Ok(match args.format {
        KeyFormat::Base64url => key.to_base64url(),
        KeyFormat::Hex => key.to_hex(),
        KeyFormat::Jwk => serde_json::to_string(&key.to_jwk())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(format: KeyFormat) -> DeriveArgs {
        DeriveArgs {
            format,
            key: KeyArgs {
                password: Some("Prappser2025".into()),
                ..KeyArgs::default()
            },
        }
    }

    #[test]
    fn test_formats() {
        let settings = Settings::default();
        assert_eq!(
            format_key(&settings, &args(KeyFormat::Base64url)).unwrap(),
            "CGyEZUf9ildQ-46nQMXmuw"
        );
        assert_eq!(
            format_key(&settings, &args(KeyFormat::Hex)).unwrap(),
            "086c846547fd8a5750fb8ea740c5e6bb"
        );
        assert_eq!(
            format_key(&settings, &args(KeyFormat::Jwk)).unwrap(),
            r#"{"kty":"oct","k":"CGyEZUf9ildQ-46nQMXmuw"}"#
        );
    }
}
