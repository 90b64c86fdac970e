//! Seal command
//!
//! Produces a compact token under the same key, mainly for building test
//! fixtures.

use std::io::Read;

use clap::Args;

use super::credentials::KeyArgs;
use crate::config::Settings;
use crate::crypto::{encrypt, ContentEncryption, KeyManagement};
use crate::error::{UnsealError, UnsealResult};

/// Arguments for `unseal seal`
#[derive(Args, Debug, Clone)]
pub struct SealArgs {
    /// Text to seal; read from stdin when omitted
    pub plaintext: Option<String>,

    /// Key-management algorithm (dir, A128KW, A192KW, A256KW)
    #[arg(long, default_value = "dir")]
    pub alg: String,

    /// Content-encryption algorithm (A128GCM, A192GCM, A256GCM)
    #[arg(long, default_value = "A128GCM")]
    pub enc: String,

    #[command(flatten)]
    pub key: KeyArgs,
}

/// Handle `unseal seal`
pub fn handle_seal_command(settings: &Settings, args: &SealArgs) -> UnsealResult<()> {
    println!("{}", seal_input(settings, args, std::io::stdin().lock())?);
    Ok(())
}

/// Seal the plaintext named by `args`, reading it from `input` when needed
pub fn seal_input<R: Read>(settings: &Settings, args: &SealArgs, mut input: R) -> UnsealResult<String> {
    let alg: KeyManagement = args.alg.parse()?;
    let enc: ContentEncryption = args.enc.parse()?;
    let key = args.key.resolve(settings)?;

    let plaintext = match args.plaintext.as_deref() {
        Some(text) => text.as_bytes().to_vec(),
        None => {
            let mut buf = Vec::new();
            input
                .read_to_end(&mut buf)
                .map_err(|e| UnsealError::Io(format!("Failed to read plaintext: {}", e)))?;
            buf
        }
    };

    encrypt(&plaintext, &key.to_jwk(), alg, enc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::unseal;

    fn args(alg: &str, enc: &str) -> SealArgs {
        SealArgs {
            plaintext: Some(r#"{"jws":"x.y.z"}"#.into()),
            alg: alg.into(),
            enc: enc.into(),
            key: KeyArgs {
                password: Some("Prappser2025".into()),
                ..KeyArgs::default()
            },
        }
    }

    #[test]
    fn test_seal_then_unseal() {
        let settings = Settings::default();
        for (alg, enc) in [("dir", "A128GCM"), ("A128KW", "A128GCM"), ("A128KW", "A256GCM")] {
            let token = seal_input(&settings, &args(alg, enc), std::io::empty()).unwrap();
            assert_eq!(unseal("Prappser2025", &token).unwrap(), r#"{"jws":"x.y.z"}"#);
        }
    }

    #[test]
    fn test_seal_from_input() {
        let mut args = args("dir", "A128GCM");
        args.plaintext = None;
        let token = seal_input(&Settings::default(), &args, &b"from stdin"[..]).unwrap();
        assert_eq!(unseal("Prappser2025", &token).unwrap(), "from stdin");
    }

    #[test]
    fn test_seal_rejects_unknown_algorithms() {
        let err = seal_input(&Settings::default(), &args("RSA-OAEP", "A128GCM"), std::io::empty())
            .unwrap_err();
        assert!(matches!(err, UnsealError::Unsupported(_)));
    }

    #[test]
    fn test_direct_needs_matching_key_size() {
        // The derived key is 128 bits, too short for A256GCM under `dir`
        let err = seal_input(&Settings::default(), &args("dir", "A256GCM"), std::io::empty())
            .unwrap_err();
        assert!(matches!(err, UnsealError::Encryption(_)));
        assert_eq!(err.to_string(), "Encryption error: key must be 32 bytes for A256GCM");

        let err = seal_input(&Settings::default(), &args("A256KW", "A128GCM"), std::io::empty())
            .unwrap_err();
        assert_eq!(err.to_string(), "Encryption error: key must be 32 bytes for A256KW");
    }
}
