//! Open command
//!
//! Decrypts a token and prints its payload. Nothing is written to stdout
//! unless decryption (and verification, with `--verify`) fully succeeded.

use std::io::Read;

use clap::Args;
use tracing::info;

use super::credentials::KeyArgs;
use crate::claims::extract_bearer_token;
use crate::config::Settings;
use crate::error::{UnsealError, UnsealResult};
use crate::services::UnsealService;

/// Arguments for `unseal open`
#[derive(Args, Debug, Default, Clone)]
pub struct OpenArgs {
    /// Compact JWE token; read from stdin when omitted or "-"
    pub token: Option<String>,

    /// Full Authorization header value ("Bearer <token>")
    #[arg(long, conflicts_with = "token")]
    pub authorization: Option<String>,

    /// Print only the `jws` member of the decrypted payload, unverified
    #[arg(long)]
    pub claims: bool,

    /// Verify the inner EdDSA registration token and print its claims as JSON
    #[arg(long, conflicts_with = "claims")]
    pub verify: bool,

    /// Registration token lifetime in seconds (overrides the settings)
    #[arg(long, value_name = "SECS", requires = "verify")]
    pub ttl: Option<u32>,

    #[command(flatten)]
    pub key: KeyArgs,
}

/// Handle `unseal open`
pub fn handle_open_command(settings: &Settings, args: &OpenArgs) -> UnsealResult<()> {
    let output = open_token(settings, args, std::io::stdin().lock())?;
    println!("{}", output);
    Ok(())
}

/// Decrypt the token named by `args`, reading it from `input` when needed
pub fn open_token<R: Read>(settings: &Settings, args: &OpenArgs, input: R) -> UnsealResult<String> {
    let service = UnsealService::new(&args.key.resolve(settings)?);

    let token = match (args.authorization.as_deref(), args.token.as_deref()) {
        (Some(header), _) => extract_bearer_token(header.trim())?.to_string(),
        (None, Some(token)) if token != "-" => token.to_string(),
        _ => read_input(input)?,
    };
    let token = token.trim();

    let output = if args.verify {
        let ttl = args.ttl.unwrap_or(settings.registration_token_ttl_sec);
        serde_json::to_string(&service.open_verified(token, ttl)?)?
    } else if args.claims {
        service.open_claims(token)?.jws
    } else {
        service.open_string(token)?
    };

    info!(claims = args.claims, verify = args.verify, "Token opened");
    Ok(output)
}

fn read_input<R: Read>(mut input: R) -> UnsealResult<String> {
    let mut buf = String::new();
    input
        .read_to_string(&mut buf)
        .map_err(|e| UnsealError::Io(format!("Failed to read token from stdin: {}", e)))?;
    Ok(buf)
}
