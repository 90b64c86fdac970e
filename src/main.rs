use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use unseal::cli::{
    handle_derive_command, handle_open_command, handle_seal_command, DeriveArgs, OpenArgs,
    SealArgs,
};
use unseal::config::{paths::UnsealPaths, settings::Settings};
use unseal::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "unseal",
    version,
    about = "Decrypt compact JWE tokens with a password-derived key",
    long_about = "unseal derives a 128-bit key from a master password (MD5 of the \
                  password) and uses it to decrypt compact JWE tokens.\n\n\
                  WARNING: MD5 is fast and unsalted. It is not a password-based key \
                  derivation function and is supported only to read existing tokens."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config directory (default: $XDG_CONFIG_HOME/unseal, env UNSEAL_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt a token and print its payload
    Open(OpenArgs),

    /// Print the key derived from the master password
    Derive(DeriveArgs),

    /// Seal a payload into a token
    Seal(SealArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match cli.config_dir {
        Some(dir) => UnsealPaths::with_base_dir(dir),
        None => UnsealPaths::new()?,
    };
    let mut settings = Settings::load(&paths)?;
    settings.apply_env_overrides();

    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    init_logging(level, cli.json_logs || settings.json_logs);
    debug!(config = %paths.settings_file().display(), "Settings loaded");

    match cli.command {
        Commands::Open(args) => handle_open_command(&settings, &args)?,
        Commands::Derive(args) => handle_derive_command(&settings, &args)?,
        Commands::Seal(args) => handle_seal_command(&settings, &args)?,
        Commands::Config => {
            println!("unseal Configuration");
            println!("====================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Initialized:      {}", paths.is_initialized());
            println!();
            println!("Settings:");
            println!("  Log level:       {}", settings.log_level);
            println!("  JSON logs:       {}", settings.json_logs);
            println!("  Token TTL:       {}s", settings.registration_token_ttl_sec);
            println!("  Key configured:  {}", settings.has_key_source());
        }
    }

    Ok(())
}
