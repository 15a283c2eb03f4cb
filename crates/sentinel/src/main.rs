// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SentinelCloud - secret vault and access gate.
//!
//! This is the binary entry point for the credential service.

mod serve;
mod tools;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use sentinel_config::{ConfigError, SentinelConfig};

/// SentinelCloud - secret vault and access gate.
#[derive(Parser, Debug)]
#[command(name = "sentinel", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file (plus environment) instead of the
    /// standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Print a fresh master key and token signing secret.
    Keygen,
    /// Encrypt a secret with the configured master key.
    Encrypt {
        /// Secret to encrypt. Prompted for when omitted.
        #[arg(long)]
        secret: Option<String>,
    },
    /// Decrypt a vault payload with the configured master key.
    Decrypt {
        /// Payload produced by `encrypt`.
        payload: String,
    },
    /// Prompt for a password and print its Argon2id hash.
    HashPassword,
}

fn load_config(path: Option<&Path>) -> Result<SentinelConfig, Vec<ConfigError>> {
    match path {
        Some(path) => sentinel_config::load_and_validate_path(path),
        None => sentinel_config::load_and_validate(),
    }
}

/// Dispatch a command that needs validated configuration.
async fn run_with_config(
    command: Commands,
    config: SentinelConfig,
) -> Result<(), sentinel_core::SentinelError> {
    match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Keygen => tools::run_keygen(),
        Commands::Encrypt { secret } => tools::run_encrypt(&config, secret),
        Commands::Decrypt { payload } => tools::run_decrypt(&config, &payload),
        Commands::HashPassword => tools::run_hash_password(&config),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Key generation must work before any configuration exists.
    let result = if matches!(cli.command, Commands::Keygen) {
        tools::run_keygen()
    } else {
        let config = match load_config(cli.config.as_deref()) {
            Ok(config) => config,
            Err(errors) => {
                sentinel_config::render_errors(&errors);
                std::process::exit(1);
            }
        };
        run_with_config(cli.command, config).await
    };

    if let Err(e) = result {
        if e.is_fatal() {
            eprintln!("sentinel: refusing to start: {e}");
        } else {
            eprintln!("sentinel: {e}");
        }
        std::process::exit(1);
    }
}
