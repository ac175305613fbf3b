//! wallet-signer CLI
//!
//! Runs signing requests against a wallet snapshot given as JSON, either from
//! a file or from stdin, and prints the `ApiResponse` JSON to stdout. Exits
//! non-zero when the request fails.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use wallet_signer::api;
use wallet_signer::config::SignerConfig;

#[derive(Parser)]
#[command(name = "wallet-signer")]
#[command(version)]
#[command(about = "Sign transactions for key, hardware and multisig accounts", long_about = None)]
struct Cli {
    /// JSON configuration file (debug_logging, report_errors)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a transaction on behalf of an account
    Sign {
        /// Request JSON file; stdin when omitted
        input: Option<PathBuf>,
    },

    /// Build an unsigned envelope for a multisig sender
    CreateMultisig {
        /// Request JSON file; stdin when omitted
        input: Option<PathBuf>,
    },

    /// Add one member's signature to an existing envelope
    Cosign {
        /// Request JSON file; stdin when omitted
        input: Option<PathBuf>,
    },
}

fn read_payload(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("reading stdin")?;
            Ok(buffer)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SignerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            SignerConfig::from_json(&json)?
        }
        None => SignerConfig::default(),
    }
    .with_env();

    if cli.debug {
        config.debug_logging = true;
    }
    config.apply();
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let response = match &cli.command {
        Commands::Sign { input } => api::sign_json(&read_payload(input.as_ref())?, &config).await,
        Commands::CreateMultisig { input } => api::create_multisig_json(&read_payload(input.as_ref())?, &config),
        Commands::Cosign { input } => api::cosign_json(&read_payload(input.as_ref())?, &config).await,
    };

    println!("{}", response.to_json());

    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
