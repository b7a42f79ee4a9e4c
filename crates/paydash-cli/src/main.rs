//! Paydash CLI - terminal front end for the payments dashboard
//!
//! Settings, API keys, treasury and transactions for one or more profiles,
//! with the session kept in the OS keychain.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::Context;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::keys::run_keys;
use crate::commands::payments::run_payments;
use crate::commands::settings::run_settings;
use crate::commands::transactions::run_transactions;
use crate::commands::treasury::run_treasury;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        if error.needs_sign_in() {
            eprintln!("Run `paydash auth login --email <email>` to sign in again.");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Auth { command } => run_auth(command, profile, cli.api_url).await?,
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Settings { command } => {
            run_settings(command, Context::load(profile, cli.api_url)?).await?;
        }
        Commands::Keys { command } => {
            run_keys(command, Context::load(profile, cli.api_url)?).await?;
        }
        Commands::Treasury { json } => {
            run_treasury(json, Context::load(profile, cli.api_url)?).await?;
        }
        Commands::Transactions { command } => {
            run_transactions(command, Context::load(profile, cli.api_url)?).await?;
        }
        Commands::Payments { command } => {
            run_payments(command, Context::load(profile, cli.api_url)?).await?;
        }
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        if let Ok(directive) = "paydash=info".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
