//! Business Partner lookup
//!
//! Entry point for the `bp-lookup` binary.
//! Fetches an OData session, then queries business partners by identity.

use bp_identity_lookup::auth::{load_identity, BasicCredentials};
use bp_identity_lookup::cli::Cli;
use bp_identity_lookup::config::{self, Config};
use bp_identity_lookup::lookup::{report_error, run_lookup};
use bp_identity_lookup::odata::ODataClient;
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries progress and the response
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    config::load_dotenv();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let identity = match load_identity(&config.pfx_path, &config.pfx_passphrase) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!("{}", e);
            eprintln!(
                "Error reading the PFX file at path: {}",
                e.bundle_path().display()
            );
            std::process::exit(1);
        }
    };

    let credentials = BasicCredentials::new(config.username.clone(), config.password.clone());
    let client = match ODataClient::new(
        config.csrf_fetch_url.clone(),
        config.api_base_url.clone(),
        &credentials,
        Some(identity),
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(e) = run_lookup(&client, &cli.query(), cli.options(), &mut stdout).await {
        tracing::debug!("Lookup failed ({:?}): {}", e.kind(), e);
        report_error(&e, &mut io::stderr().lock())?;
    }

    Ok(())
}
