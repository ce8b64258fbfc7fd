//! # git-slacker Service
//!
//! Binary entry point for the git-slacker relay.
//!
//! This executable:
//! - Parses the command line and loads configuration from files and environment
//! - Initializes structured logging
//! - Builds the HTTP chat transport and wires the relay
//! - Starts the HTTP server from git-slacker-api

mod chat_client;
mod settings;

use anyhow::Context;
use chat_client::HttpChatTransport;
use clap::Parser;
use git_slacker_api::{build_state, start_server, ServiceError};
use settings::{init_tracing, load_service_config, missing_secrets, Cli};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = load_service_config(cli.config.as_deref());
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting git-slacker");

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Failed to load configuration; aborting");
            std::process::exit(3);
        }
    };

    let secrets = cli.secrets.into_secrets();
    for name in missing_secrets(&secrets) {
        warn!(secret = name, "Secret is not set; the matching integration will reject requests");
    }

    let transport = HttpChatTransport::new(&service_config.chat, &secrets)
        .context("Failed to build the chat HTTP client")?;

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        "Starting HTTP server"
    );

    let state = build_state(service_config, &secrets, Arc::new(transport)).await;

    if let Err(e) = start_server(state).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
