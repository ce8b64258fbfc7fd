//! Command line, configuration and secret loading.
//!
//! Configuration sources, later ones overriding earlier ones:
//!  1. `/etc/git-slacker/service.yaml`: system-wide defaults
//!  2. `./config/service.yaml`: deployment-local override
//!  3. `--config <path>` or `GIT_SLACKER_CONFIG`: operator-specified file
//!  4. Environment variables prefixed `GS__` with `__` separators,
//!     e.g. `GS__SERVER__PORT=9090` sets `server.port`
//!
//! Absent files fall back to built-in defaults. A malformed file or a value
//! that cannot be coerced to its field type is a hard error.
//!
//! Secrets never come from files; they are read from their own environment
//! variables (or the matching hidden flags).

use anyhow::Context;
use clap::{Args, Parser};
use git_slacker_api::config::LoggingConfig;
use git_slacker_api::ServiceConfig;
use git_slacker_core::{SecretValue, Secrets};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Relay GitHub, Slack and Telegram webhooks
#[derive(Debug, Parser)]
#[command(name = "git-slacker", version, about)]
pub struct Cli {
    /// Additional YAML configuration file
    #[arg(long, short, env = "GIT_SLACKER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub secrets: SecretArgs,
}

/// Webhook and bot credentials
#[derive(Args)]
pub struct SecretArgs {
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide = true, hide_env_values = true, default_value = "")]
    github_webhook_secret: String,

    #[arg(long, env = "SLACK_WEBHOOK_TOKEN", hide = true, hide_env_values = true, default_value = "")]
    slack_webhook_token: String,

    #[arg(long, env = "TELEGRAM_WEBHOOK_TOKEN", hide = true, hide_env_values = true, default_value = "")]
    telegram_webhook_token: String,

    #[arg(long, env = "SLACK_BOT_TOKEN", hide = true, hide_env_values = true, default_value = "")]
    slack_bot_token: String,

    #[arg(long, env = "TELEGRAM_TOKEN", hide = true, hide_env_values = true, default_value = "")]
    telegram_token: String,
}

impl SecretArgs {
    pub fn into_secrets(self) -> Secrets {
        Secrets {
            github_webhook_secret: SecretValue::from_string(self.github_webhook_secret),
            slack_webhook_token: SecretValue::from_string(self.slack_webhook_token),
            telegram_webhook_token: SecretValue::from_string(self.telegram_webhook_token),
            slack_bot_token: SecretValue::from_string(self.slack_bot_token),
            telegram_token: SecretValue::from_string(self.telegram_token),
        }
    }
}

impl std::fmt::Debug for SecretArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretArgs").finish_non_exhaustive()
    }
}

/// Names of secrets that are unset, for startup warnings
pub fn missing_secrets(secrets: &Secrets) -> Vec<&'static str> {
    [
        ("GITHUB_WEBHOOK_SECRET", &secrets.github_webhook_secret),
        ("SLACK_WEBHOOK_TOKEN", &secrets.slack_webhook_token),
        ("TELEGRAM_WEBHOOK_TOKEN", &secrets.telegram_webhook_token),
        ("SLACK_BOT_TOKEN", &secrets.slack_bot_token),
        ("TELEGRAM_TOKEN", &secrets.telegram_token),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect()
}

/// Load and validate the service configuration.
pub fn load_service_config(explicit_path: Option<&Path>) -> anyhow::Result<ServiceConfig> {
    let mut builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/git-slacker/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    if let Some(path) = explicit_path {
        builder = builder.add_source(
            config::File::from(path)
                .required(true)
                .format(config::FileFormat::Yaml),
        );
    }

    let service_config: ServiceConfig = builder
        .add_source(config::Environment::with_prefix("GS").separator("__"))
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Could not deserialize service configuration")?;

    service_config
        .validate()
        .context("Service configuration is invalid")?;

    Ok(service_config)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_ascii_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
