//! HTTP delivery of outbound chat messages.
//!
//! - Slack: `POST {slack_api_url}/chat.postMessage` with the bot token as a
//!   bearer credential and `{channel, text}` as the body.
//! - Telegram: `POST {telegram_api_url}/bot{token}/sendMessage` with
//!   `{chat_id, text}` as the body.
//!
//! Both APIs answer with an `ok` flag; `ok: false` is reported as a rejection.

use async_trait::async_trait;
use git_slacker_api::config::ChatConfig;
use git_slacker_core::{ChatPlatform, ChatTransport, DeliveryError, SecretValue, Secrets};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// [`ChatTransport`] backed by the Slack Web API and the Telegram Bot API
pub struct HttpChatTransport {
    http_client: reqwest::Client,
    slack_api_url: String,
    telegram_api_url: String,
    slack_bot_token: SecretValue,
    telegram_token: SecretValue,
}

#[derive(Serialize)]
struct SlackMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct TelegramMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope shared by both APIs
#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    /// Slack failure reason
    error: Option<String>,
    /// Telegram failure reason
    description: Option<String>,
}

impl HttpChatTransport {
    pub fn new(config: &ChatConfig, secrets: &Secrets) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            slack_api_url: config.slack_api_url.trim_end_matches('/').to_string(),
            telegram_api_url: config.telegram_api_url.trim_end_matches('/').to_string(),
            slack_bot_token: secrets.slack_bot_token.clone(),
            telegram_token: secrets.telegram_token.clone(),
        })
    }

    async fn send_slack(&self, recipient: &str, message: &str) -> Result<(), DeliveryError> {
        let platform = ChatPlatform::Slack;
        if self.slack_bot_token.is_empty() {
            return Err(not_configured(platform));
        }

        let url = format!("{}/chat.postMessage", self.slack_api_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.slack_bot_token.expose_secret())
            .json(&SlackMessage {
                channel: recipient,
                text: message,
            })
            .send()
            .await
            .map_err(|e| transport_failed(platform, e))?;

        check_reply(platform, response).await
    }

    async fn send_telegram(&self, recipient: &str, message: &str) -> Result<(), DeliveryError> {
        let platform = ChatPlatform::Telegram;
        if self.telegram_token.is_empty() {
            return Err(not_configured(platform));
        }

        let url = format!(
            "{}/bot{}/sendMessage",
            self.telegram_api_url,
            self.telegram_token.expose_secret()
        );
        let response = self
            .http_client
            .post(&url)
            .json(&TelegramMessage {
                chat_id: recipient,
                text: message,
            })
            .send()
            .await
            .map_err(|e| transport_failed(platform, e))?;

        check_reply(platform, response).await
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    #[instrument(skip(self, message), fields(platform = %platform))]
    async fn send_message(
        &self,
        platform: ChatPlatform,
        recipient: &str,
        message: &str,
    ) -> Result<(), DeliveryError> {
        match platform {
            ChatPlatform::Slack => self.send_slack(recipient, message).await?,
            ChatPlatform::Telegram => self.send_telegram(recipient, message).await?,
        }

        debug!("Chat message delivered");
        Ok(())
    }
}

async fn check_reply(
    platform: ChatPlatform,
    response: reqwest::Response,
) -> Result<(), DeliveryError> {
    let status = response.status();
    let reply = response.json::<ApiReply>().await;

    match reply {
        Ok(reply) if reply.ok && status.is_success() => Ok(()),
        Ok(reply) => Err(DeliveryError::Rejected {
            platform: platform.to_string(),
            message: reply
                .error
                .or(reply.description)
                .unwrap_or_else(|| format!("status {status}")),
        }),
        Err(e) if status.is_success() => Err(transport_failed(platform, e)),
        Err(_) => Err(DeliveryError::Rejected {
            platform: platform.to_string(),
            message: format!("status {status}"),
        }),
    }
}

fn not_configured(platform: ChatPlatform) -> DeliveryError {
    DeliveryError::NotConfigured {
        platform: platform.to_string(),
    }
}

/// The request URL is stripped since the Telegram token is part of it
fn transport_failed(platform: ChatPlatform, error: reqwest::Error) -> DeliveryError {
    DeliveryError::Transport {
        platform: platform.to_string(),
        message: error.without_url().to_string(),
    }
}

#[cfg(test)]
#[path = "chat_client_tests.rs"]
mod tests;
