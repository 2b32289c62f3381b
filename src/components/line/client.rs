use super::models::{ReplyMessageRequest, TextMessage};
use crate::components::ReplySender;
use crate::config::Config;
use crate::error::{line_error, BotResult};
use crate::utils::http::build_client;
use async_trait::async_trait;
use reqwest::Client;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Longest text a single LINE text message may carry
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Client for the LINE Messaging API reply endpoint
#[derive(Clone)]
pub struct LineMessagingClient {
    client: Client,
    reply_url: String,
    access_token: String,
}

impl LineMessagingClient {
    pub fn new(config: &Config) -> BotResult<Self> {
        Ok(Self {
            client: build_client(config.http_timeout_secs)?,
            reply_url: format!(
                "{}/v2/bot/message/reply",
                config.line_api_base.trim_end_matches('/')
            ),
            access_token: config.line_channel_access_token.clone(),
        })
    }

    /// Send a single text reply using a one-time reply token
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> BotResult<()> {
        let text = truncate_text(text);
        let request = ReplyMessageRequest {
            reply_token,
            messages: vec![TextMessage::new(&text)],
        };

        let response = self
            .client
            .post(&self.reply_url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| line_error(&format!("Failed to send reply: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(line_error(&format!(
                "Failed to send reply: HTTP {} - {}",
                status, error_body
            )));
        }

        debug!("Reply sent");
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineMessagingClient {
    async fn reply(&self, reply_token: &str, text: &str) -> BotResult<()> {
        self.reply_text(reply_token, text).await
    }
}

/// Cut text down to the LINE message limit
pub fn truncate_text(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_TEXT_LENGTH) {
        Some((cut, _)) => {
            warn!("Reply exceeds {} characters, truncating", MAX_TEXT_LENGTH);
            Cow::Owned(text[..cut].to_string())
        }
        None => Cow::Borrowed(text),
    }
}
