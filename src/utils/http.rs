use crate::error::{other_error, BotResult};
use reqwest::Client;
use std::time::Duration;

/// Build the shared outbound HTTP client with a bounded request timeout
pub fn build_client(timeout_secs: u64) -> BotResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| other_error(&format!("Failed to build HTTP client: {}", e)))
}
