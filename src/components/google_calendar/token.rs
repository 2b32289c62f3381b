use super::store::{Credential, CredentialStore};
use crate::config::{Config, CALENDAR_SCOPE};
use crate::error::{config_error, credential_error, BotResult, Error};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_credential(self, fallback_refresh: Option<String>) -> Credential {
        let expires_in = self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh),
            expires_at: Utc::now().timestamp() + expires_in,
            scope: self.scope,
            token_type: self.token_type,
        }
    }
}

/// Reads, refreshes and obtains the calendar credential
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<Config>,
    store: Arc<dyn CredentialStore>,
    client: Client,
}

impl TokenManager {
    pub fn new(config: Arc<Config>, store: Arc<dyn CredentialStore>, client: Client) -> Self {
        Self {
            config,
            store,
            client,
        }
    }

    /// Consent page URL for the one-time authorization
    pub fn authorization_url(&self) -> BotResult<String> {
        let url = Url::parse_with_params(
            &self.config.google_auth_uri,
            &[
                ("client_id", self.config.google_client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", CALENDAR_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| config_error(&format!("Invalid Google auth URI: {}", e)))?;
        Ok(url.into())
    }

    /// Get a usable credential, refreshing and persisting it when expired
    pub async fn get_token(&self) -> BotResult<Credential> {
        let credential = self
            .store
            .load()
            .await
            .map_err(|e| match e {
                Error::CredentialUnavailable(_) => e,
                other => credential_error(&format!("Failed to load credential: {}", other)),
            })?
            .ok_or_else(|| credential_error("No stored credential, authorization required"))?;

        if !credential.is_expired() {
            return Ok(credential);
        }

        if credential.refresh_token.is_none() {
            warn!("Calendar credential expired and has no refresh token");
            return Err(credential_error("Credential expired and cannot be refreshed"));
        }

        info!("Refreshing calendar access token");
        self.refresh_token(&credential).await
    }

    /// Refresh an expired credential and persist the result
    async fn refresh_token(&self, credential: &Credential) -> BotResult<Credential> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::CredentialRefreshFailed("No refresh token".to_string()))?;

        let response = self
            .request_token(&[
                ("client_id", self.config.google_client_id.as_str()),
                ("client_secret", self.config.google_client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await
            .map_err(Error::CredentialRefreshFailed)?;

        let refreshed = response.into_credential(Some(refresh_token.to_string()));
        self.store
            .save(&refreshed)
            .await
            .map_err(|e| Error::CredentialRefreshFailed(format!("Failed to persist: {}", e)))?;

        Ok(refreshed)
    }

    /// Exchange an authorization code for a credential and persist it
    pub async fn exchange_code(&self, code: &str) -> BotResult<Credential> {
        let response = self
            .request_token(&[
                ("client_id", self.config.google_client_id.as_str()),
                ("client_secret", self.config.google_client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await
            .map_err(Error::TokenExchangeFailed)?;

        if response.refresh_token.is_none() {
            warn!("Token response has no refresh token; the credential cannot be refreshed");
        }

        let credential = response.into_credential(None);
        self.store
            .save(&credential)
            .await
            .map_err(|e| Error::TokenExchangeFailed(format!("Failed to persist: {}", e)))?;

        Ok(credential)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = self
            .client
            .post(&self.config.google_token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| format!("Token request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(format!("HTTP {} - {}", status, error_body));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| format!("Failed to parse token response: {}", e))
    }
}
