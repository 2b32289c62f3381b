use crate::error::{config_error, env_error, BotResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only Google Calendar scope requested during authorization
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Default settings file
pub const SETTINGS_FILE: &str = "config/bot.toml";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_TOKEN_PATH: &str = "token.json";
const DEFAULT_LOCALE: &str = "zh-TW";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CLIENT_SECRET_FILE: &str = "client_secret.json";
const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";

/// Main configuration structure for the bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// LINE channel secret, used to verify webhook signatures
    pub line_channel_secret: String,
    /// LINE channel access token, used for replies
    pub line_channel_access_token: String,
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Google Calendar ID to query
    pub google_calendar_id: String,
    /// Redirect URI registered for the OAuth callback
    pub redirect_uri: String,
    /// Google consent page
    pub google_auth_uri: String,
    /// Google token endpoint
    pub google_token_uri: String,
    /// Google Calendar REST base URL
    pub google_calendar_api_base: String,
    /// LINE Messaging API base URL
    pub line_api_base: String,
    /// Where the calendar credential is persisted
    pub token_path: PathBuf,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Locale for user-facing replies
    pub bot_locale: String,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout_secs: u64,
}

/// Optional, non-secret settings read from `config/bot.toml`
#[derive(Debug, Default, Deserialize)]
pub struct FileSettings {
    pub google_calendar_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub token_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub bot_locale: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

impl FileSettings {
    /// Load settings from a TOML file, returning defaults if it does not exist
    pub fn load(path: &Path) -> BotResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// OAuth client as downloaded from the Google Cloud Console
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretFile {
    #[serde(alias = "installed")]
    pub web: ClientSecret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl ClientSecretFile {
    /// Parse a `client_secret.json` file
    pub fn load(path: &Path) -> BotResult<ClientSecret> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!(
                "Could not read OAuth client file {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: ClientSecretFile = serde_json::from_str(&content)?;
        Ok(file.web)
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let settings = FileSettings::load(Path::new(SETTINGS_FILE))?;
        Self::from_sources(settings, |key| env::var(key).ok())
    }

    /// Build the configuration from file settings and an environment lookup.
    /// Environment values take precedence over the settings file.
    pub fn from_sources<F>(settings: FileSettings, var: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            var(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| env_error(key))
        };

        let line_channel_secret = required("CHANNEL_SECRET")?;
        let line_channel_access_token = required("CHANNEL_ACCESS_TOKEN")?;

        let google_calendar_id = var("GOOGLE_CALENDAR_ID")
            .or(settings.google_calendar_id)
            .ok_or_else(|| env_error("GOOGLE_CALENDAR_ID"))?;

        // Client credentials come from the environment, or else from the downloaded client file
        let client_file = match (var("GOOGLE_CLIENT_ID"), var("GOOGLE_CLIENT_SECRET")) {
            (Some(id), Some(secret)) => ClientSecret {
                client_id: id,
                client_secret: secret,
                auth_uri: None,
                token_uri: None,
                redirect_uris: Vec::new(),
            },
            _ => {
                let path = var("GOOGLE_CLIENT_SECRET_FILE")
                    .unwrap_or_else(|| DEFAULT_CLIENT_SECRET_FILE.to_string());
                ClientSecretFile::load(Path::new(&path))?
            }
        };

        let redirect_uri = var("REDIRECT_URI")
            .or(settings.redirect_uri)
            .or_else(|| client_file.redirect_uris.first().cloned())
            .ok_or_else(|| env_error("REDIRECT_URI"))?;

        let port = match var("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid PORT: {}", p)))?,
            None => settings.port.unwrap_or(DEFAULT_PORT),
        };

        let http_timeout_secs = match var("HTTP_TIMEOUT_SECS") {
            Some(t) => t
                .parse::<u64>()
                .map_err(|_| config_error(&format!("Invalid HTTP_TIMEOUT_SECS: {}", t)))?,
            None => settings
                .http_timeout_secs
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Config {
            line_channel_secret,
            line_channel_access_token,
            google_client_id: client_file.client_id,
            google_client_secret: client_file.client_secret,
            google_calendar_id,
            redirect_uri,
            google_auth_uri: var("GOOGLE_AUTH_URI")
                .or(client_file.auth_uri)
                .unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            google_token_uri: var("GOOGLE_TOKEN_URI")
                .or(client_file.token_uri)
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            google_calendar_api_base: var("GOOGLE_CALENDAR_API_BASE")
                .unwrap_or_else(|| DEFAULT_CALENDAR_API_BASE.to_string()),
            line_api_base: var("LINE_API_BASE")
                .unwrap_or_else(|| DEFAULT_LINE_API_BASE.to_string()),
            token_path: var("TOKEN_PATH")
                .map(PathBuf::from)
                .or(settings.token_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
            bind_address: var("BIND_ADDRESS")
                .or(settings.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port,
            bot_locale: var("BOT_LOCALE")
                .or(settings.bot_locale)
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            http_timeout_secs,
        })
    }
}
