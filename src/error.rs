use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use miette::{Diagnostic, Result};
use thiserror::Error;
use tracing::error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Invalid webhook signature")]
    #[diagnostic(code(linecal::signature_invalid))]
    SignatureInvalid,

    /// Carries the localized message shown to the browser
    #[error("{0}")]
    #[diagnostic(code(linecal::missing_authorization_code))]
    MissingAuthorizationCode(String),

    #[error("Malformed webhook payload: {0}")]
    #[diagnostic(code(linecal::malformed_payload))]
    MalformedPayload(String),

    #[error("Calendar credential unavailable: {0}")]
    #[diagnostic(
        code(linecal::credential_unavailable),
        help("Open /authorize in a browser to grant calendar access")
    )]
    CredentialUnavailable(String),

    #[error("Calendar credential refresh failed: {0}")]
    #[diagnostic(code(linecal::credential_refresh_failed))]
    CredentialRefreshFailed(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(linecal::calendar_query_failed))]
    CalendarQueryFailed(String),

    #[error("Token exchange failed: {0}")]
    #[diagnostic(code(linecal::token_exchange_failed))]
    TokenExchangeFailed(String),

    #[error("Malformed event timestamp: {0}")]
    #[diagnostic(code(linecal::malformed_timestamp))]
    MalformedEventTimestamp(String),

    #[error("Event {0} has no start date or date-time")]
    #[diagnostic(code(linecal::missing_field))]
    MissingField(String),

    #[error("LINE Messaging API error: {0}")]
    #[diagnostic(code(linecal::line_api))]
    LineApi(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(linecal::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(linecal::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(linecal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(linecal::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(linecal::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether the calendar query degraded because no usable credential exists
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Error::CredentialUnavailable(_) | Error::CredentialRefreshFailed(_)
        )
    }

    /// HTTP status used when the error escapes a request handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::SignatureInvalid
            | Error::MissingAuthorizationCode(_)
            | Error::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            // Internal details stay in the log
            error!("Request failed: {}", self);
            (status, "Internal server error").into_response()
        } else {
            (status, self.to_string()).into_response()
        }
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn calendar_error(message: &str) -> Error {
    Error::CalendarQueryFailed(message.to_string())
}

/// Helper to create credential errors
pub fn credential_error(message: &str) -> Error {
    Error::CredentialUnavailable(message.to_string())
}

/// Helper to create LINE API errors
pub fn line_error(message: &str) -> Error {
    Error::LineApi(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
