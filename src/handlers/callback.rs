use super::AppState;
use crate::error::{BotResult, Error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use rust_i18n::t;
use serde::Deserialize;
use tracing::{error, info, warn};

/// Query parameters Google appends to the redirect URI
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Handler for the OAuth redirect: exchanges the code and stores the credential
pub async fn callback_handler(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let locale = &*state.locale;

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        if let Some(reason) = params.error {
            warn!("Authorization was not granted: {}", reason);
        }
        return Error::MissingAuthorizationCode(
            t!("missing_authorization_code", locale = locale).to_string(),
        )
        .into_response();
    };

    match state.authorizer.authorize(&code).await {
        Ok(()) => {
            info!("Calendar authorization completed");
            Html(t!("authorization_success", locale = locale).to_string()).into_response()
        }
        Err(e) => {
            error!("Failed to obtain token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(t!("authorization_failed", locale = locale).to_string()),
            )
                .into_response()
        }
    }
}

/// Handler that sends the browser to the Google consent page
pub async fn authorize_handler(State(state): State<AppState>) -> BotResult<Redirect> {
    let url = state.authorizer.authorization_url()?;
    Ok(Redirect::to(&url))
}
