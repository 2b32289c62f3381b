use super::AppState;
use crate::components::line::{
    verify_signature, EventMessage, WebhookEvent, WebhookPayload, SIGNATURE_HEADER,
};
use crate::error::{BotResult, Error};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::{debug, error, info, warn};

/// Handler for LINE webhook deliveries.
/// Every event is answered before the response is returned.
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> BotResult<&'static str> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook request without signature header");
            Error::SignatureInvalid
        })?;

    if !verify_signature(&state.channel_secret, &body, signature) {
        warn!("Rejected webhook with invalid signature");
        return Err(Error::SignatureInvalid);
    }

    let payload: WebhookPayload =
        serde_json::from_slice(&body).map_err(|e| Error::MalformedPayload(e.to_string()))?;
    debug!("Webhook delivery with {} events", payload.events.len());

    for event in payload.events {
        handle_event(&state, event).await;
    }

    Ok("OK")
}

async fn handle_event(state: &AppState, event: WebhookEvent) {
    let WebhookEvent::Message(event) = event else {
        debug!("Ignoring non-message event");
        return;
    };
    let EventMessage::Text { text, .. } = &event.message else {
        debug!("Ignoring non-text message");
        return;
    };

    if let Some(user) = event.source.as_ref().and_then(|s| s.user_id.as_deref()) {
        info!("Message from {}: {:?}", user, text);
    }

    let reply = state.dispatcher.dispatch(text).await;

    // A failed reply cannot be retried with the same token, so it is only logged
    if let Err(e) = state.replier.reply(&event.reply_token, &reply).await {
        error!("Failed to reply: {}", e);
    }
}
