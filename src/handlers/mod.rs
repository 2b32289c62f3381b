use crate::commands::MessageDispatcher;
use crate::components::{AuthorizationService, ReplySender};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod callback;
mod webhook;

pub use callback::{authorize_handler, callback_handler, CallbackParams};
pub use webhook::webhook_handler;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// LINE channel secret for webhook signatures
    pub channel_secret: Arc<str>,
    /// Locale for pages rendered by the handlers
    pub locale: Arc<str>,
    pub dispatcher: MessageDispatcher,
    pub replier: Arc<dyn ReplySender>,
    pub authorizer: Arc<dyn AuthorizationService>,
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/callback", get(callback_handler))
        .route("/authorize", get(authorize_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
