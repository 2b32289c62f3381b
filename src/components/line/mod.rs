mod client;
pub mod models;
pub mod signature;

pub use client::{truncate_text, LineMessagingClient, MAX_TEXT_LENGTH};
pub use models::{EventMessage, MessageEvent, WebhookEvent, WebhookPayload};
pub use signature::{compute_signature, verify_signature, SIGNATURE_HEADER};
