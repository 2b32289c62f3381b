use crate::error::{other_error, BotResult};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook body signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn keyed_mac(channel_secret: &str) -> BotResult<HmacSha256> {
    HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| other_error(&format!("Invalid HMAC key: {}", e)))
}

/// Base64-encoded HMAC-SHA256 of the raw body, keyed by the channel secret
pub fn compute_signature(channel_secret: &str, body: &[u8]) -> BotResult<String> {
    let mut mac = keyed_mac(channel_secret)?;
    mac.update(body);
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify a webhook signature against the raw request body in constant time
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = BASE64_STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = keyed_mac(channel_secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
