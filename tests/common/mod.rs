#![allow(dead_code)]

use async_trait::async_trait;
use linecal::components::google_calendar::CalendarEvent;
use linecal::components::{AuthorizationService, CalendarQueryService, ReplySender};
use linecal::config::Config;
use linecal::error::{credential_error, BotResult, Error};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const CHANNEL_SECRET: &str = "test-channel-secret";
pub const CALENDAR_ID: &str = "team@group.calendar.google.com";
pub const GOOD_CODE: &str = "4/0AbCdEf-good";

/// Configuration pointing every outbound endpoint at `base`
pub fn test_config(base: &str) -> Config {
    Config {
        line_channel_secret: CHANNEL_SECRET.to_string(),
        line_channel_access_token: "test-access-token".to_string(),
        google_client_id: "client-id.apps.googleusercontent.com".to_string(),
        google_client_secret: "client-secret".to_string(),
        google_calendar_id: CALENDAR_ID.to_string(),
        redirect_uri: "https://bot.example.com/callback".to_string(),
        google_auth_uri: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
        google_token_uri: format!("{}/token", base),
        google_calendar_api_base: format!("{}/calendar/v3", base),
        line_api_base: base.to_string(),
        token_path: PathBuf::from("token.json"),
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        bot_locale: "zh-TW".to_string(),
        http_timeout_secs: 5,
    }
}

pub fn event(id: &str, title: &str, start: &str) -> CalendarEvent {
    let (start_date_time, start_date) = if start.contains('T') {
        (Some(start.to_string()), None)
    } else {
        (None, Some(start.to_string()))
    };
    CalendarEvent {
        id: id.to_string(),
        summary: Some(title.to_string()),
        start_date_time,
        start_date,
        ..Default::default()
    }
}

/// Webhook body carrying a single text message
pub fn text_message_body(text: &str, reply_token: &str) -> String {
    json!({
        "destination": "U0123456789abcdef0123456789abcdef",
        "events": [{
            "type": "message",
            "mode": "active",
            "timestamp": 1714716300000u64,
            "source": { "type": "user", "userId": "U4af4980629" },
            "webhookEventId": "01HX8Y2N3Q4R5S6T7U8V9W0XYZ",
            "deliveryContext": { "isRedelivery": false },
            "replyToken": reply_token,
            "message": { "id": "500000000000000001", "type": "text", "text": text }
        }]
    })
    .to_string()
}

/// Mock calendar that returns fixed events or a credential failure
#[derive(Debug, Default)]
pub struct MockCalendarService {
    events: Vec<CalendarEvent>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl MockCalendarService {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarQueryService for MockCalendarService {
    async fn upcoming_events(&self) -> BotResult<Vec<CalendarEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(credential_error("No stored credential, authorization required"));
        }
        Ok(self.events.clone())
    }
}

/// Records every reply instead of sending it
#[derive(Debug, Default)]
pub struct RecordingReplySender {
    replies: Mutex<Vec<(String, String)>>,
}

impl RecordingReplySender {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySender for RecordingReplySender {
    async fn reply(&self, reply_token: &str, text: &str) -> BotResult<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        Ok(())
    }
}

/// Accepts only `GOOD_CODE`
#[derive(Debug, Default)]
pub struct MockAuthorizer {
    codes: Mutex<Vec<String>>,
}

impl MockAuthorizer {
    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorizationService for MockAuthorizer {
    fn authorization_url(&self) -> BotResult<String> {
        Ok("https://accounts.google.com/o/oauth2/v2/auth?client_id=test".to_string())
    }

    async fn authorize(&self, code: &str) -> BotResult<()> {
        self.codes.lock().unwrap().push(code.to_string());
        if code == GOOD_CODE {
            Ok(())
        } else {
            Err(Error::TokenExchangeFailed("invalid_grant".to_string()))
        }
    }
}
