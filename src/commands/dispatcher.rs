use super::keyword::parse_keyword;
use crate::components::google_calendar::{filter_events, format_timestamp, CalendarEvent};
use crate::components::CalendarQueryService;
use rust_i18n::t;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Turns inbound chat text into reply text
#[derive(Clone)]
pub struct MessageDispatcher {
    calendar: Arc<dyn CalendarQueryService>,
    locale: String,
}

impl MessageDispatcher {
    pub fn new(calendar: Arc<dyn CalendarQueryService>, locale: impl Into<String>) -> Self {
        Self {
            calendar,
            locale: locale.into(),
        }
    }

    /// Produce the reply for one inbound message
    pub async fn dispatch(&self, text: &str) -> String {
        let Some(keyword) = parse_keyword(text) else {
            debug!("Unrecognized command {:?}", text);
            return self.prompt_message();
        };
        info!("Handling keyword {:?}", keyword);

        // Credential and query failures look the same to the user as an empty calendar
        let events = match self.calendar.upcoming_events().await {
            Ok(events) => events,
            Err(e) if e.is_credential_error() => {
                warn!("Calendar credential unavailable: {}", e);
                return self.no_events_message();
            }
            Err(e) => {
                error!("Calendar query failed: {}", e);
                return self.no_events_message();
            }
        };

        let filtered = match filter_events(events, keyword) {
            Ok(filtered) => filtered,
            Err(e) => {
                error!("Failed to filter events: {}", e);
                return self.no_events_message();
            }
        };
        debug!("{} events after filtering", filtered.len());

        compose_reply(&filtered).unwrap_or_else(|| self.no_events_message())
    }

    /// Prompt listing the recognized keywords
    pub fn prompt_message(&self) -> String {
        t!("prompt_keywords", locale = self.locale.as_str()).to_string()
    }

    /// Reply used when nothing can be listed
    pub fn no_events_message(&self) -> String {
        t!("no_events_found", locale = self.locale.as_str()).to_string()
    }
}

/// Numbered `"{index}. {MM-DD HH:MM} {title} "` lines, one per event.
/// Events whose start cannot be rendered are skipped; `None` if no line remains.
pub fn compose_reply(events: &[CalendarEvent]) -> Option<String> {
    let lines: Vec<String> = events
        .iter()
        .filter_map(|event| {
            let Some(start) = event.start() else {
                warn!("Skipping event {} without a start time", event.id);
                return None;
            };
            match format_timestamp(start) {
                Ok(formatted) => Some((formatted, event.title())),
                Err(e) => {
                    warn!("Skipping event {}: {}", event.id, e);
                    None
                }
            }
        })
        .enumerate()
        .map(|(i, (when, title))| format!("{}. {} {} ", i + 1, when, title))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
