use crate::error::BotResult;
use async_trait::async_trait;

// Export components
pub mod google_calendar;
pub mod line;

// Re-export Google Calendar handle
pub use google_calendar::GoogleCalendarHandle;
// Re-export LINE client
pub use line::LineMessagingClient;

use google_calendar::CalendarEvent;

/// Source of upcoming calendar events
#[async_trait]
pub trait CalendarQueryService: Send + Sync + 'static {
    /// Events from now on, ordered by start time, recurring events expanded.
    /// Fails with a credential error when no usable credential exists.
    async fn upcoming_events(&self) -> BotResult<Vec<CalendarEvent>>;
}

/// The one-time OAuth authorization flow
#[async_trait]
pub trait AuthorizationService: Send + Sync + 'static {
    /// Consent page the user should visit
    fn authorization_url(&self) -> BotResult<String>;

    /// Exchange an authorization code and persist the resulting credential
    async fn authorize(&self, code: &str) -> BotResult<()>;
}

/// Outbound chat replies
#[async_trait]
pub trait ReplySender: Send + Sync + 'static {
    /// Reply once to the event identified by `reply_token`
    async fn reply(&self, reply_token: &str, text: &str) -> BotResult<()>;
}
