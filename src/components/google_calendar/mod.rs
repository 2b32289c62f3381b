mod actor;
pub mod filter;
mod handle;
pub mod models;
pub mod store;
pub mod time;
pub mod token;

pub use actor::{events_url, MAX_RESULTS};
pub use filter::{filter_events, FilterKeyword};
pub use handle::GoogleCalendarHandle;
pub use models::CalendarEvent;
pub use store::{Credential, CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use time::{format_timestamp, is_today, Today};
