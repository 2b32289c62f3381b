use super::models::CalendarEvent;
use super::time::{parse_timestamp, Today};
use crate::error::{BotResult, Error};
use tracing::warn;

/// Filter rules a chat keyword can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKeyword {
    /// Events starting today
    Today,
    /// Events whose title contains `W`
    ContainsW,
    /// Events whose title contains `O`
    ContainsO,
    /// Every upcoming event
    All,
}

/// Apply a keyword's rule against the current date
pub fn filter_events(
    events: Vec<CalendarEvent>,
    keyword: FilterKeyword,
) -> BotResult<Vec<CalendarEvent>> {
    filter_events_on(events, keyword, Today::now())
}

/// Apply a keyword's rule, treating `today` as the current date.
/// Order is preserved for every rule.
pub fn filter_events_on(
    events: Vec<CalendarEvent>,
    keyword: FilterKeyword,
    today: Today,
) -> BotResult<Vec<CalendarEvent>> {
    match keyword {
        FilterKeyword::All => Ok(events),
        FilterKeyword::ContainsW => Ok(title_contains(events, 'W')),
        FilterKeyword::ContainsO => Ok(title_contains(events, 'O')),
        FilterKeyword::Today => {
            let mut kept = Vec::with_capacity(events.len());
            for event in events {
                let start = event
                    .start()
                    .ok_or_else(|| Error::MissingField(event.id.clone()))?;
                match parse_timestamp(start).map(|s| today.contains(&s)) {
                    Ok(true) => kept.push(event),
                    Ok(false) => {}
                    Err(e) => warn!("Skipping event {}: {}", event.id, e),
                }
            }
            Ok(kept)
        }
    }
}

fn title_contains(events: Vec<CalendarEvent>, needle: char) -> Vec<CalendarEvent> {
    events
        .into_iter()
        .filter(|e| e.title().contains(needle))
        .collect()
}
