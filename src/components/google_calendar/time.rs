use crate::error::{BotResult, Error};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Display format for event start times: `MM-DD HH:MM`
const DISPLAY_FORMAT: &str = "%m-%d %H:%M";

/// A parsed event start value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    /// Date-time carrying its own UTC offset
    DateTime(DateTime<FixedOffset>),
    /// Date-time written without an offset
    Floating(NaiveDateTime),
    /// All-day value with no time of day
    Date(NaiveDate),
}

impl EventStart {
    /// Calendar date as written in the timestamp's own offset.
    /// Date-only values are midnight UTC, so their date is the written one.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventStart::DateTime(dt) => dt.date_naive(),
            EventStart::Floating(dt) => dt.date(),
            EventStart::Date(d) => *d,
        }
    }

    /// Wall-clock date-time used for display
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            EventStart::DateTime(dt) => dt.naive_local(),
            EventStart::Floating(dt) => *dt,
            EventStart::Date(d) => d.and_time(NaiveTime::default()),
        }
    }
}

fn malformed(timestamp: &str, reason: impl std::fmt::Display) -> Error {
    Error::MalformedEventTimestamp(format!("{:?}: {}", timestamp, reason))
}

/// Parse a Google Calendar start value (`dateTime` or `date`)
pub fn parse_timestamp(timestamp: &str) -> BotResult<EventStart> {
    let timestamp = timestamp.trim();
    if timestamp.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
            return Ok(EventStart::DateTime(dt));
        }
        NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .map(EventStart::Floating)
            .map_err(|e| malformed(timestamp, e))
    } else {
        NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
            .map(EventStart::Date)
            .map_err(|e| malformed(timestamp, e))
    }
}

/// The current date as seen by each kind of start value.
/// Date-times compare against the local date, date-only values against the UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Today {
    pub local: NaiveDate,
    pub utc: NaiveDate,
}

impl Today {
    pub fn now() -> Self {
        Self {
            local: Local::now().date_naive(),
            utc: Utc::now().date_naive(),
        }
    }

    /// A fixed date where local and UTC agree
    pub fn on(date: NaiveDate) -> Self {
        Self {
            local: date,
            utc: date,
        }
    }

    pub fn contains(&self, start: &EventStart) -> bool {
        match start {
            EventStart::Date(d) => *d == self.utc,
            other => other.date() == self.local,
        }
    }
}

/// Whether the timestamp's calendar date equals `date`
pub fn is_on_date(timestamp: &str, date: NaiveDate) -> BotResult<bool> {
    Ok(parse_timestamp(timestamp)?.date() == date)
}

/// Whether the timestamp falls on `today`
pub fn is_today_at(timestamp: &str, today: Today) -> BotResult<bool> {
    Ok(today.contains(&parse_timestamp(timestamp)?))
}

/// Whether the timestamp falls on today's date.
/// The event's own offset decides its date; it is not converted to local time.
pub fn is_today(timestamp: &str) -> BotResult<bool> {
    is_today_at(timestamp, Today::now())
}

/// Render a start value as `MM-DD HH:MM` (24-hour), in the timestamp's own offset.
/// Date-only values render with `00:00`.
pub fn format_timestamp(timestamp: &str) -> BotResult<String> {
    Ok(parse_timestamp(timestamp)?
        .wall_clock()
        .format(DISPLAY_FORMAT)
        .to_string())
}
