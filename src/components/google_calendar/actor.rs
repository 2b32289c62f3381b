use super::models::CalendarEvent;
use super::store::Credential;
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{calendar_error, BotResult};
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use url::Url;

/// Upper bound on events fetched per query
pub const MAX_RESULTS: u32 = 100;

/// The Google Calendar actor that processes messages.
/// Commands run one at a time, so the credential is never refreshed or written concurrently.
pub struct GoogleCalendarActor {
    config: Arc<Config>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    GetUpcomingEvents(oneshot::Sender<BotResult<Vec<CalendarEvent>>>),
    ExchangeCode(String, oneshot::Sender<BotResult<Credential>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Get upcoming events from the calendar
    pub async fn get_upcoming_events(&self) -> BotResult<Vec<CalendarEvent>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(GoogleCalendarCommand::GetUpcomingEvents(response_tx))
            .await
            .map_err(|e| calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| calendar_error("Response channel closed"))?
    }

    /// Exchange an authorization code and persist the credential
    pub async fn exchange_code(&self, code: String) -> BotResult<Credential> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(GoogleCalendarCommand::ExchangeCode(code, response_tx))
            .await
            .map_err(|e| calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<Config>,
        token_manager: TokenManager,
        client: Client,
    ) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            token_manager,
            client,
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::GetUpcomingEvents(response_tx) => {
                    let result = self.get_upcoming_events().await;
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::ExchangeCode(code, response_tx) => {
                    let result = self.token_manager.exchange_code(&code).await;
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// Get upcoming events from now on, ordered by start time
    async fn get_upcoming_events(&self) -> BotResult<Vec<CalendarEvent>> {
        let token = self.token_manager.get_token().await?;

        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = events_url(&self.config, &time_min)?;
        debug!("Querying calendar {}", self.config.google_calendar_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| calendar_error(&format!("Failed to parse events response: {}", e)))?;

        // A calendar with no upcoming events may omit `items` entirely
        let calendar_events: Vec<CalendarEvent> = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .map(|items| items.iter().map(CalendarEvent::from_api).collect())
            .unwrap_or_default();

        info!("Found {} upcoming events", calendar_events.len());
        Ok(calendar_events)
    }
}

/// Build the events list URL: from `time_min` on, no upper bound,
/// recurring events expanded, ordered by start time
pub fn events_url(config: &Config, time_min: &str) -> BotResult<Url> {
    let mut url = Url::parse(&config.google_calendar_api_base)
        .map_err(|e| calendar_error(&format!("Failed to parse URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| calendar_error("Calendar API base cannot be a base URL"))?
        .pop_if_empty()
        .extend(["calendars", config.google_calendar_id.as_str(), "events"]);

    url.query_pairs_mut()
        .append_pair("timeMin", time_min)
        .append_pair("maxResults", &MAX_RESULTS.to_string())
        .append_pair("singleEvents", "true")
        .append_pair("orderBy", "startTime");

    Ok(url)
}
