use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::models::CalendarEvent;
use super::store::CredentialStore;
use super::token::TokenManager;
use crate::components::{AuthorizationService, CalendarQueryService};
use crate::config::Config;
use crate::error::BotResult;
use crate::utils::http::build_client;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    token_manager: TokenManager,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<Config>, store: Arc<dyn CredentialStore>) -> BotResult<Self> {
        let client = build_client(config.http_timeout_secs)?;
        let token_manager = TokenManager::new(Arc::clone(&config), store, client.clone());

        // Create the actor and get its handle
        let (mut actor, handle) = GoogleCalendarActor::new(config, token_manager.clone(), client);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            token_manager,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarQueryService for GoogleCalendarHandle {
    async fn upcoming_events(&self) -> BotResult<Vec<CalendarEvent>> {
        self.actor_handle.get_upcoming_events().await
    }
}

#[async_trait]
impl AuthorizationService for GoogleCalendarHandle {
    fn authorization_url(&self) -> BotResult<String> {
        self.token_manager.authorization_url()
    }

    async fn authorize(&self, code: &str) -> BotResult<()> {
        self.actor_handle.exchange_code(code.to_string()).await?;
        Ok(())
    }
}
