use crate::commands::MessageDispatcher;
use crate::components::google_calendar::{CredentialStore, FileCredentialStore};
use crate::components::{AuthorizationService, GoogleCalendarHandle, LineMessagingClient};
use crate::config::Config;
use crate::error::{config_error, Error};
use crate::handlers::{router, AppState};
use crate::shutdown::shutdown_signal;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire up the collaborators and serve HTTP until a shutdown signal arrives
pub async fn start_server(config: Arc<Config>) -> miette::Result<()> {
    let store = FileCredentialStore::new(config.token_path.clone());
    let has_credential = store.path().exists();
    let store: Arc<dyn CredentialStore> = Arc::new(store);

    let calendar = GoogleCalendarHandle::new(Arc::clone(&config), store)?;
    let replier = LineMessagingClient::new(&config)?;

    if !has_credential {
        match calendar.authorization_url() {
            Ok(url) => warn!(
                "No calendar credential at {}; authorize at {}",
                config.token_path.display(),
                url
            ),
            Err(e) => error!("Cannot build authorization URL: {}", e),
        }
    }

    let calendar_service = Arc::new(calendar.clone());
    let state = AppState {
        channel_secret: Arc::from(config.line_channel_secret.as_str()),
        locale: Arc::from(config.bot_locale.as_str()),
        dispatcher: MessageDispatcher::new(calendar_service.clone(), config.bot_locale.clone()),
        replier: Arc::new(replier),
        authorizer: calendar_service,
    };

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| config_error(&format!("Invalid bind address: {}", e)))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::from)?;
    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = calendar.shutdown().await {
        error!("Error shutting down Google Calendar actor: {:?}", e);
    } else {
        info!("Google Calendar actor shut down successfully");
    }

    result.map_err(|e| Error::from(e).into())
}
