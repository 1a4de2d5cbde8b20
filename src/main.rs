//! StudyHub sync check
//!
//! Loads the dashboard and the first page of documents from the configured backend and
//! reports what the store holds. Useful for checking connectivity and credentials.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studyhub_sync::models::{Document, StudyEvent};
use studyhub_sync::{
    Config, DashboardRefresh, HttpTransport, LogFormat, MutationGateway, PaginationController,
    ResourceKey, ResourceStore, SystemClock,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    tracing::info!("Starting StudyHub sync check");
    tracing::info!("API URL: {}", config.api_url);
    tracing::info!("Page size: {}", config.page_size);

    if config.api_token.is_none() {
        tracing::warn!("No API token configured (STUDYHUB_API_TOKEN). Requests are anonymous!");
    }

    let transport = Arc::new(HttpTransport::new(&config)?);
    let store = Arc::new(ResourceStore::new(transport));
    let gateway = MutationGateway::new(store.clone(), Arc::new(SystemClock));

    // Dashboard
    match gateway.store().fetch_dashboard().await {
        DashboardRefresh::Refreshed => {
            if let Some(dashboard) = store.dashboard() {
                tracing::info!(
                    xp = dashboard.user.xp,
                    level = dashboard.user.level,
                    streak = dashboard.user.streak,
                    "Dashboard loaded with {} events today",
                    dashboard.todays_events.len()
                );
            }
        }
        DashboardRefresh::Failed(err) => tracing::error!("Dashboard unavailable: {}", err),
        other => tracing::warn!("Dashboard not refreshed: {:?}", other),
    }

    // First page of documents
    let documents = PaginationController::<Document>::new(config.page_size);
    let outcome = documents.apply_filter(&store, Default::default()).await;
    match store.error(ResourceKey::Documents) {
        Some(message) => tracing::error!("Documents unavailable: {}", message),
        None => tracing::info!(
            has_more = outcome.has_more,
            "Loaded {} documents",
            store.len::<Document>()
        ),
    }

    tracing::info!("Study events in store: {}", store.len::<StudyEvent>());

    Ok(())
}
