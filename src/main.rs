use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snd_personal::config::Config;
use snd_personal::controller::SyncController;
use snd_personal::document::HeadlessDocument;
use snd_personal::export::NoClipboard;
use snd_personal::page::PageSource;
use snd_personal::routes::{self, AppState};
use snd_personal::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snd_personal=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load("personal.toml")?;
    info!("Loaded configuration for origin '{}'", config.origin);

    // Initialize storage
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:snd_personal.db?mode=rwc".to_string());
    let store = SqliteStore::new(&database_url, &config.origin).await?;
    store.initialize().await?;
    info!("Storage initialized");

    // A missing or unreadable page still gets the control bar
    let page = match PageSource::load(&config.items_path, &config.site_title) {
        Ok(page) => page,
        Err(e) => {
            warn!("Could not read {}: {}", config.items_path, e);
            PageSource::new(&config.site_title, Vec::new())
        }
    };
    info!("Loaded {} articles", page.articles.len());

    let controller = SyncController::start(
        Arc::new(store),
        config.storage_keys(),
        HeadlessDocument::new(page),
        NoClipboard,
    )
    .await;
    let counters = controller.counters();
    info!(
        "Restored {} custom sources and {} deleted articles",
        counters.custom_feeds, counters.deleted_articles
    );

    let state = Arc::new(AppState {
        controller: Mutex::new(controller),
    });
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
