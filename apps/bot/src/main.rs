mod commands;
mod config;
mod dispatcher;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod state;
mod store;
mod telegram;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dispatcher::run_polling;
use crate::generation::Generator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::JsonFileStore;
use crate::telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor bot v{}", env!("CARGO_PKG_VERSION"));

    // Resume store
    let store = JsonFileStore::new(&config.resumes_file);
    store.ensure_exists().await?;

    // LLM client
    let llm = LlmClient::new(
        config.llm_api_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Telegram client
    let telegram = TelegramClient::new(config.telegram_bot_token.clone())?;
    let me = telegram.get_me().await?;
    let bot_username = me.username.unwrap_or_default();
    info!("Authorized as @{} (id {})", bot_username, me.id);

    let state = AppState {
        store: Arc::new(store),
        messenger: Arc::new(telegram.clone()),
        generator: Generator::new(Arc::new(llm)),
        bot_username,
    };

    if let Some(port) = config.port {
        tokio::spawn(serve_health(port));
    }

    run_polling(&telegram, state, shutdown_signal()).await;

    info!("Tailor bot stopped");
    Ok(())
}

/// Liveness endpoint. A bind failure is logged; the bot keeps polling.
async fn serve_health(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = build_router().layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind health endpoint on {addr}: {e}");
            return;
        }
    };

    info!("Health endpoint listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Health endpoint stopped: {e}");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
}
