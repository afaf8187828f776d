pub mod health;

use axum::{routing::get, Router};

/// The bot's only inbound HTTP surface. Served only when `PORT` is set.
pub fn build_router() -> Router {
    Router::new().route("/health", get(health::health_handler))
}
