use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness probe for hosting platforms that expect a listening port.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-bot"
    }))
}
