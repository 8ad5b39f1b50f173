pub mod payment_plans;
pub mod payments;
pub mod webhooks;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/payments", payments::router())
        .nest("/payment-plans", payment_plans::router())
        .nest("/webhooks", webhooks::router())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
