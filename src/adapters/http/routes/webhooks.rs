use axum::{
    Json, Router, body::Bytes, extract::State, http::HeaderMap, response::IntoResponse,
    routing::post,
};

use crate::{adapters::http::app_state::AppState, app_error::AppResult};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(handle_webhook))
}

/// POST /webhooks
///
/// The body is taken as raw bytes: the signature covers them exactly.
async fn handle_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    // A missing header fails verification like any other bad signature
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let ack = app_state
        .webhook_use_cases
        .handle(&body, signature)
        .await?;

    Ok(Json(ack))
}
