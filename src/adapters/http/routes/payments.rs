use std::collections::HashMap;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use validator::Validate;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::{
        use_cases::payments::CreateIntentInput,
        validators::{validate_currency, validate_object_id, validate_request},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-intent", post(create_intent))
        .route("/confirm-intent", post(confirm_intent))
        .route("/refund", post(refund))
        .route("/create-payment-method", post(create_payment_method))
}

fn default_currency() -> String {
    "usd".to_string()
}

// ============================================================================
// POST /payments/create-intent
// ============================================================================

#[derive(Deserialize, Validate)]
struct CreateIntentPayload {
    #[validate(range(min = 1, message = "Amount must be greater than 0"))]
    amount: i64,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "validate_currency"))]
    currency: String,
    #[validate(length(max = 1000))]
    description: Option<String>,
    customer_id: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

async fn create_intent(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateIntentPayload>,
) -> AppResult<impl IntoResponse> {
    validate_request(&payload)?;

    let intent = app_state
        .payment_use_cases
        .create_intent(CreateIntentInput {
            amount: payload.amount,
            currency: payload.currency,
            description: payload.description,
            customer_id: payload.customer_id,
            metadata: payload.metadata,
        })
        .await?;

    Ok(Json(intent))
}

// ============================================================================
// POST /payments/confirm-intent
// ============================================================================

#[derive(Deserialize, Validate)]
struct ConfirmIntentPayload {
    #[validate(custom(function = "validate_object_id", message = "Payment intent ID is required"))]
    payment_intent_id: String,
    #[validate(custom(function = "validate_object_id", message = "Payment method ID is required"))]
    payment_method_id: String,
}

async fn confirm_intent(
    State(app_state): State<AppState>,
    Json(payload): Json<ConfirmIntentPayload>,
) -> AppResult<impl IntoResponse> {
    validate_request(&payload)?;

    let intent = app_state
        .payment_use_cases
        .confirm_intent(&payload.payment_intent_id, &payload.payment_method_id)
        .await?;

    Ok(Json(intent))
}

// ============================================================================
// POST /payments/refund
// ============================================================================

#[derive(Deserialize, Validate)]
struct RefundPayload {
    #[validate(custom(function = "validate_object_id", message = "Payment intent ID is required"))]
    payment_intent_id: String,
    #[validate(range(min = 1, message = "Refund amount must be greater than 0"))]
    amount: Option<i64>,
    reason: Option<String>,
}

async fn refund(
    State(app_state): State<AppState>,
    Json(payload): Json<RefundPayload>,
) -> AppResult<impl IntoResponse> {
    validate_request(&payload)?;

    let refund = app_state
        .payment_use_cases
        .refund(
            &payload.payment_intent_id,
            payload.amount,
            payload.reason.as_deref(),
        )
        .await?;

    Ok(Json(refund))
}

// ============================================================================
// POST /payments/create-payment-method
// ============================================================================

#[derive(Deserialize, Validate)]
struct CreatePaymentMethodPayload {
    #[validate(length(min = 1, max = 255, message = "Payment token is required"))]
    token: String,
}

async fn create_payment_method(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePaymentMethodPayload>,
) -> AppResult<impl IntoResponse> {
    validate_request(&payload)?;

    let method = app_state
        .payment_use_cases
        .create_payment_method(payload.token.trim())
        .await?;

    Ok(Json(method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::application::ports::payment_gateway::GatewayError;
    use crate::test_utils::{RecordingGateway, TestAppStateBuilder, card_declined};

    fn build_test_server(gateway: Arc<RecordingGateway>) -> TestServer {
        let app_state = TestAppStateBuilder::new().with_gateway(gateway).build();
        TestServer::new(router().with_state(app_state)).unwrap()
    }

    #[tokio::test]
    async fn create_intent_returns_intent() {
        let gateway = Arc::new(RecordingGateway::new());
        let server = build_test_server(gateway.clone());

        let response = server
            .post("/create-intent")
            .json(&json!({ "amount": 1999, "description": "Mug" }))
            .await;

        response.assert_status(StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["payment_intent_id"], "pi_test_1");
        assert_eq!(body["client_secret"], "pi_test_1_secret_test");
        assert_eq!(body["status"], "requires_payment_method");
        assert_eq!(body["amount"], 1999);
        assert_eq!(body["currency"], "usd");
        assert_eq!(gateway.create_intent_calls().len(), 1);
    }

    #[tokio::test]
    async fn create_intent_zero_amount_returns_400() {
        let gateway = Arc::new(RecordingGateway::new());
        let server = build_test_server(gateway.clone());

        let response = server
            .post("/create-intent")
            .json(&json!({ "amount": 0, "currency": "usd" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn create_intent_bad_currency_returns_400() {
        let server = build_test_server(Arc::new(RecordingGateway::new()));

        let response = server
            .post("/create-intent")
            .json(&json!({ "amount": 100, "currency": "dollars" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn confirm_intent_missing_method_returns_400() {
        let server = build_test_server(Arc::new(RecordingGateway::new()));

        let response = server
            .post("/confirm-intent")
            .json(&json!({ "payment_intent_id": "pi_1", "payment_method_id": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("payment_method_id:")
        );
    }

    #[tokio::test]
    async fn confirm_intent_decline_returns_502_with_card_message() {
        let gateway = Arc::new(RecordingGateway::new().fail_confirm_with(card_declined()));
        let server = build_test_server(gateway);

        let response = server
            .post("/confirm-intent")
            .json(&json!({ "payment_intent_id": "pi_1", "payment_method_id": "pm_1" }))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body = response.json::<Value>();
        assert_eq!(body["code"], "GATEWAY_ERROR");
        assert_eq!(body["message"], "Your card was declined.");
    }

    #[tokio::test]
    async fn refund_timeout_returns_504() {
        let gateway = Arc::new(RecordingGateway::new().fail_refund_with(GatewayError::Timeout));
        let server = build_test_server(gateway);

        let response = server
            .post("/refund")
            .json(&json!({ "payment_intent_id": "pi_1" }))
            .await;

        response.assert_status(StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(response.json::<Value>()["code"], "GATEWAY_TIMEOUT");
    }

    #[tokio::test]
    async fn refund_returns_refund_record() {
        let server = build_test_server(Arc::new(RecordingGateway::new()));

        let response = server
            .post("/refund")
            .json(&json!({ "payment_intent_id": "pi_1", "amount": 250, "reason": "duplicate" }))
            .await;

        response.assert_status(StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["refund_id"], "re_test_1");
        assert_eq!(body["amount"], 250);
    }

    #[tokio::test]
    async fn create_payment_method_requires_token() {
        let server = build_test_server(Arc::new(RecordingGateway::new()));

        let response = server
            .post("/create-payment-method")
            .json(&json!({ "token": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_payment_method_returns_card_details() {
        let server = build_test_server(Arc::new(RecordingGateway::new()));

        let response = server
            .post("/create-payment-method")
            .json(&json!({ "token": "tok_visa" }))
            .await;

        response.assert_status(StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["payment_method_id"], "pm_test_1");
        assert_eq!(body["card_last4"], "4242");
        assert_eq!(body["expiry_year"], 2030);
    }
}
