use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use validator::Validate;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::{
        helpers::installment_split::MAX_INSTALLMENTS,
        validators::{validate_currency, validate_object_id, validate_request},
    },
    domain::entities::payment_plan::PaymentPlanRequest,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/create", post(create_plan))
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Deserialize, Validate)]
struct CreatePlanPayload {
    #[validate(range(min = 1, message = "Total amount must be greater than 0"))]
    total_amount: i64,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "validate_currency"))]
    currency: String,
    #[validate(range(
        min = 1,
        max = MAX_INSTALLMENTS,
        message = "Number of installments must be between 1 and 120"
    ))]
    number_of_installments: i64,
    #[validate(custom(function = "validate_object_id"))]
    customer_id: String,
    #[validate(custom(function = "validate_object_id"))]
    payment_method_id: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    description: String,
}

/// POST /payment-plans/create
///
/// 200 with every installment when the plan completes; 502 `PLAN_INCOMPLETE`
/// listing the intents that were created when it stops part way.
async fn create_plan(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePlanPayload>,
) -> AppResult<impl IntoResponse> {
    validate_request(&payload)?;

    let outcome = app_state
        .payment_plan_use_cases
        .create_plan(PaymentPlanRequest {
            total_amount: payload.total_amount,
            currency: payload.currency,
            installment_count: payload.number_of_installments,
            customer_id: payload.customer_id,
            payment_method_id: payload.payment_method_id,
            description: payload.description,
        })
        .await?;

    Ok(Json(outcome.into_result()?))
}
