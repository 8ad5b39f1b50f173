//! Test data factories.

use serde_json::{Value, json};

use crate::{
    domain::entities::payment_plan::PaymentPlanRequest,
    infra::webhook_verifier::sign_payload,
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a valid plan request, then let the caller override fields.
pub fn create_test_plan_request<F>(modify: F) -> PaymentPlanRequest
where
    F: FnOnce(&mut PaymentPlanRequest),
{
    let mut request = PaymentPlanRequest {
        total_amount: 300,
        currency: "usd".to_string(),
        installment_count: 3,
        customer_id: "cus_test".to_string(),
        payment_method_id: "pm_card_visa".to_string(),
        description: "Test order".to_string(),
    };
    modify(&mut request);
    request
}

/// Serialized event envelope as the processor would send it
pub fn create_test_event_body(event_id: &str, event_type: &str, object: Value) -> String {
    json!({
        "id": event_id,
        "object": "event",
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": object }
    })
    .to_string()
}

/// Payment intent object carrying the given metadata
pub fn create_test_intent_object(intent_id: &str, metadata: Value) -> Value {
    json!({
        "id": intent_id,
        "object": "payment_intent",
        "amount": 100,
        "currency": "usd",
        "status": "succeeded",
        "metadata": metadata,
    })
}

/// Signature header for `body` signed now with the test secret
pub fn sign_test_body(body: &str) -> String {
    sign_payload(
        TEST_WEBHOOK_SECRET,
        chrono::Utc::now().timestamp(),
        body.as_bytes(),
    )
}
