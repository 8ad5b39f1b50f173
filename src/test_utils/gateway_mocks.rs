//! In-memory payment gateway that records every call.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    application::ports::payment_gateway::{
        CreateIntentParams, GatewayError, PaymentGatewayPort, RefundParams,
    },
    domain::entities::{
        intent_status::IntentStatus, payment_intent::PaymentIntentRecord,
        payment_method::PaymentMethodRecord, refund::RefundRecord,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreateIntent(CreateIntentParams),
    ConfirmIntent {
        payment_intent_id: String,
        payment_method_id: String,
    },
    CreateRefund(RefundParams),
    CreatePaymentMethod {
        card_token: String,
    },
}

// ============================================================================
// RecordingGateway
// ============================================================================

/// Gateway double with scripted failures.
///
/// Created intents get ids `pi_test_1`, `pi_test_2`, ... in call order.
/// Intents created with a payment method start in `requires_confirmation`,
/// the rest in `requires_payment_method`; confirming moves to `succeeded`.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    intents: Mutex<HashMap<String, PaymentIntentRecord>>,
    /// Keyed by 1-based create_intent call number
    create_failures: Mutex<HashMap<usize, GatewayError>>,
    confirm_failure: Mutex<Option<GatewayError>>,
    refund_failure: Mutex<Option<GatewayError>>,
    payment_method_failure: Mutex<Option<GatewayError>>,
    /// Status returned for intents created with a payment method
    charged_on_create_status: Mutex<Option<IntentStatus>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th create_intent call (1-based)
    pub fn fail_create_intent_on(self, n: usize, error: GatewayError) -> Self {
        self.create_failures.lock().unwrap().insert(n, error);
        self
    }

    pub fn fail_confirm_with(self, error: GatewayError) -> Self {
        *self.confirm_failure.lock().unwrap() = Some(error);
        self
    }

    pub fn fail_refund_with(self, error: GatewayError) -> Self {
        *self.refund_failure.lock().unwrap() = Some(error);
        self
    }

    pub fn fail_payment_method_with(self, error: GatewayError) -> Self {
        *self.payment_method_failure.lock().unwrap() = Some(error);
        self
    }

    /// Simulate a processor that charges the attached method at creation time
    pub fn charge_on_create(self, status: IntentStatus) -> Self {
        *self.charged_on_create_status.lock().unwrap() = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_intent_calls(&self) -> Vec<CreateIntentParams> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::CreateIntent(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    pub fn confirm_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::ConfirmIntent {
                    payment_intent_id,
                    payment_method_id,
                } => Some((payment_intent_id, payment_method_id)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GatewayCall) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }
}

#[async_trait]
impl PaymentGatewayPort for RecordingGateway {
    async fn create_intent(
        &self,
        params: &CreateIntentParams,
    ) -> Result<PaymentIntentRecord, GatewayError> {
        self.record(GatewayCall::CreateIntent(params.clone()));
        let create_number = self.create_intent_calls().len();

        if let Some(error) = self.create_failures.lock().unwrap().get(&create_number) {
            return Err(error.clone());
        }

        let status = match (&params.payment_method_id, *self.charged_on_create_status.lock().unwrap()) {
            (Some(_), Some(status)) => status,
            (Some(_), None) => IntentStatus::RequiresConfirmation,
            (None, _) => IntentStatus::RequiresPaymentMethod,
        };

        let id = format!("pi_test_{}", create_number);
        let intent = PaymentIntentRecord {
            payment_intent_id: id.clone(),
            client_secret: Some(format!("{}_secret_test", id)),
            status,
            amount: params.amount,
            currency: params.currency.clone(),
        };
        self.intents.lock().unwrap().insert(id, intent.clone());
        Ok(intent)
    }

    async fn confirm_intent(
        &self,
        payment_intent_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentIntentRecord, GatewayError> {
        self.record(GatewayCall::ConfirmIntent {
            payment_intent_id: payment_intent_id.to_string(),
            payment_method_id: payment_method_id.to_string(),
        });

        if let Some(error) = self.confirm_failure.lock().unwrap().clone() {
            return Err(error);
        }

        let mut intents = self.intents.lock().unwrap();
        let intent = intents
            .get_mut(payment_intent_id)
            .ok_or_else(|| GatewayError::Rejected {
                status: 404,
                kind: "invalid_request_error".into(),
                code: Some("resource_missing".into()),
                decline_code: None,
                message: Some(format!("No such payment_intent: '{}'", payment_intent_id)),
            })?;
        intent.status = IntentStatus::Succeeded;
        Ok(intent.clone())
    }

    async fn create_refund(&self, params: &RefundParams) -> Result<RefundRecord, GatewayError> {
        let n = self.record(GatewayCall::CreateRefund(params.clone()));

        if let Some(error) = self.refund_failure.lock().unwrap().clone() {
            return Err(error);
        }

        let (intent_amount, currency) = self
            .intents
            .lock()
            .unwrap()
            .get(&params.payment_intent_id)
            .map(|i| (i.amount, i.currency.clone()))
            .unwrap_or((0, "usd".to_string()));

        Ok(RefundRecord {
            refund_id: format!("re_test_{}", n),
            status: Some("succeeded".into()),
            amount: params.amount.unwrap_or(intent_amount),
            currency,
        })
    }

    async fn create_payment_method(
        &self,
        card_token: &str,
    ) -> Result<PaymentMethodRecord, GatewayError> {
        let n = self.record(GatewayCall::CreatePaymentMethod {
            card_token: card_token.to_string(),
        });

        if let Some(error) = self.payment_method_failure.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(PaymentMethodRecord {
            payment_method_id: format!("pm_test_{}", n),
            card_brand: Some("visa".into()),
            card_last4: Some("4242".into()),
            expiry_month: Some(12),
            expiry_year: Some(2030),
        })
    }
}

/// A card decline as the processor reports it
pub fn card_declined() -> GatewayError {
    GatewayError::Rejected {
        status: 402,
        kind: "card_error".into(),
        code: Some("card_declined".into()),
        decline_code: Some("generic_decline".into()),
        message: Some("Your card was declined.".into()),
    }
}
