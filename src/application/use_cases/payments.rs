use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        CreateIntentParams, GatewayOperation, PaymentGatewayPort, RefundParams,
    },
    domain::entities::{
        payment_intent::{CaptureMode, FutureUsage, PaymentIntentRecord},
        payment_method::PaymentMethodRecord,
        refund::{RefundReason, RefundRecord},
    },
};

/// A single charge, outside of any plan
#[derive(Debug, Clone, Default)]
pub struct CreateIntentInput {
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub customer_id: Option<String>,
    pub metadata: HashMap<String, String>,
}

pub struct PaymentUseCases {
    gateway: Arc<dyn PaymentGatewayPort>,
}

impl PaymentUseCases {
    pub fn new(gateway: Arc<dyn PaymentGatewayPort>) -> Self {
        Self { gateway }
    }

    /// Create an intent that charges automatically once confirmed and keeps
    /// the method usable off-session
    #[instrument(skip(self, input), fields(amount = input.amount))]
    pub async fn create_intent(&self, input: CreateIntentInput) -> AppResult<PaymentIntentRecord> {
        if input.amount <= 0 {
            return Err(AppError::InvalidInput(
                "Amount must be greater than 0".into(),
            ));
        }

        let params = CreateIntentParams {
            amount: input.amount,
            currency: input.currency.trim().to_lowercase(),
            customer_id: input.customer_id.filter(|c| !c.trim().is_empty()),
            payment_method_id: None,
            description: input.description,
            capture_mode: CaptureMode::Automatic,
            metadata: input.metadata,
            setup_future_usage: Some(FutureUsage::OffSession),
            idempotency_key: None,
        };

        let intent = self
            .gateway
            .create_intent(&params)
            .await
            .map_err(|e| AppError::gateway(GatewayOperation::CreateIntent, e))?;

        info!(payment_intent_id = %intent.payment_intent_id, status = %intent.status, "Payment intent created");
        Ok(intent)
    }

    #[instrument(skip(self))]
    pub async fn confirm_intent(
        &self,
        payment_intent_id: &str,
        payment_method_id: &str,
    ) -> AppResult<PaymentIntentRecord> {
        let intent = self
            .gateway
            .confirm_intent(payment_intent_id, payment_method_id)
            .await
            .map_err(|e| AppError::gateway(GatewayOperation::ConfirmIntent, e))?;

        info!(status = %intent.status, "Payment intent confirmed");
        Ok(intent)
    }

    /// Refund an intent, fully when `amount` is `None`.
    ///
    /// Reasons the processor does not know are dropped, not rejected.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        payment_intent_id: &str,
        amount: Option<i64>,
        reason: Option<&str>,
    ) -> AppResult<RefundRecord> {
        if matches!(amount, Some(a) if a <= 0) {
            return Err(AppError::InvalidInput(
                "Refund amount must be greater than 0".into(),
            ));
        }

        let params = RefundParams {
            payment_intent_id: payment_intent_id.to_string(),
            amount,
            reason: reason.and_then(RefundReason::from_caller_input),
        };

        let refund = self
            .gateway
            .create_refund(&params)
            .await
            .map_err(|e| AppError::gateway(GatewayOperation::CreateRefund, e))?;

        info!(refund_id = %refund.refund_id, amount = refund.amount, "Refund created");
        Ok(refund)
    }

    #[instrument(skip(self, card_token))]
    pub async fn create_payment_method(&self, card_token: &str) -> AppResult<PaymentMethodRecord> {
        let method = self
            .gateway
            .create_payment_method(card_token)
            .await
            .map_err(|e| AppError::gateway(GatewayOperation::CreatePaymentMethod, e))?;

        info!(payment_method_id = %method.payment_method_id, "Payment method created");
        Ok(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::payment_gateway::GatewayError;
    use crate::domain::entities::intent_status::IntentStatus;
    use crate::test_utils::{GatewayCall, RecordingGateway, card_declined};

    fn use_cases(gateway: &Arc<RecordingGateway>) -> PaymentUseCases {
        PaymentUseCases::new(gateway.clone())
    }

    #[tokio::test]
    async fn create_intent_uses_automatic_capture_and_off_session() {
        let gateway = Arc::new(RecordingGateway::new());

        let intent = use_cases(&gateway)
            .create_intent(CreateIntentInput {
                amount: 2500,
                currency: "USD".into(),
                description: Some("Order #42".into()),
                customer_id: Some("cus_1".into()),
                metadata: HashMap::from([("order_id".to_string(), "42".to_string())]),
            })
            .await
            .unwrap();

        assert_eq!(intent.amount, 2500);
        assert_eq!(intent.status, IntentStatus::RequiresPaymentMethod);

        let params = &gateway.create_intent_calls()[0];
        assert_eq!(params.capture_mode, CaptureMode::Automatic);
        assert_eq!(params.setup_future_usage, Some(FutureUsage::OffSession));
        assert_eq!(params.currency, "usd");
        assert_eq!(params.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(params.metadata["order_id"], "42");
    }

    #[tokio::test]
    async fn blank_customer_is_omitted() {
        let gateway = Arc::new(RecordingGateway::new());

        use_cases(&gateway)
            .create_intent(CreateIntentInput {
                amount: 100,
                currency: "usd".into(),
                customer_id: Some("  ".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(gateway.create_intent_calls()[0].customer_id, None);
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected_without_gateway_call() {
        let gateway = Arc::new(RecordingGateway::new());

        let result = use_cases(&gateway)
            .create_intent(CreateIntentInput {
                amount: 0,
                currency: "usd".into(),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn confirm_moves_intent_to_succeeded() {
        let gateway = Arc::new(RecordingGateway::new());
        let use_cases = use_cases(&gateway);
        let intent = use_cases
            .create_intent(CreateIntentInput {
                amount: 100,
                currency: "usd".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let confirmed = use_cases
            .confirm_intent(&intent.payment_intent_id, "pm_card_visa")
            .await
            .unwrap();

        assert_eq!(confirmed.status, IntentStatus::Succeeded);
    }

    #[tokio::test]
    async fn declined_confirmation_is_a_gateway_error() {
        let gateway = Arc::new(RecordingGateway::new().fail_confirm_with(card_declined()));

        let result = use_cases(&gateway)
            .confirm_intent("pi_missing", "pm_card_visa")
            .await;

        match result {
            Err(AppError::Gateway { operation, source }) => {
                assert_eq!(operation, GatewayOperation::ConfirmIntent);
                assert_eq!(source.public_message(), Some("Your card was declined."));
            }
            other => panic!("expected gateway error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refund_normalizes_known_reasons_and_drops_unknown_ones() {
        let gateway = Arc::new(RecordingGateway::new());
        let use_cases = use_cases(&gateway);

        use_cases
            .refund("pi_1", Some(50), Some("Requested_By_Customer"))
            .await
            .unwrap();
        use_cases
            .refund("pi_1", None, Some("changed my mind"))
            .await
            .unwrap();

        let reasons: Vec<_> = gateway
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::CreateRefund(params) => Some((params.amount, params.reason)),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                (Some(50), Some(RefundReason::RequestedByCustomer)),
                (None, None)
            ]
        );
    }

    #[tokio::test]
    async fn refund_rejects_non_positive_amount() {
        let gateway = Arc::new(RecordingGateway::new());

        let result = use_cases(&gateway).refund("pi_1", Some(0), None).await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn refund_timeout_is_retryable() {
        let gateway = Arc::new(RecordingGateway::new().fail_refund_with(GatewayError::Timeout));

        let err = use_cases(&gateway)
            .refund("pi_1", None, None)
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn creates_card_payment_method_from_token() {
        let gateway = Arc::new(RecordingGateway::new());

        let method = use_cases(&gateway)
            .create_payment_method("tok_visa")
            .await
            .unwrap();

        assert_eq!(method.card_brand.as_deref(), Some("visa"));
        assert_eq!(method.card_last4.as_deref(), Some("4242"));
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::CreatePaymentMethod {
                card_token: "tok_visa".into()
            }]
        );
    }
}
