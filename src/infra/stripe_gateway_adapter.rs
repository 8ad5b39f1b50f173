use async_trait::async_trait;

use crate::{
    application::ports::payment_gateway::{
        CreateIntentParams, GatewayError, PaymentGatewayPort, RefundParams,
    },
    domain::entities::{
        intent_status::IntentStatus, payment_intent::PaymentIntentRecord,
        payment_method::PaymentMethodRecord, refund::RefundRecord,
    },
    infra::stripe_client::{StripeClient, StripePaymentIntent, StripePaymentMethod, StripeRefund},
};

/// Adapter that wraps StripeClient to implement PaymentGatewayPort.
pub struct StripeGatewayAdapter {
    client: StripeClient,
}

impl StripeGatewayAdapter {
    pub fn new(client: StripeClient) -> Self {
        Self { client }
    }

    fn map_intent(intent: StripePaymentIntent) -> PaymentIntentRecord {
        PaymentIntentRecord {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            status: IntentStatus::from_stripe_status(&intent.status),
            amount: intent.amount,
            currency: intent.currency,
        }
    }

    fn map_refund(refund: StripeRefund) -> RefundRecord {
        RefundRecord {
            refund_id: refund.id,
            status: refund.status,
            amount: refund.amount,
            currency: refund.currency,
        }
    }

    fn map_payment_method(method: StripePaymentMethod) -> PaymentMethodRecord {
        let card = method.card;
        PaymentMethodRecord {
            payment_method_id: method.id,
            card_brand: card.as_ref().and_then(|c| c.brand.clone()),
            card_last4: card.as_ref().and_then(|c| c.last4.clone()),
            expiry_month: card.as_ref().and_then(|c| c.exp_month),
            expiry_year: card.as_ref().and_then(|c| c.exp_year),
        }
    }
}

#[async_trait]
impl PaymentGatewayPort for StripeGatewayAdapter {
    async fn create_intent(
        &self,
        params: &CreateIntentParams,
    ) -> Result<PaymentIntentRecord, GatewayError> {
        self.client
            .create_payment_intent(params)
            .await
            .map(Self::map_intent)
    }

    async fn confirm_intent(
        &self,
        payment_intent_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentIntentRecord, GatewayError> {
        self.client
            .confirm_payment_intent(payment_intent_id, payment_method_id)
            .await
            .map(Self::map_intent)
    }

    async fn create_refund(&self, params: &RefundParams) -> Result<RefundRecord, GatewayError> {
        self.client
            .create_refund(params)
            .await
            .map(Self::map_refund)
    }

    async fn create_payment_method(
        &self,
        card_token: &str,
    ) -> Result<PaymentMethodRecord, GatewayError> {
        self.client
            .create_card_payment_method(card_token)
            .await
            .map(Self::map_payment_method)
    }
}
