use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::app_error::AppResult;
use crate::application::use_cases::reconciliation::{
    PlanLink, ReconciliationKind, ReconciliationOutcome, WebhookAck, reconcile,
};
use crate::infra::webhook_verifier::WebhookVerifier;

pub struct WebhookUseCases {
    verifier: Arc<WebhookVerifier>,
}

impl WebhookUseCases {
    pub fn new(verifier: Arc<WebhookVerifier>) -> Self {
        Self { verifier }
    }

    /// Verify, decode and reconcile one webhook delivery.
    ///
    /// Verification failures are errors so the processor redelivers; any
    /// verified event is acknowledged, including ones with bad plan metadata.
    #[instrument(skip_all)]
    pub async fn handle(&self, raw_body: &[u8], signature_header: &str) -> AppResult<WebhookAck> {
        let event = self.verifier.verify(raw_body, signature_header).map_err(|e| {
            warn!(error = %e, "Rejected webhook delivery");
            e
        })?;

        let outcome = reconcile(&event);
        log_outcome(&outcome);

        Ok(WebhookAck::from(&outcome))
    }
}

fn log_outcome(outcome: &ReconciliationOutcome) {
    let event_id = outcome.event_id.as_str();
    let event_type = outcome.event_type.as_str();

    if let Some(PlanLink::Invalid(err)) = outcome.plan() {
        warn!(event_id, event_type, error = %err, "Event carries invalid plan correlation metadata");
        return;
    }

    match &outcome.kind {
        ReconciliationKind::IntentSucceeded {
            payment_intent_id,
            amount,
            plan,
            ..
        } => match plan.installment() {
            Some(c) => info!(
                event_id,
                payment_intent_id = %payment_intent_id,
                plan_id = %c.plan_id,
                installment_number = c.installment_number,
                total_installments = c.total_installments,
                final_installment = c.is_final_installment(),
                "Installment payment succeeded"
            ),
            None => info!(
                event_id,
                payment_intent_id = %payment_intent_id,
                amount,
                "Payment succeeded"
            ),
        },
        ReconciliationKind::IntentFailed {
            payment_intent_id,
            reason,
            decline_code,
            plan,
        } => match plan.installment() {
            Some(c) => warn!(
                event_id,
                payment_intent_id = %payment_intent_id,
                plan_id = %c.plan_id,
                installment_number = c.installment_number,
                total_installments = c.total_installments,
                reason = reason.as_deref().unwrap_or("unknown"),
                decline_code = decline_code.as_deref(),
                "Installment payment failed"
            ),
            None => info!(
                event_id,
                payment_intent_id = %payment_intent_id,
                reason = reason.as_deref().unwrap_or("unknown"),
                "Payment failed"
            ),
        },
        ReconciliationKind::ChargeRefunded {
            charge_id,
            payment_intent_id,
            amount_refunded,
            plan,
            ..
        } => info!(
            event_id,
            charge_id = %charge_id,
            payment_intent_id = payment_intent_id.as_deref(),
            amount_refunded,
            plan_id = plan.installment().map(|c| c.plan_id.as_str()),
            "Charge refunded"
        ),
        ReconciliationKind::Acknowledged => {
            info!(event_id, event_type, "Unhandled event type acknowledged")
        }
    }
}
