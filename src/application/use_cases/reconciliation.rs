//! Maps verified processor events onto what they mean for this service.
//!
//! Reconciliation is a pure function of the event: redelivering the same
//! event yields the same outcome, so at-least-once delivery needs no dedupe.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::entities::{
    plan_correlation::{CorrelationError, PlanCorrelation},
    webhook_event::{EventKind, IntentObject, VerifiedEvent},
};

/// How an intent or charge relates to a payment plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanLink {
    NotPlanRelated,
    Installment(PlanCorrelation),
    /// Metadata claims a plan but does not decode
    Invalid(CorrelationError),
}

impl PlanLink {
    fn from_metadata(metadata: &HashMap<String, String>) -> Self {
        match PlanCorrelation::from_metadata(metadata) {
            Ok(Some(correlation)) => PlanLink::Installment(correlation),
            Ok(None) => PlanLink::NotPlanRelated,
            Err(err) => PlanLink::Invalid(err),
        }
    }

    pub fn installment(&self) -> Option<&PlanCorrelation> {
        match self {
            PlanLink::Installment(correlation) => Some(correlation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationKind {
    IntentSucceeded {
        payment_intent_id: String,
        amount: i64,
        currency: String,
        plan: PlanLink,
    },
    IntentFailed {
        payment_intent_id: String,
        /// Processor's human-readable failure message, when it sent one
        reason: Option<String>,
        decline_code: Option<String>,
        plan: PlanLink,
    },
    ChargeRefunded {
        charge_id: String,
        payment_intent_id: Option<String>,
        amount_refunded: i64,
        currency: String,
        plan: PlanLink,
    },
    /// Event types this service takes no action on
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    pub event_id: String,
    pub event_type: String,
    pub kind: ReconciliationKind,
}

impl ReconciliationOutcome {
    pub fn plan(&self) -> Option<&PlanLink> {
        match &self.kind {
            ReconciliationKind::IntentSucceeded { plan, .. }
            | ReconciliationKind::IntentFailed { plan, .. }
            | ReconciliationKind::ChargeRefunded { plan, .. } => Some(plan),
            ReconciliationKind::Acknowledged => None,
        }
    }

    /// The event claimed plan membership with metadata that does not decode
    pub fn is_data_invalid(&self) -> bool {
        matches!(self.plan(), Some(PlanLink::Invalid(_)))
    }

    /// A plan installment could not be charged
    pub fn is_failed_installment(&self) -> bool {
        matches!(
            &self.kind,
            ReconciliationKind::IntentFailed {
                plan: PlanLink::Installment(_),
                ..
            }
        )
    }

    /// Short summary returned to the processor in the acknowledgment
    pub fn summary(&self) -> String {
        match &self.kind {
            ReconciliationKind::IntentSucceeded {
                payment_intent_id,
                plan,
                ..
            } => match plan.installment() {
                Some(c) => format!(
                    "Payment succeeded for installment {} of {} in plan {}",
                    c.installment_number, c.total_installments, c.plan_id
                ),
                None => format!("Payment succeeded: {}", payment_intent_id),
            },
            ReconciliationKind::IntentFailed {
                payment_intent_id,
                plan,
                ..
            } => match plan.installment() {
                Some(c) => format!(
                    "Payment failed for installment {} of {} in plan {}",
                    c.installment_number, c.total_installments, c.plan_id
                ),
                None => format!("Payment failed: {}", payment_intent_id),
            },
            ReconciliationKind::ChargeRefunded { charge_id, .. } => {
                format!("Charge refunded: {}", charge_id)
            }
            ReconciliationKind::Acknowledged => format!("Unhandled event type: {}", self.event_type),
        }
    }
}

/// Acknowledgment body returned for every verified webhook delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
    pub event_type: String,
}

impl From<&ReconciliationOutcome> for WebhookAck {
    fn from(outcome: &ReconciliationOutcome) -> Self {
        Self {
            success: true,
            message: outcome.summary(),
            event_type: outcome.event_type.clone(),
        }
    }
}

pub fn reconcile(event: &VerifiedEvent) -> ReconciliationOutcome {
    let kind = match &event.kind {
        EventKind::PaymentIntentSucceeded(intent) => ReconciliationKind::IntentSucceeded {
            payment_intent_id: intent.id.clone(),
            amount: intent.amount,
            currency: intent.currency.clone(),
            plan: PlanLink::from_metadata(&intent.metadata),
        },
        EventKind::PaymentIntentFailed(intent) => failed_intent(intent),
        EventKind::ChargeRefunded(charge) => ReconciliationKind::ChargeRefunded {
            charge_id: charge.id.clone(),
            payment_intent_id: charge.payment_intent.clone(),
            amount_refunded: charge.amount_refunded,
            currency: charge.currency.clone(),
            plan: PlanLink::from_metadata(&charge.metadata),
        },
        EventKind::Unrecognized { .. } => ReconciliationKind::Acknowledged,
    };

    ReconciliationOutcome {
        event_id: event.id.clone(),
        event_type: event.event_type.clone(),
        kind,
    }
}

fn failed_intent(intent: &IntentObject) -> ReconciliationKind {
    let error = intent.last_payment_error.as_ref();
    ReconciliationKind::IntentFailed {
        payment_intent_id: intent.id.clone(),
        reason: error.and_then(|e| e.message.clone()),
        decline_code: error.and_then(|e| e.decline_code.clone().or_else(|| e.code.clone())),
        plan: PlanLink::from_metadata(&intent.metadata),
    }
}
