use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::entities::{
    payment_intent::{CaptureMode, FutureUsage, PaymentIntentRecord},
    payment_method::PaymentMethodRecord,
    refund::{RefundReason, RefundRecord},
};

// ============================================================================
// Port Types - Processor-agnostic request shapes
// ============================================================================

/// Parameters for creating a payment intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIntentParams {
    pub amount: i64,
    pub currency: String,
    pub customer_id: Option<String>,
    /// Payment method to charge; `None` leaves the intent awaiting a method
    pub payment_method_id: Option<String>,
    pub description: Option<String>,
    pub capture_mode: CaptureMode,
    pub metadata: HashMap<String, String>,
    pub setup_future_usage: Option<FutureUsage>,
    /// Lets the processor collapse retried creates into one intent
    pub idempotency_key: Option<String>,
}

/// Parameters for refunding a payment intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundParams {
    pub payment_intent_id: String,
    /// Partial refund amount; `None` refunds the remaining balance
    pub amount: Option<i64>,
    pub reason: Option<RefundReason>,
}

/// Processor operations, used to tag failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    CreateIntent,
    ConfirmIntent,
    CreateRefund,
    CreatePaymentMethod,
}

impl GatewayOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayOperation::CreateIntent => "create_intent",
            GatewayOperation::ConfirmIntent => "confirm_intent",
            GatewayOperation::CreateRefund => "create_refund",
            GatewayOperation::CreatePaymentMethod => "create_payment_method",
        }
    }
}

impl std::fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure talking to the payment processor.
///
/// SECURITY: Display output never includes request bodies or credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("processor did not respond in time")]
    Timeout,

    #[error("processor unreachable: {0}")]
    Unreachable(String),

    #[error("processor rejected the request ({status}): {}", rejection_summary(.kind, .message))]
    Rejected {
        status: u16,
        kind: String,
        code: Option<String>,
        decline_code: Option<String>,
        message: Option<String>,
    },

    #[error("unexpected processor response: {0}")]
    Decode(String),
}

fn rejection_summary<'a>(kind: &'a str, message: &'a Option<String>) -> &'a str {
    message.as_deref().unwrap_or(kind)
}

impl GatewayError {
    /// Transient failures: the same request may succeed later
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Unreachable(_) => true,
            GatewayError::Rejected { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Decode(_) => false,
        }
    }

    /// Message safe to show to API callers (e.g. "Your card was declined.")
    pub fn public_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// Payment Gateway Port
// ============================================================================

/// Capability interface over the external payment processor.
///
/// Credentials and endpoints are fixed when the implementation is built;
/// nothing here reads process-wide state.
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn create_intent(
        &self,
        params: &CreateIntentParams,
    ) -> Result<PaymentIntentRecord, GatewayError>;

    async fn confirm_intent(
        &self,
        payment_intent_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentIntentRecord, GatewayError>;

    async fn create_refund(&self, params: &RefundParams) -> Result<RefundRecord, GatewayError>;

    /// Create a card payment method from a client-side token
    async fn create_payment_method(
        &self,
        card_token: &str,
    ) -> Result<PaymentMethodRecord, GatewayError>;
}
