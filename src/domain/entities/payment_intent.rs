use serde::{Deserialize, Serialize};

use super::intent_status::IntentStatus;

/// Whether funds are taken on confirmation or reserved for a later capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    Automatic,
    Manual,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Automatic => "automatic",
            CaptureMode::Manual => "manual",
        }
    }
}

/// How a payment method attached to an intent may be reused later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FutureUsage {
    OffSession,
    OnSession,
}

impl FutureUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FutureUsage::OffSession => "off_session",
            FutureUsage::OnSession => "on_session",
        }
    }
}

/// A payment intent as returned to API callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntentRecord {
    pub payment_intent_id: String,
    /// Secret handed to the client for client-side confirmation
    pub client_secret: Option<String>,
    pub status: IntentStatus,
    pub amount: i64,
    pub currency: String,
}
