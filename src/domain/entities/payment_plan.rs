use serde::Serialize;
use uuid::Uuid;

use super::payment_intent::PaymentIntentRecord;

const PLAN_ID_PREFIX: &str = "plan_";

/// Identifier of a payment plan, generated once per plan creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    /// A fresh, globally unique plan id (`plan_` followed by 32 hex chars)
    pub fn generate() -> Self {
        Self(format!("{}{}", PLAN_ID_PREFIX, Uuid::new_v4().simple()))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated request to split a charge into installments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlanRequest {
    /// Total amount in the currency's minor unit
    pub total_amount: i64,
    pub currency: String,
    pub installment_count: i64,
    pub customer_id: String,
    pub payment_method_id: String,
    pub description: String,
}

/// One scheduled charge within a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installment {
    /// 1-based position in the plan
    pub sequence: u32,
    pub total_installments: u32,
    pub plan_id: PlanId,
    pub amount: i64,
    pub description: String,
}

impl Installment {
    pub fn is_first(&self) -> bool {
        self.sequence == 1
    }

    pub fn describe(base: &str, sequence: u32, total_installments: u32) -> String {
        format!(
            "{} - Installment {} of {}",
            base, sequence, total_installments
        )
    }
}

/// A fully created plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanResult {
    pub plan_id: PlanId,
    pub number_of_installments: u32,
    /// Base installment amount; the last installment may carry a remainder on top
    pub installment_amount: i64,
    pub installments: Vec<PaymentIntentRecord>,
}
