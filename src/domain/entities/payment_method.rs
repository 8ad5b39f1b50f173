use serde::Serialize;

/// A stored card payment method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethodRecord {
    pub payment_method_id: String,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
}
