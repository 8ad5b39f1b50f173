pub mod payment_plan;
pub mod payments;
pub mod reconciliation;
pub mod webhook;
