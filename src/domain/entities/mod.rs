pub mod intent_status;
pub mod payment_intent;
pub mod payment_method;
pub mod payment_plan;
pub mod plan_correlation;
pub mod refund;
pub mod webhook_event;
