use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        payment_plan::PaymentPlanUseCases, payments::PaymentUseCases, webhook::WebhookUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub payment_use_cases: Arc<PaymentUseCases>,
    pub payment_plan_use_cases: Arc<PaymentPlanUseCases>,
    pub webhook_use_cases: Arc<WebhookUseCases>,
}
