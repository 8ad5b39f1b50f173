//! Test app state builder for HTTP-level testing.
//!
//! Wires the real use cases onto a `RecordingGateway` and a webhook verifier
//! keyed with `TEST_WEBHOOK_SECRET`, so route tests exercise everything but
//! the network.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::payment_gateway::PaymentGatewayPort,
        use_cases::{
            payment_plan::PaymentPlanUseCases, payments::PaymentUseCases,
            webhook::WebhookUseCases,
        },
    },
    infra::{
        config::AppConfig,
        webhook_verifier::{DEFAULT_TOLERANCE_SECS, WebhookVerifier},
    },
    test_utils::{RecordingGateway, TEST_WEBHOOK_SECRET},
};

pub struct TestAppStateBuilder {
    gateway: Arc<RecordingGateway>,
    webhook_secret: String,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            gateway: Arc::new(RecordingGateway::new()),
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<RecordingGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = secret.to_string();
        self
    }

    pub fn build(self) -> AppState {
        let config = AppConfig {
            stripe_secret_key: SecretString::new("sk_test_unused".into()),
            stripe_webhook_secret: SecretString::new(self.webhook_secret.clone().into()),
            stripe_api_base: Url::parse("http://127.0.0.1:9/v1").unwrap(),
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            gateway_timeout: Duration::from_secs(5),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            log_file: None,
        };

        let gateway = self.gateway as Arc<dyn PaymentGatewayPort>;
        let verifier = Arc::new(WebhookVerifier::new(
            SecretString::new(self.webhook_secret.into()),
            config.webhook_tolerance_secs,
        ));

        AppState {
            config: Arc::new(config),
            payment_use_cases: Arc::new(PaymentUseCases::new(gateway.clone())),
            payment_plan_use_cases: Arc::new(PaymentPlanUseCases::new(gateway)),
            webhook_use_cases: Arc::new(WebhookUseCases::new(verifier)),
        }
    }
}
