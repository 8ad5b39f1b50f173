use std::fs::File;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    application::ports::payment_gateway::PaymentGatewayPort,
    infra::{
        config::AppConfig, error::InfraError, http_client::try_build_client,
        stripe_client::StripeClient, stripe_gateway_adapter::StripeGatewayAdapter,
        webhook_verifier::WebhookVerifier,
    },
    use_cases::{
        payment_plan::PaymentPlanUseCases, payments::PaymentUseCases, webhook::WebhookUseCases,
    },
};

pub fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let http_client = try_build_client(config.gateway_timeout).map_err(InfraError::from)?;

    let stripe_client = StripeClient::new(
        SecretString::new(config.stripe_secret_key.expose_secret().into()),
        config.stripe_api_base.clone(),
        http_client,
    );
    let gateway = Arc::new(StripeGatewayAdapter::new(stripe_client)) as Arc<dyn PaymentGatewayPort>;

    let verifier = Arc::new(WebhookVerifier::new(
        SecretString::new(config.stripe_webhook_secret.expose_secret().into()),
        config.webhook_tolerance_secs,
    ));

    Ok(AppState {
        config: Arc::new(config),
        payment_use_cases: Arc::new(PaymentUseCases::new(gateway.clone())),
        payment_plan_use_cases: Arc::new(PaymentPlanUseCases::new(gateway)),
        webhook_use_cases: Arc::new(WebhookUseCases::new(verifier)),
    })
}

pub fn init_tracing(log_file: Option<&str>) -> Result<(), InfraError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "payment_ops=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), only when configured
    let json_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| InfraError::LogFile {
                path: path.to_string(),
                source,
            })?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(true)
                    .with_span_list(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    Ok(())
}
