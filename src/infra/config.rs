use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::infra::{error::InfraError, http_client::DEFAULT_REQUEST_TIMEOUT};

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

pub struct AppConfig {
    /// Processor API key, sent as basic auth on every gateway call
    pub stripe_secret_key: SecretString,
    /// Shared secret for webhook signatures
    pub stripe_webhook_secret: SecretString,
    pub stripe_api_base: Url,
    /// Maximum age, in either direction, of a webhook signature timestamp
    pub webhook_tolerance_secs: i64,
    pub gateway_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// JSON log file; console only when unset
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let stripe_secret_key = SecretString::new(get_env::<String>("STRIPE_SECRET_KEY").into());
        let stripe_webhook_secret =
            SecretString::new(get_env::<String>("STRIPE_WEBHOOK_SECRET").into());

        let stripe_api_base: Url =
            get_env_default("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE.to_string())
                .parse()
                .map_err(|e: url::ParseError| InfraError::ConfigInvalid {
                    var: "STRIPE_API_BASE",
                    reason: e.to_string(),
                })?;

        let webhook_tolerance_secs: i64 = get_env_default("WEBHOOK_TOLERANCE_SECS", 300);
        if webhook_tolerance_secs <= 0 {
            return Err(InfraError::ConfigInvalid {
                var: "WEBHOOK_TOLERANCE_SECS",
                reason: "must be greater than 0".into(),
            });
        }

        let gateway_timeout_secs: u64 =
            get_env_default("GATEWAY_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT.as_secs());
        if gateway_timeout_secs == 0 {
            return Err(InfraError::ConfigInvalid {
                var: "GATEWAY_TIMEOUT_SECS",
                reason: "must be greater than 0".into(),
            });
        }

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| InfraError::ConfigInvalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid {
                    var: "CORS_ORIGIN",
                    reason: "not a valid header value".into(),
                })?;

        let log_file: Option<String> = std::env::var("LOG_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_api_base,
            webhook_tolerance_secs,
            gateway_timeout: Duration::from_secs(gateway_timeout_secs),
            bind_addr,
            cors_origin,
            log_file,
        })
    }
}
