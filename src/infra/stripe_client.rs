use base64::Engine;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::application::ports::payment_gateway::{CreateIntentParams, GatewayError, RefundParams};

/// Thin client for the processor's form-encoded REST API.
///
/// Credentials, base URL and timeouts are fixed at construction.
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
    base_url: Url,
}

impl StripeClient {
    pub fn new(secret_key: SecretString, base_url: Url, client: Client) -> Self {
        Self {
            client,
            secret_key,
            base_url,
        }
    }

    fn auth_header(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", self.secret_key.expose_secret()));
        format!("Basic {}", encoded)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Unreachable("processor base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ========================================================================
    // Payment Intents
    // ========================================================================

    pub async fn create_payment_intent(
        &self,
        params: &CreateIntentParams,
    ) -> Result<StripePaymentIntent, GatewayError> {
        self.post_form(
            self.endpoint(&["payment_intents"])?,
            &intent_form_params(params),
            params.idempotency_key.as_deref(),
        )
        .await
    }

    pub async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
        payment_method_id: &str,
    ) -> Result<StripePaymentIntent, GatewayError> {
        let form = vec![("payment_method".to_string(), payment_method_id.to_string())];
        self.post_form(
            self.endpoint(&["payment_intents", payment_intent_id, "confirm"])?,
            &form,
            None,
        )
        .await
    }

    // ========================================================================
    // Refunds
    // ========================================================================

    pub async fn create_refund(&self, params: &RefundParams) -> Result<StripeRefund, GatewayError> {
        self.post_form(
            self.endpoint(&["refunds"])?,
            &refund_form_params(params),
            None,
        )
        .await
    }

    // ========================================================================
    // Payment Methods
    // ========================================================================

    pub async fn create_card_payment_method(
        &self,
        card_token: &str,
    ) -> Result<StripePaymentMethod, GatewayError> {
        let form = vec![
            ("type".to_string(), "card".to_string()),
            ("card[token]".to_string(), card_token.to_string()),
        ];
        self.post_form(self.endpoint(&["payment_methods"])?, &form, None)
            .await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
        form: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, GatewayError> {
        let mut request = self
            .client
            .post(url)
            .header("Authorization", self.auth_header())
            .form(form);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        handle_response(response).await
    }
}

async fn handle_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await.map_err(map_transport_error)?;

    if !status.is_success() {
        let error = map_error_body(status.as_u16(), &body);
        if let GatewayError::Rejected { kind, code, .. } = &error {
            tracing::warn!(status = %status, kind = %kind, code = ?code, "Processor rejected request");
        }
        return Err(error);
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse processor response");
        GatewayError::Decode(e.to_string())
    })
}

/// Form fields for a payment intent creation call
pub fn intent_form_params(params: &CreateIntentParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), params.amount.to_string()),
        ("currency".to_string(), params.currency.to_lowercase()),
        (
            "capture_method".to_string(),
            params.capture_mode.as_str().to_string(),
        ),
    ];
    if let Some(customer) = &params.customer_id {
        form.push(("customer".to_string(), customer.clone()));
    }
    if let Some(method) = &params.payment_method_id {
        form.push(("payment_method".to_string(), method.clone()));
    }
    if let Some(description) = &params.description {
        form.push(("description".to_string(), description.clone()));
    }
    if let Some(usage) = params.setup_future_usage {
        form.push((
            "setup_future_usage".to_string(),
            usage.as_str().to_string(),
        ));
    }

    let mut metadata: Vec<_> = params.metadata.iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }
    form
}

pub fn refund_form_params(params: &RefundParams) -> Vec<(String, String)> {
    let mut form = vec![(
        "payment_intent".to_string(),
        params.payment_intent_id.clone(),
    )];
    if let Some(amount) = params.amount {
        form.push(("amount".to_string(), amount.to_string()));
    }
    if let Some(reason) = params.reason {
        form.push(("reason".to_string(), reason.as_str().to_string()));
    }
    form
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_decode() {
        GatewayError::Decode(e.to_string())
    } else {
        GatewayError::Unreachable(e.without_url().to_string())
    }
}

/// Map a non-2xx response body to a gateway error
pub fn map_error_body(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<StripeErrorResponse>(body) {
        Ok(StripeErrorResponse { error }) => GatewayError::Rejected {
            status,
            kind: error.error_type,
            code: error.code,
            decline_code: error.decline_code,
            message: error.message,
        },
        Err(_) => GatewayError::Rejected {
            status,
            kind: "api_error".to_string(),
            code: None,
            decline_code: None,
            message: None,
        },
    }
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeRefund {
    pub id: String,
    pub status: Option<String>,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentMethod {
    pub id: String,
    pub card: Option<StripeCard>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCard {
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<i64>,
    pub exp_year: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    code: Option<String>,
    decline_code: Option<String>,
    message: Option<String>,
}
