//! Processor webhook signature verification.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>...]`, where
//! each `v1` is HMAC-SHA256 over `<t>.` followed by the raw request body.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use crate::{
    app_error::AppError,
    domain::entities::webhook_event::{VerifiedEvent, WebhookEvent},
};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook signature is invalid")]
    SignatureInvalid,

    #[error("webhook payload is malformed: {0}")]
    PayloadMalformed(String),
}

impl From<WebhookError> for AppError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::SignatureInvalid => AppError::SignatureInvalid,
            WebhookError::PayloadMalformed(detail) => AppError::PayloadMalformed(detail),
        }
    }
}

pub struct WebhookVerifier {
    secret: SecretString,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: SecretString, tolerance_secs: i64) -> Self {
        Self {
            secret,
            tolerance_secs,
        }
    }

    pub fn verify(
        &self,
        raw_body: &[u8],
        signature_header: &str,
    ) -> Result<VerifiedEvent, WebhookError> {
        self.verify_at(raw_body, signature_header, chrono::Utc::now().timestamp())
    }

    /// Verify against a fixed clock
    pub fn verify_at(
        &self,
        raw_body: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<VerifiedEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        if now.abs_diff(header.timestamp) > self.tolerance_secs.unsigned_abs() {
            tracing::debug!(
                timestamp = header.timestamp,
                now,
                tolerance_secs = self.tolerance_secs,
                "Webhook timestamp outside tolerance"
            );
            return Err(WebhookError::SignatureInvalid);
        }

        let matched = header.signatures.iter().any(|candidate| {
            let Ok(candidate) = hex::decode(candidate) else {
                return false;
            };
            signing_mac(self.secret.expose_secret(), header.timestamp_raw, raw_body)
                .verify_slice(&candidate)
                .is_ok()
        });
        if !matched {
            return Err(WebhookError::SignatureInvalid);
        }

        // Signature covers the exact bytes; decoding happens only after it checks out
        WebhookEvent::decode(raw_body)
            .map(VerifiedEvent::from_verified)
            .map_err(|e| WebhookError::PayloadMalformed(e.to_string()))
    }
}

struct SignatureHeader<'a> {
    timestamp: i64,
    timestamp_raw: &'a str,
    signatures: Vec<&'a str>,
}

impl<'a> SignatureHeader<'a> {
    fn parse(header: &'a str) -> Result<Self, WebhookError> {
        let mut timestamp_raw = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp_raw = Some(value),
                "v1" => signatures.push(value),
                _ => {}
            }
        }

        let timestamp_raw = timestamp_raw.ok_or(WebhookError::SignatureInvalid)?;
        let timestamp = timestamp_raw
            .parse()
            .map_err(|_| WebhookError::SignatureInvalid)?;
        if signatures.is_empty() {
            return Err(WebhookError::SignatureInvalid);
        }

        Ok(Self {
            timestamp,
            timestamp_raw,
            signatures,
        })
    }
}

fn signing_mac(secret: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length, so this cannot fail
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
}

/// Build a signature header for `body`, in the format the processor sends
pub fn sign_payload(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let timestamp_raw = timestamp.to_string();
    let signature = hex::encode(
        signing_mac(secret, &timestamp_raw, body)
            .finalize()
            .into_bytes(),
    );
    format!("t={},v1={}", timestamp, signature)
}
