//! Processor webhook events, decoded once at the boundary into a closed set
//! of kinds this service acts on plus a catch-all.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";
pub const CHARGE_REFUNDED: &str = "charge.refunded";

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub created: Option<i64>,
    pub livemode: bool,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    PaymentIntentSucceeded(IntentObject),
    PaymentIntentFailed(IntentObject),
    ChargeRefunded(ChargeObject),
    /// Event types this service does not act on yet; kept so they can be logged
    Unrecognized { object: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntentObject {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub last_payment_error: Option<LastPaymentError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastPaymentError {
    pub message: Option<String>,
    pub code: Option<String>,
    pub decline_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChargeObject {
    pub id: String,
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub amount_refunded: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Error, Debug)]
pub enum EventDecodeError {
    #[error("event is not a valid envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("{event_type} object has an unexpected shape: {source}")]
    Object {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: Option<i64>,
    #[serde(default)]
    livemode: bool,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

impl WebhookEvent {
    /// Decode the raw request body of a webhook delivery.
    pub fn decode(raw_body: &[u8]) -> Result<Self, EventDecodeError> {
        let raw: RawEvent = serde_json::from_slice(raw_body).map_err(EventDecodeError::Envelope)?;
        let object = raw.data.object;

        let kind = match raw.event_type.as_str() {
            PAYMENT_INTENT_SUCCEEDED => {
                EventKind::PaymentIntentSucceeded(decode_object(&raw.event_type, object)?)
            }
            PAYMENT_INTENT_FAILED => {
                EventKind::PaymentIntentFailed(decode_object(&raw.event_type, object)?)
            }
            CHARGE_REFUNDED => EventKind::ChargeRefunded(decode_object(&raw.event_type, object)?),
            _ => EventKind::Unrecognized { object },
        };

        Ok(Self {
            id: raw.id,
            event_type: raw.event_type,
            created: raw.created,
            livemode: raw.livemode,
            kind,
        })
    }
}

fn decode_object<T: for<'de> Deserialize<'de>>(
    event_type: &str,
    object: serde_json::Value,
) -> Result<T, EventDecodeError> {
    serde_json::from_value(object).map_err(|source| EventDecodeError::Object {
        event_type: event_type.to_string(),
        source,
    })
}

/// An event whose delivery signature has been checked.
///
/// Only the webhook verifier constructs these, so holding one is proof the
/// payload came from the processor.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedEvent(WebhookEvent);

impl VerifiedEvent {
    pub(crate) fn from_verified(event: WebhookEvent) -> Self {
        Self(event)
    }
}

impl std::ops::Deref for VerifiedEvent {
    type Target = WebhookEvent;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
