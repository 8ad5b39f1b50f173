use thiserror::Error;

use crate::application::ports::payment_gateway::{GatewayError, GatewayOperation};
use crate::application::use_cases::payment_plan::PartialPlan;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payment processor call {operation} failed: {source}")]
    Gateway {
        operation: GatewayOperation,
        #[source]
        source: GatewayError,
    },

    #[error("{0}")]
    PlanIncomplete(Box<PartialPlan>),

    #[error("Webhook signature is invalid")]
    SignatureInvalid,

    #[error("Webhook payload is malformed: {0}")]
    PayloadMalformed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn gateway(operation: GatewayOperation, source: GatewayError) -> Self {
        AppError::Gateway { operation, source }
    }

    /// Whether the same call may succeed if retried later
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Gateway { source, .. } => source.is_retryable(),
            AppError::PlanIncomplete(partial) => partial.failure.error.is_retryable(),
            AppError::Internal(_) => true,
            AppError::InvalidInput(_)
            | AppError::SignatureInvalid
            | AppError::PayloadMalformed(_) => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    InvalidInput,
    GatewayError,
    GatewayTimeout,
    PlanIncomplete,
    SignatureInvalid,
    PayloadMalformed,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::GatewayError => "GATEWAY_ERROR",
            ErrorCode::GatewayTimeout => "GATEWAY_TIMEOUT",
            ErrorCode::PlanIncomplete => "PLAN_INCOMPLETE",
            ErrorCode::SignatureInvalid => "SIGNATURE_INVALID",
            ErrorCode::PayloadMalformed => "PAYLOAD_MALFORMED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
