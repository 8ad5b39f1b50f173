use crate::app_error::{AppError, ErrorCode};
use crate::application::ports::payment_gateway::GatewayError;
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = %self, retryable = self.is_retryable(), "Request failed");

        match self {
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::Gateway { source, .. } => gateway_error_resp(&source),
            AppError::PlanIncomplete(partial) => {
                let body = json!({
                    "code": ErrorCode::PlanIncomplete.as_str(),
                    "message": partial
                        .failure
                        .error
                        .public_message()
                        .unwrap_or("Payment plan could not be completed"),
                    "plan_id": partial.plan_id,
                    "failed_installment": partial.failure.installment_number,
                    "total_installments": partial.total_installments,
                    "failed_operation": partial.failure.operation.as_str(),
                    "retryable": partial.failure.error.is_retryable(),
                    "created": partial.created,
                });
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            AppError::SignatureInvalid => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::SignatureInvalid, None)
            }
            AppError::PayloadMalformed(msg) => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::PayloadMalformed,
                Some(msg),
            ),
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                None,
            ),
        }
    }
}

/// Only the processor's customer-facing message is passed through
fn gateway_error_resp(source: &GatewayError) -> Response {
    match source {
        GatewayError::Timeout => {
            error_resp(StatusCode::GATEWAY_TIMEOUT, ErrorCode::GatewayTimeout, None)
        }
        _ => error_resp(
            StatusCode::BAD_GATEWAY,
            ErrorCode::GatewayError,
            source.public_message().map(str::to_string),
        ),
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => json!({ "code": code.as_str(), "message": msg }),
        None => json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
