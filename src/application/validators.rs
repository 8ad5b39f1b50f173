use validator::{Validate, ValidationError, ValidationErrors};

use crate::app_error::{AppError, AppResult};

/// ISO-4217 alpha-3 shape: exactly three ASCII letters, any case
pub fn is_valid_currency(code: &str) -> bool {
    let code = code.trim();
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// `#[validate(custom(function = "validate_currency"))]` hook
pub fn validate_currency(code: &str) -> Result<(), ValidationError> {
    if is_valid_currency(code) {
        Ok(())
    } else {
        Err(ValidationError::new("currency")
            .with_message("Currency must be a three-letter ISO code".into()))
    }
}

/// Processor object ids are opaque but never blank or padded
pub fn is_valid_object_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 255 && !id.chars().any(|c| c.is_whitespace())
}

pub fn validate_object_id(id: &str) -> Result<(), ValidationError> {
    if is_valid_object_id(id) {
        Ok(())
    } else {
        Err(ValidationError::new("object_id").with_message("Invalid identifier".into()))
    }
}

/// Run derived validation and fold every failure into one `InvalidInput`
pub fn validate_request<T: Validate>(request: &T) -> AppResult<()> {
    request
        .validate()
        .map_err(|errors| AppError::InvalidInput(describe_errors(&errors)))
}

fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .next()
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{}: {}", field, detail)
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
