//! Correlation metadata linking a payment intent back to its plan installment.
//!
//! The processor stores metadata as a flat string map and echoes it back on
//! every related webhook event. `PlanCorrelation` is the only place that map
//! is written or read, so the installment invariant is checked once here.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

pub const PLAN_ID_KEY: &str = "plan_id";
pub const INSTALLMENT_NUMBER_KEY: &str = "installment_number";
pub const TOTAL_INSTALLMENTS_KEY: &str = "total_installments";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanCorrelation {
    pub plan_id: String,
    pub installment_number: u32,
    pub total_installments: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("plan_id is present but empty")]
    EmptyPlanId,

    #[error("metadata has plan_id but is missing {0}")]
    MissingField(&'static str),

    #[error("{field} must be a positive integer, got {value:?}")]
    NotAPositiveInteger { field: &'static str, value: String },

    #[error("installment {installment_number} exceeds total of {total_installments}")]
    InstallmentOutOfRange {
        installment_number: u32,
        total_installments: u32,
    },
}

impl PlanCorrelation {
    pub fn new(
        plan_id: impl Into<String>,
        installment_number: u32,
        total_installments: u32,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            installment_number,
            total_installments,
        }
    }

    /// Metadata map attached to a payment intent at creation time
    pub fn to_metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (PLAN_ID_KEY.to_string(), self.plan_id.clone()),
            (
                INSTALLMENT_NUMBER_KEY.to_string(),
                self.installment_number.to_string(),
            ),
            (
                TOTAL_INSTALLMENTS_KEY.to_string(),
                self.total_installments.to_string(),
            ),
        ])
    }

    /// Decode correlation data from processor metadata.
    ///
    /// Returns `Ok(None)` when there is no `plan_id` key: most intents are not
    /// part of a plan and that is not an error.
    pub fn from_metadata(
        metadata: &HashMap<String, String>,
    ) -> Result<Option<Self>, CorrelationError> {
        let Some(plan_id) = metadata.get(PLAN_ID_KEY) else {
            return Ok(None);
        };
        let plan_id = plan_id.trim();
        if plan_id.is_empty() {
            return Err(CorrelationError::EmptyPlanId);
        }

        let installment_number = parse_positive(metadata, INSTALLMENT_NUMBER_KEY)?;
        let total_installments = parse_positive(metadata, TOTAL_INSTALLMENTS_KEY)?;

        if installment_number > total_installments {
            return Err(CorrelationError::InstallmentOutOfRange {
                installment_number,
                total_installments,
            });
        }

        Ok(Some(Self::new(
            plan_id,
            installment_number,
            total_installments,
        )))
    }

    pub fn is_final_installment(&self) -> bool {
        self.installment_number == self.total_installments
    }
}

fn parse_positive(
    metadata: &HashMap<String, String>,
    field: &'static str,
) -> Result<u32, CorrelationError> {
    let raw = metadata
        .get(field)
        .ok_or(CorrelationError::MissingField(field))?;

    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CorrelationError::NotAPositiveInteger {
            field,
            value: raw.clone(),
        }),
    }
}
