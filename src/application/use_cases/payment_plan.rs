use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::{
        helpers::installment_split::build_installments,
        ports::payment_gateway::{
            CreateIntentParams, GatewayError, GatewayOperation, PaymentGatewayPort,
        },
    },
    domain::entities::{
        payment_intent::{CaptureMode, FutureUsage, PaymentIntentRecord},
        payment_plan::{Installment, PaymentPlanRequest, PlanId, PlanResult},
        plan_correlation::PlanCorrelation,
    },
};

// ============================================================================
// Outcome Types
// ============================================================================

/// Result of a plan creation that reached the processor.
///
/// Installments are created one at a time, so a failure part way through
/// leaves earlier intents in place. `Partial` reports exactly which ones.
#[derive(Debug)]
pub enum PlanOutcome {
    Completed(PlanResult),
    Partial(PartialPlan),
}

impl PlanOutcome {
    pub fn plan_id(&self) -> &PlanId {
        match self {
            PlanOutcome::Completed(result) => &result.plan_id,
            PlanOutcome::Partial(partial) => &partial.plan_id,
        }
    }

    /// Collapse into a result, surfacing a partial plan as `PlanIncomplete`
    pub fn into_result(self) -> AppResult<PlanResult> {
        match self {
            PlanOutcome::Completed(result) => Ok(result),
            PlanOutcome::Partial(partial) => Err(AppError::PlanIncomplete(Box::new(partial))),
        }
    }
}

#[derive(Debug)]
pub struct PartialPlan {
    pub plan_id: PlanId,
    pub total_installments: u32,
    pub installment_amount: i64,
    /// Every intent that now exists at the processor, in installment order.
    /// Includes a first installment that was created but failed confirmation.
    pub created: Vec<PaymentIntentRecord>,
    pub failure: InstallmentFailure,
}

impl PartialPlan {
    pub fn side_effects_occurred(&self) -> bool {
        !self.created.is_empty()
    }
}

impl std::fmt::Display for PartialPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plan {} stopped at installment {} of {} ({} intent(s) created): {} failed: {}",
            self.plan_id,
            self.failure.installment_number,
            self.total_installments,
            self.created.len(),
            self.failure.operation,
            self.failure.error
        )
    }
}

#[derive(Debug)]
pub struct InstallmentFailure {
    pub installment_number: u32,
    pub operation: GatewayOperation,
    pub error: GatewayError,
}

struct StepFailure {
    operation: GatewayOperation,
    error: GatewayError,
    /// Intent that was created before the failing step
    created: Option<PaymentIntentRecord>,
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct PaymentPlanUseCases {
    gateway: Arc<dyn PaymentGatewayPort>,
}

impl PaymentPlanUseCases {
    pub fn new(gateway: Arc<dyn PaymentGatewayPort>) -> Self {
        Self { gateway }
    }

    /// Create every installment intent of a new plan, in sequence order.
    ///
    /// Returns `Err` only for requests rejected before any processor call.
    pub async fn create_plan(&self, request: PaymentPlanRequest) -> AppResult<PlanOutcome> {
        self.create_plan_with_id(PlanId::generate(), request).await
    }

    #[instrument(
        skip(self, request),
        fields(
            plan_id = %plan_id,
            total_amount = request.total_amount,
            installment_count = request.installment_count
        )
    )]
    pub(crate) async fn create_plan_with_id(
        &self,
        plan_id: PlanId,
        request: PaymentPlanRequest,
    ) -> AppResult<PlanOutcome> {
        let installments = build_installments(&plan_id, &request)?;
        let total_installments = installments.len() as u32;
        let installment_amount = installments.first().map(|i| i.amount).unwrap_or_default();
        let currency = request.currency.trim().to_lowercase();

        info!(
            plan_id = %plan_id,
            total_installments,
            installment_amount,
            "Creating payment plan"
        );

        let mut created = Vec::with_capacity(installments.len());
        for installment in &installments {
            match self
                .create_installment(installment, &request, &currency)
                .await
            {
                Ok(intent) => {
                    debug!(
                        plan_id = %plan_id,
                        installment_number = installment.sequence,
                        payment_intent_id = %intent.payment_intent_id,
                        status = %intent.status,
                        "Installment intent created"
                    );
                    created.push(intent);
                }
                Err(step) => {
                    created.extend(step.created);
                    warn!(
                        plan_id = %plan_id,
                        installment_number = installment.sequence,
                        total_installments,
                        operation = %step.operation,
                        error = %step.error,
                        intents_created = created.len(),
                        "Payment plan stopped before completion"
                    );
                    return Ok(PlanOutcome::Partial(PartialPlan {
                        plan_id,
                        total_installments,
                        installment_amount,
                        created,
                        failure: InstallmentFailure {
                            installment_number: installment.sequence,
                            operation: step.operation,
                            error: step.error,
                        },
                    }));
                }
            }
        }

        info!(plan_id = %plan_id, total_installments, "Payment plan created");

        Ok(PlanOutcome::Completed(PlanResult {
            plan_id,
            number_of_installments: total_installments,
            installment_amount,
            installments: created,
        }))
    }

    /// First installment: charged now with the caller's method, confirmed if needed.
    /// Later installments: manual capture with no method, collected later off-session.
    async fn create_installment(
        &self,
        installment: &Installment,
        request: &PaymentPlanRequest,
        currency: &str,
    ) -> Result<PaymentIntentRecord, StepFailure> {
        let first = installment.is_first();
        let correlation = PlanCorrelation::new(
            installment.plan_id.as_str(),
            installment.sequence,
            installment.total_installments,
        );

        let params = CreateIntentParams {
            amount: installment.amount,
            currency: currency.to_string(),
            customer_id: Some(request.customer_id.clone()),
            payment_method_id: first.then(|| request.payment_method_id.clone()),
            description: Some(installment.description.clone()),
            capture_mode: if first {
                CaptureMode::Automatic
            } else {
                CaptureMode::Manual
            },
            metadata: correlation.to_metadata(),
            setup_future_usage: Some(FutureUsage::OffSession),
            idempotency_key: Some(format!(
                "{}:installment:{}",
                installment.plan_id, installment.sequence
            )),
        };

        let intent = self
            .gateway
            .create_intent(&params)
            .await
            .map_err(|error| StepFailure {
                operation: GatewayOperation::CreateIntent,
                error,
                created: None,
            })?;

        if !first || intent.status.is_terminal_success() {
            return Ok(intent);
        }

        match self
            .gateway
            .confirm_intent(&intent.payment_intent_id, &request.payment_method_id)
            .await
        {
            Ok(confirmed) => Ok(confirmed),
            Err(error) => Err(StepFailure {
                operation: GatewayOperation::ConfirmIntent,
                error,
                created: Some(intent),
            }),
        }
    }
}
