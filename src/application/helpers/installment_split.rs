use crate::{
    app_error::{AppError, AppResult},
    domain::entities::payment_plan::{Installment, PaymentPlanRequest, PlanId},
};

/// Upper bound on installments per plan; each one is a processor call.
pub const MAX_INSTALLMENTS: i64 = 120;

/// Split `total` minor units into `count` installments.
///
/// `count` must lie in `1..=MAX_INSTALLMENTS`. Every installment gets
/// `total / count`; the last one also absorbs the remainder of the integer
/// division, so the parts always sum to `total`.
pub fn split_amount(total: i64, count: i64) -> AppResult<Vec<i64>> {
    if total <= 0 {
        return Err(AppError::InvalidInput(
            "Total amount must be greater than 0".into(),
        ));
    }
    if count <= 0 {
        return Err(AppError::InvalidInput(
            "Number of installments must be greater than 0".into(),
        ));
    }
    if count > MAX_INSTALLMENTS {
        return Err(AppError::InvalidInput(format!(
            "Number of installments must be at most {}",
            MAX_INSTALLMENTS
        )));
    }

    let base = total / count;
    let remainder = total - base * count;

    let mut amounts = vec![base; count as usize];
    if let Some(last) = amounts.last_mut() {
        *last += remainder;
    }
    Ok(amounts)
}

/// Materialize the installments of a plan in sequence order
pub fn build_installments(
    plan_id: &PlanId,
    request: &PaymentPlanRequest,
) -> AppResult<Vec<Installment>> {
    let amounts = split_amount(request.total_amount, request.installment_count)?;
    let total_installments = amounts.len() as u32;

    Ok(amounts
        .into_iter()
        .zip(1..=total_installments)
        .map(|(amount, sequence)| Installment {
            sequence,
            total_installments,
            plan_id: plan_id.clone(),
            amount,
            description: Installment::describe(
                &request.description,
                sequence,
                total_installments,
            ),
        })
        .collect())
}
