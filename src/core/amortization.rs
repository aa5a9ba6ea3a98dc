use super::error::{CalcError, ensure_finite, ensure_non_negative, ensure_positive_term};

const ZERO_RATE_EPSILON: f64 = 1e-12;

pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Level monthly installment that repays `principal` over `term_months`.
pub fn payment_for_principal(
    principal: f64,
    annual_rate_percent: f64,
    term_months: i32,
) -> Result<f64, CalcError> {
    let n = ensure_positive_term("termMonths", term_months)?;
    let principal = ensure_non_negative("principal", principal)?;
    let r = monthly_rate(ensure_non_negative("annualRatePercent", annual_rate_percent)?);

    if r < ZERO_RATE_EPSILON {
        return Ok(principal / n as f64);
    }

    // discount form stays finite for long terms where (1 + r)^n overflows
    Ok(principal * r / (1.0 - (1.0 + r).powi(-(n as i32))))
}

/// Largest principal a monthly `payment` can repay over `term_months`.
///
/// A negative payment (budget already consumed by running costs) yields a
/// negative principal; callers decide how to present that.
pub fn principal_for_payment(
    payment: f64,
    annual_rate_percent: f64,
    term_months: i32,
) -> Result<f64, CalcError> {
    let n = ensure_positive_term("termMonths", term_months)?;
    let payment = ensure_finite("payment", payment)?;
    let r = monthly_rate(ensure_non_negative("annualRatePercent", annual_rate_percent)?);

    if r < ZERO_RATE_EPSILON {
        return Ok(payment * n as f64);
    }

    Ok(payment * (1.0 - (1.0 + r).powi(-(n as i32))) / r)
}

/// Interest paid over the life of the loan; exactly zero for a zero rate.
pub fn total_interest(
    principal: f64,
    annual_rate_percent: f64,
    term_months: i32,
) -> Result<f64, CalcError> {
    let payment = payment_for_principal(principal, annual_rate_percent, term_months)?;
    if monthly_rate(annual_rate_percent) < ZERO_RATE_EPSILON {
        return Ok(0.0);
    }
    Ok(payment * term_months as f64 - principal)
}
