use serde::Serialize;
use tracing::debug;

use super::amortization::{payment_for_principal, principal_for_payment, total_interest};
use super::costs::{CostPolicy, compute_fixed_costs};
use super::error::{CalcError, ensure_non_negative, ensure_positive_term};
use super::types::{BuyerProfile, LoanTerms, ensure_ratio, financed_amount};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingScenario {
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub financed_principal: f64,
    pub installment: f64,
    pub fixed_costs: f64,
    pub total_monthly: f64,
    pub income_commitment_percent: f64,
    pub total_interest: f64,
}

impl FinancingScenario {
    pub fn exceeds_commitment(&self, threshold_percent: f64) -> bool {
        self.income_commitment_percent > threshold_percent
    }
}

/// One scenario per (rate, term) pair, rates outer and terms inner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMatrix {
    rows: Vec<FinancingScenario>,
}

impl ScenarioMatrix {
    pub fn rows(&self) -> &[FinancingScenario] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, annual_rate_percent: f64, term_months: u32) -> Option<&FinancingScenario> {
        self.rows.iter().find(|row| {
            row.annual_rate_percent == annual_rate_percent && row.term_months == term_months
        })
    }
}

pub fn build_matrix(
    vehicle_price: f64,
    down_payment: f64,
    rates: &[f64],
    terms: &[i32],
    profile: &BuyerProfile,
    policy: &CostPolicy,
) -> Result<ScenarioMatrix, CalcError> {
    validate_grid(rates, terms)?;
    // checked up front so an empty grid still rejects a bad down payment
    let financed_principal = financed_amount(vehicle_price, down_payment)?;
    let fixed_costs = compute_fixed_costs(vehicle_price, policy)?.total();

    let mut rows = Vec::with_capacity(rates.len() * terms.len());
    for &rate in rates {
        for &term in terms {
            let loan = LoanTerms::new(rate, term, Some(down_payment))?;
            let installment = payment_for_principal(financed_principal, rate, term)?;
            let total_monthly = installment + fixed_costs;
            rows.push(FinancingScenario {
                annual_rate_percent: loan.annual_rate_percent,
                term_months: loan.term_months,
                financed_principal,
                installment,
                fixed_costs,
                total_monthly,
                income_commitment_percent: profile.income_commitment_percent(total_monthly)?,
                total_interest: total_interest(financed_principal, rate, term)?,
            });
        }
    }

    debug!(
        rows = rows.len(),
        vehicle_price, down_payment, fixed_costs, "built scenario matrix"
    );
    Ok(ScenarioMatrix { rows })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceableRow {
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub payment_budget: f64,
    pub max_principal: f64,
    pub affordable: bool,
}

/// Largest loan per (rate, term) that fits the income ceiling once the
/// vehicle's running costs are paid.
pub fn build_financeable_grid(
    profile: &BuyerProfile,
    affordability_ratio: f64,
    vehicle_price: f64,
    rates: &[f64],
    terms: &[i32],
    policy: &CostPolicy,
) -> Result<Vec<FinanceableRow>, CalcError> {
    validate_grid(rates, terms)?;
    let ratio = ensure_ratio("affordabilityRatio", affordability_ratio)?;
    let fixed_costs = compute_fixed_costs(vehicle_price, policy)?.total();
    let payment_budget = profile.monthly_budget_ceiling(ratio) - fixed_costs;

    let mut grid = Vec::with_capacity(rates.len() * terms.len());
    for &rate in rates {
        for &term in terms {
            let loan = LoanTerms::new(rate, term, None)?;
            let max_principal = principal_for_payment(payment_budget, rate, term)?;
            grid.push(FinanceableRow {
                annual_rate_percent: loan.annual_rate_percent,
                term_months: loan.term_months,
                payment_budget,
                max_principal,
                affordable: max_principal > 0.0,
            });
        }
    }
    Ok(grid)
}

fn validate_grid(rates: &[f64], terms: &[i32]) -> Result<(), CalcError> {
    for (idx, rate) in rates.iter().enumerate() {
        ensure_non_negative("rates", *rate)?;
        if rates[..idx].contains(rate) {
            return Err(CalcError::invalid("rates", format!("duplicate rate {rate}")));
        }
    }
    for (idx, term) in terms.iter().enumerate() {
        ensure_positive_term("terms", *term)?;
        if terms[..idx].contains(term) {
            return Err(CalcError::invalid("terms", format!("duplicate term {term}")));
        }
    }
    Ok(())
}
