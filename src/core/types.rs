use serde::Serialize;

use super::error::{CalcError, ensure_non_negative, ensure_positive_term};

pub const DEFAULT_AFFORDABILITY_RATIO: f64 = 0.30;
pub const CASH_AVAILABLE_FRACTION: f64 = 0.10;

/// Buyer income and assets. Built once per analysis and never mutated; every
/// ratio-dependent figure takes the ratio as an argument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerProfile {
    monthly_income: f64,
    net_worth: f64,
}

impl BuyerProfile {
    pub fn new(monthly_income: f64, net_worth: f64) -> Result<Self, CalcError> {
        Ok(Self {
            monthly_income: ensure_non_negative("monthlyIncome", monthly_income)?,
            net_worth: ensure_non_negative("netWorth", net_worth)?,
        })
    }

    pub fn monthly_income(&self) -> f64 {
        self.monthly_income
    }

    pub fn net_worth(&self) -> f64 {
        self.net_worth
    }

    pub fn monthly_budget_ceiling(&self, affordability_ratio: f64) -> f64 {
        self.monthly_income * affordability_ratio
    }

    pub fn max_cash_available(&self) -> f64 {
        self.net_worth * CASH_AVAILABLE_FRACTION
    }

    /// Share of monthly income consumed by `monthly_cost`, in percent.
    pub fn income_commitment_percent(&self, monthly_cost: f64) -> Result<f64, CalcError> {
        if self.monthly_income == 0.0 {
            return Err(CalcError::undefined(
                "incomeCommitmentPercent",
                "monthly income is zero",
            ));
        }
        Ok(monthly_cost * 100.0 / self.monthly_income)
    }
}

pub(crate) fn ensure_ratio(field: &str, ratio: f64) -> Result<f64, CalcError> {
    let ratio = ensure_non_negative(field, ratio)?;
    if ratio > 1.0 {
        return Err(CalcError::invalid(
            field,
            format!("must be between 0 and 1, got {ratio}"),
        ));
    }
    Ok(ratio)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub down_payment: Option<f64>,
}

impl LoanTerms {
    pub fn new(
        annual_rate_percent: f64,
        term_months: i32,
        down_payment: Option<f64>,
    ) -> Result<Self, CalcError> {
        let annual_rate_percent = ensure_non_negative("annualRatePercent", annual_rate_percent)?;
        let term_months = ensure_positive_term("termMonths", term_months)?;
        let down_payment = down_payment
            .map(|value| ensure_non_negative("downPayment", value))
            .transpose()?;
        Ok(Self {
            annual_rate_percent,
            term_months,
            down_payment,
        })
    }

    /// Amount left to finance once the down payment is taken off `vehicle_price`.
    pub fn financed_principal(&self, vehicle_price: f64) -> Result<f64, CalcError> {
        financed_amount(vehicle_price, self.down_payment.unwrap_or(0.0))
    }
}

pub(crate) fn financed_amount(vehicle_price: f64, down_payment: f64) -> Result<f64, CalcError> {
    let vehicle_price = ensure_non_negative("vehiclePrice", vehicle_price)?;
    let down_payment = ensure_non_negative("downPayment", down_payment)?;
    if down_payment > vehicle_price {
        return Err(CalcError::invalid(
            "downPayment",
            format!("{down_payment} exceeds vehicle price {vehicle_price}"),
        ));
    }
    Ok(vehicle_price - down_payment)
}
