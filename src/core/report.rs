use serde::Serialize;
use tracing::debug;

use super::advice::{Recommendation, recommendations};
use super::costs::{CostBreakdown, CostPolicy, compute_fixed_costs};
use super::error::CalcError;
use super::fuel::{FuelComparison, FuelOption, compare_fuels};
use super::scenarios::{FinanceableRow, ScenarioMatrix, build_financeable_grid, build_matrix};
use super::suggestions::{SuggestionPolicy, TierSuggestions, suggest_vehicle_values};
use super::types::{BuyerProfile, ensure_ratio};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub affordability_ratio: f64,
    pub monthly_budget_ceiling: f64,
    pub max_cash_available: f64,
    pub fixed_costs_total: f64,
    /// Ceiling minus running costs; negative when the car's upkeep alone is over budget.
    pub payment_budget: f64,
}

impl BudgetSummary {
    pub fn for_profile(
        profile: &BuyerProfile,
        affordability_ratio: f64,
        vehicle_price: f64,
        policy: &CostPolicy,
    ) -> Result<Self, CalcError> {
        let affordability_ratio = ensure_ratio("affordabilityRatio", affordability_ratio)?;
        let monthly_budget_ceiling = profile.monthly_budget_ceiling(affordability_ratio);
        let fixed_costs_total = compute_fixed_costs(vehicle_price, policy)?.total();
        Ok(Self {
            affordability_ratio,
            monthly_budget_ceiling,
            max_cash_available: profile.max_cash_available(),
            fixed_costs_total,
            payment_budget: monthly_budget_ceiling - fixed_costs_total,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelRequest {
    pub a: FuelOption,
    pub b: FuelOption,
    pub monthly_distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub profile: BuyerProfile,
    pub affordability_ratio: f64,
    pub vehicle_price: f64,
    pub down_payment: f64,
    pub rates: Vec<f64>,
    pub terms: Vec<i32>,
    pub cost_policy: CostPolicy,
    pub suggestion_rate_percent: f64,
    pub suggestion_term_months: i32,
    pub suggestion_policy: SuggestionPolicy,
    pub fuel: Option<FuelRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelReport {
    #[serde(flatten)]
    pub comparison: FuelComparison,
    pub monthly_distance: Option<f64>,
    pub monthly_savings: Option<f64>,
}

impl FuelReport {
    pub fn build(request: &FuelRequest) -> Result<Self, CalcError> {
        let comparison = compare_fuels(&request.a, &request.b)?;
        let monthly_savings = request
            .monthly_distance
            .map(|distance| comparison.monthly_savings(distance))
            .transpose()?;
        Ok(Self {
            comparison,
            monthly_distance: request.monthly_distance,
            monthly_savings,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityReport {
    pub profile: BuyerProfile,
    pub vehicle_price: f64,
    pub down_payment: f64,
    pub budget: BudgetSummary,
    pub costs: CostBreakdown,
    pub scenarios: ScenarioMatrix,
    pub financeable: Vec<FinanceableRow>,
    pub suggestions: TierSuggestions,
    pub recommendations: Vec<Recommendation>,
    pub fuel: Option<FuelReport>,
}

pub fn analyze(request: &AnalysisRequest) -> Result<AffordabilityReport, CalcError> {
    let profile = &request.profile;
    let policy = &request.cost_policy;

    let budget = BudgetSummary::for_profile(
        profile,
        request.affordability_ratio,
        request.vehicle_price,
        policy,
    )?;
    let costs = compute_fixed_costs(request.vehicle_price, policy)?;
    let scenarios = build_matrix(
        request.vehicle_price,
        request.down_payment,
        &request.rates,
        &request.terms,
        profile,
        policy,
    )?;
    let financeable = build_financeable_grid(
        profile,
        request.affordability_ratio,
        request.vehicle_price,
        &request.rates,
        &request.terms,
        policy,
    )?;
    let suggestions = suggest_vehicle_values(
        profile,
        request.suggestion_rate_percent,
        request.suggestion_term_months,
        &request.suggestion_policy,
    )?;
    let fuel = request.fuel.as_ref().map(FuelReport::build).transpose()?;

    debug!(
        scenarios = scenarios.len(),
        payment_budget = budget.payment_budget,
        with_fuel = fuel.is_some(),
        "assembled affordability report"
    );

    Ok(AffordabilityReport {
        profile: *profile,
        vehicle_price: request.vehicle_price,
        down_payment: request.down_payment,
        budget,
        costs,
        scenarios,
        financeable,
        suggestions,
        recommendations: recommendations(profile),
        fuel,
    })
}
