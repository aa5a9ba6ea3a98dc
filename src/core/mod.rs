mod advice;
mod amortization;
mod costs;
mod error;
mod fuel;
mod report;
mod scenarios;
mod suggestions;
mod types;

pub use advice::{CASH_PURCHASE_THRESHOLD, Recommendation, recommendations};
pub use amortization::{monthly_rate, payment_for_principal, principal_for_payment, total_interest};
pub use costs::{
    CostBreakdown, CostEntry, CostPolicy, CostRule, FUEL, INSURANCE, MAINTENANCE,
    REGISTRATION_TAX, compute_fixed_costs,
};
pub use error::CalcError;
pub use fuel::{FuelComparison, FuelOption, FuelSide, cheaper_fuel, compare_fuels, monthly_savings};
pub use report::{
    AffordabilityReport, AnalysisRequest, BudgetSummary, FuelReport, FuelRequest, analyze,
};
pub use scenarios::{
    FinanceableRow, FinancingScenario, ScenarioMatrix, build_financeable_grid, build_matrix,
};
pub use suggestions::{
    DEFAULT_ASSUMED_FIXED_COST_FRACTION, SuggestionPolicy, SuggestionTier, TierSuggestion,
    TierSuggestions, suggest_for_tier, suggest_vehicle_values,
};
pub use types::{BuyerProfile, CASH_AVAILABLE_FRACTION, DEFAULT_AFFORDABILITY_RATIO, LoanTerms};
