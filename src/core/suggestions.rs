use serde::Serialize;
use tracing::debug;

use super::amortization::principal_for_payment;
use super::error::CalcError;
use super::types::{BuyerProfile, ensure_ratio};

pub const DEFAULT_ASSUMED_FIXED_COST_FRACTION: f64 = 0.15;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionTier {
    Conservative,
    Moderate,
    Aggressive,
}

impl SuggestionTier {
    pub const ALL: [SuggestionTier; 3] = [
        SuggestionTier::Conservative,
        SuggestionTier::Moderate,
        SuggestionTier::Aggressive,
    ];

    pub fn affordability_ratio(self) -> f64 {
        match self {
            SuggestionTier::Conservative => 0.20,
            SuggestionTier::Moderate => 0.25,
            SuggestionTier::Aggressive => 0.30,
        }
    }

    /// Share of the buyer's available cash put down up front.
    pub fn cash_fraction(self) -> f64 {
        match self {
            SuggestionTier::Conservative => 0.50,
            SuggestionTier::Moderate => 0.70,
            SuggestionTier::Aggressive => 1.00,
        }
    }
}

/// Knobs for the price suggestion. The assumed running-cost share is a flat
/// haircut on the budget and is independent of any `CostPolicy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPolicy {
    pub assumed_fixed_cost_fraction: f64,
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        Self {
            assumed_fixed_cost_fraction: DEFAULT_ASSUMED_FIXED_COST_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSuggestion {
    pub tier: SuggestionTier,
    pub affordability_ratio: f64,
    pub monthly_budget: f64,
    pub payment_budget: f64,
    pub down_payment: f64,
    pub financeable: f64,
    pub vehicle_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSuggestions {
    pub conservative: TierSuggestion,
    pub moderate: TierSuggestion,
    pub aggressive: TierSuggestion,
}

impl TierSuggestions {
    pub fn get(&self, tier: SuggestionTier) -> &TierSuggestion {
        match tier {
            SuggestionTier::Conservative => &self.conservative,
            SuggestionTier::Moderate => &self.moderate,
            SuggestionTier::Aggressive => &self.aggressive,
        }
    }
}

pub fn suggest_for_tier(
    profile: &BuyerProfile,
    tier: SuggestionTier,
    annual_rate_percent: f64,
    term_months: i32,
    policy: &SuggestionPolicy,
) -> Result<TierSuggestion, CalcError> {
    let fixed_cost_fraction = ensure_ratio(
        "assumedFixedCostFraction",
        policy.assumed_fixed_cost_fraction,
    )?;

    let affordability_ratio = tier.affordability_ratio();
    let monthly_budget = profile.monthly_budget_ceiling(affordability_ratio);
    let payment_budget = monthly_budget * (1.0 - fixed_cost_fraction);
    let down_payment = profile.max_cash_available() * tier.cash_fraction();
    let financeable = principal_for_payment(payment_budget, annual_rate_percent, term_months)?;

    Ok(TierSuggestion {
        tier,
        affordability_ratio,
        monthly_budget,
        payment_budget,
        down_payment,
        financeable,
        vehicle_value: financeable + down_payment,
    })
}

pub fn suggest_vehicle_values(
    profile: &BuyerProfile,
    annual_rate_percent: f64,
    term_months: i32,
    policy: &SuggestionPolicy,
) -> Result<TierSuggestions, CalcError> {
    let suggest =
        |tier| suggest_for_tier(profile, tier, annual_rate_percent, term_months, policy);
    let suggestions = TierSuggestions {
        conservative: suggest(SuggestionTier::Conservative)?,
        moderate: suggest(SuggestionTier::Moderate)?,
        aggressive: suggest(SuggestionTier::Aggressive)?,
    };

    debug!(
        conservative = suggestions.conservative.vehicle_value,
        moderate = suggestions.moderate.vehicle_value,
        aggressive = suggestions.aggressive.vehicle_value,
        "computed tier suggestions"
    );
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};
    use std::thread;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn tier_constants_are_fixed() {
        assert_approx(SuggestionTier::Conservative.affordability_ratio(), 0.20);
        assert_approx(SuggestionTier::Moderate.affordability_ratio(), 0.25);
        assert_approx(SuggestionTier::Aggressive.affordability_ratio(), 0.30);
        assert_approx(SuggestionTier::Conservative.cash_fraction(), 0.50);
        assert_approx(SuggestionTier::Moderate.cash_fraction(), 0.70);
        assert_approx(SuggestionTier::Aggressive.cash_fraction(), 1.00);
    }

    #[test]
    fn moderate_tier_matches_hand_calculation() {
        let profile = BuyerProfile::new(8_000.0, 50_000.0).expect("valid profile");
        let tier = suggest_for_tier(
            &profile,
            SuggestionTier::Moderate,
            18.0,
            48,
            &SuggestionPolicy::default(),
        )
        .expect("valid tier");

        let budget = 8_000.0 * 0.25;
        let payment = budget * 0.85;
        let r = 0.015_f64;
        let financeable = payment * (1.0 - (1.0 + r).powi(-48)) / r;
        assert_approx(tier.monthly_budget, budget);
        assert_approx(tier.payment_budget, payment);
        assert_approx(tier.down_payment, 5_000.0 * 0.70);
        assert_approx(tier.financeable, financeable);
        assert_approx(tier.vehicle_value, financeable + 3_500.0);
    }

    #[test]
    fn zero_rate_suggestion_is_budget_times_term() {
        let profile = BuyerProfile::new(4_000.0, 0.0).expect("valid profile");
        let policy = SuggestionPolicy {
            assumed_fixed_cost_fraction: 0.0,
        };
        let tiers = suggest_vehicle_values(&profile, 0.0, 10, &policy).expect("valid tiers");
        assert_approx(tiers.aggressive.vehicle_value, 4_000.0 * 0.30 * 10.0);
        assert_approx(tiers.conservative.vehicle_value, 4_000.0 * 0.20 * 10.0);
    }

    #[test]
    fn fixed_cost_fraction_is_a_parameter() {
        let profile = BuyerProfile::new(6_000.0, 20_000.0).expect("valid profile");
        let lean = SuggestionPolicy {
            assumed_fixed_cost_fraction: 0.05,
        };
        let heavy = SuggestionPolicy {
            assumed_fixed_cost_fraction: 0.40,
        };
        let lean = suggest_vehicle_values(&profile, 15.0, 60, &lean).expect("valid");
        let heavy = suggest_vehicle_values(&profile, 15.0, 60, &heavy).expect("valid");
        assert!(lean.moderate.financeable > heavy.moderate.financeable);
        assert_approx(lean.moderate.down_payment, heavy.moderate.down_payment);
    }

    #[test]
    fn invalid_inputs_are_reported() {
        let profile = BuyerProfile::new(6_000.0, 20_000.0).expect("valid profile");
        let default = SuggestionPolicy::default();
        assert!(suggest_vehicle_values(&profile, 15.0, 0, &default).is_err());
        assert!(suggest_vehicle_values(&profile, -1.0, 48, &default).is_err());
        let bad = SuggestionPolicy {
            assumed_fixed_cost_fraction: 1.2,
        };
        assert!(suggest_vehicle_values(&profile, 15.0, 48, &bad).is_err());
    }

    #[test]
    fn tiers_do_not_disturb_shared_profile_across_threads() {
        let profile = BuyerProfile::new(7_500.0, 40_000.0).expect("valid profile");
        let policy = SuggestionPolicy::default();
        let expected = suggest_vehicle_values(&profile, 18.0, 48, &policy).expect("valid");

        thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        suggest_vehicle_values(&profile, 18.0, 48, &SuggestionPolicy::default())
                            .expect("valid")
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().expect("thread completes"), expected);
            }
        });
        assert_approx(profile.monthly_budget_ceiling(0.30), 2_250.0);
    }

    #[test]
    fn get_returns_matching_tier() {
        let profile = BuyerProfile::new(3_000.0, 5_000.0).expect("valid profile");
        let policy = SuggestionPolicy::default();
        let tiers = suggest_vehicle_values(&profile, 12.0, 36, &policy).expect("valid");
        for tier in SuggestionTier::ALL {
            assert_eq!(tiers.get(tier).tier, tier);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(96))]

        #[test]
        fn prop_tiers_are_monotonic(
            income in 1u32..100_000,
            net_worth in 0u32..5_000_000,
            rate_bp in 0u32..5_000,
            term in 1i32..121,
            fraction_bp in 0u32..10_001
        ) {
            let profile =
                BuyerProfile::new(income as f64, net_worth as f64).expect("valid profile");
            let policy = SuggestionPolicy {
                assumed_fixed_cost_fraction: fraction_bp as f64 / 10_000.0,
            };
            let tiers = suggest_vehicle_values(&profile, rate_bp as f64 / 100.0, term, &policy)
                .expect("valid tiers");
            prop_assert!(tiers.conservative.vehicle_value <= tiers.moderate.vehicle_value);
            prop_assert!(tiers.moderate.vehicle_value <= tiers.aggressive.vehicle_value);
        }
    }
}
