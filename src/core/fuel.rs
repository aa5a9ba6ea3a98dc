use serde::{Deserialize, Serialize};

use super::error::{CalcError, ensure_non_negative};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelOption {
    pub price_per_unit_volume: f64,
    pub efficiency_distance_per_unit_volume: f64,
}

impl FuelOption {
    pub fn new(price_per_unit_volume: f64, efficiency: f64) -> Result<Self, CalcError> {
        Ok(Self {
            price_per_unit_volume: ensure_non_negative(
                "pricePerUnitVolume",
                price_per_unit_volume,
            )?,
            efficiency_distance_per_unit_volume: ensure_non_negative(
                "efficiencyDistancePerUnitVolume",
                efficiency,
            )?,
        })
    }

    /// `None` when the fuel goes nowhere (zero efficiency).
    pub fn cost_per_distance(&self) -> Option<f64> {
        if self.efficiency_distance_per_unit_volume > 0.0 {
            Some(self.price_per_unit_volume / self.efficiency_distance_per_unit_volume)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum FuelSide {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelComparison {
    pub winner: FuelSide,
    pub cost_per_distance_winner: f64,
    /// `None` when the losing fuel is unusable.
    pub cost_per_distance_other: Option<f64>,
}

impl FuelComparison {
    pub fn monthly_savings(&self, monthly_distance: f64) -> Result<f64, CalcError> {
        let other = self.cost_per_distance_other.ok_or_else(|| {
            CalcError::undefined("monthlySavings", "losing fuel has zero efficiency")
        })?;
        monthly_savings(self.cost_per_distance_winner, other, monthly_distance)
    }
}

pub fn compare_fuels(a: &FuelOption, b: &FuelOption) -> Result<FuelComparison, CalcError> {
    let comparison = match (a.cost_per_distance(), b.cost_per_distance()) {
        (None, None) => {
            return Err(CalcError::undefined(
                "costPerDistance",
                "both fuels have zero efficiency",
            ));
        }
        (Some(cost_a), None) => FuelComparison {
            winner: FuelSide::A,
            cost_per_distance_winner: cost_a,
            cost_per_distance_other: None,
        },
        (None, Some(cost_b)) => FuelComparison {
            winner: FuelSide::B,
            cost_per_distance_winner: cost_b,
            cost_per_distance_other: None,
        },
        // ties go to A
        (Some(cost_a), Some(cost_b)) if cost_a <= cost_b => FuelComparison {
            winner: FuelSide::A,
            cost_per_distance_winner: cost_a,
            cost_per_distance_other: Some(cost_b),
        },
        (Some(cost_a), Some(cost_b)) => FuelComparison {
            winner: FuelSide::B,
            cost_per_distance_winner: cost_b,
            cost_per_distance_other: Some(cost_a),
        },
    };
    Ok(comparison)
}

pub fn cheaper_fuel(
    price_a: f64,
    price_b: f64,
    efficiency_a: f64,
    efficiency_b: f64,
) -> Result<FuelComparison, CalcError> {
    compare_fuels(
        &FuelOption::new(price_a, efficiency_a)?,
        &FuelOption::new(price_b, efficiency_b)?,
    )
}

pub fn monthly_savings(
    cost_per_distance_winner: f64,
    cost_per_distance_other: f64,
    monthly_distance: f64,
) -> Result<f64, CalcError> {
    let winner = ensure_non_negative("costPerDistanceWinner", cost_per_distance_winner)?;
    let other = ensure_non_negative("costPerDistanceOther", cost_per_distance_other)?;
    let distance = ensure_non_negative("monthlyDistance", monthly_distance)?;
    Ok((other - winner).abs() * distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn gasoline_beats_ethanol_in_reference_case() {
        // A: 5.00 per litre at 12 km/l, B: 3.50 per litre at 8 km/l
        let result = cheaper_fuel(5.0, 3.5, 12.0, 8.0).expect("valid comparison");
        assert_eq!(result.winner, FuelSide::A);
        assert_approx(result.cost_per_distance_winner, 5.0 / 12.0);
        assert_approx(result.cost_per_distance_winner, 0.416_666_666_666_666_7);
        assert_approx(result.cost_per_distance_other.expect("usable"), 0.4375);
    }

    #[test]
    fn swapped_sides_pick_the_same_fuel() {
        let result = cheaper_fuel(3.5, 5.0, 8.0, 12.0).expect("valid comparison");
        assert_eq!(result.winner, FuelSide::B);
        assert_approx(result.cost_per_distance_winner, 5.0 / 12.0);
    }

    #[test]
    fn tie_resolves_to_a() {
        let result = cheaper_fuel(4.0, 2.0, 10.0, 5.0).expect("valid comparison");
        assert_eq!(result.winner, FuelSide::A);
        assert_approx(result.cost_per_distance_winner, 0.4);
        assert_approx(result.cost_per_distance_other.expect("usable"), 0.4);
    }

    #[test]
    fn zero_efficiency_side_never_wins() {
        let result = cheaper_fuel(0.0, 9.0, 0.0, 1.0).expect("valid comparison");
        assert_eq!(result.winner, FuelSide::B);
        assert_eq!(result.cost_per_distance_other, None);

        let result = cheaper_fuel(9.0, 0.01, 1.0, 0.0).expect("valid comparison");
        assert_eq!(result.winner, FuelSide::A);
    }

    #[test]
    fn both_unusable_is_undefined() {
        let err = cheaper_fuel(5.0, 3.5, 0.0, 0.0).expect_err("no usable fuel");
        assert!(matches!(err, CalcError::UndefinedResult { .. }));
    }

    #[test]
    fn negative_inputs_are_invalid() {
        assert!(matches!(
            cheaper_fuel(-5.0, 3.5, 12.0, 8.0),
            Err(CalcError::InvalidInput { .. })
        ));
        assert!(matches!(
            cheaper_fuel(5.0, 3.5, 12.0, -8.0),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn savings_scale_with_distance() {
        let result = cheaper_fuel(5.0, 3.5, 12.0, 8.0).expect("valid comparison");
        let savings = result.monthly_savings(1_200.0).expect("defined savings");
        assert_approx(savings, (0.4375 - 5.0 / 12.0) * 1_200.0);
        assert_approx(savings, 25.0);
    }

    #[test]
    fn savings_are_absolute_difference() {
        assert_approx(monthly_savings(0.5, 0.4, 100.0).expect("valid"), 10.0);
        assert_approx(monthly_savings(0.4, 0.5, 100.0).expect("valid"), 10.0);
        assert!(monthly_savings(0.4, 0.5, -1.0).is_err());
    }

    #[test]
    fn savings_against_unusable_fuel_are_undefined() {
        let result = cheaper_fuel(5.0, 3.5, 12.0, 0.0).expect("valid comparison");
        assert!(matches!(
            result.monthly_savings(1_000.0),
            Err(CalcError::UndefinedResult { .. })
        ));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_efficiency_never_wins(
            price_zero in 0u32..10_000,
            price_other in 0u32..10_000,
            efficiency_other in 1u32..5_000,
            zero_on_a in proptest::bool::ANY
        ) {
            let (price_zero, price_other) = (price_zero as f64 / 100.0, price_other as f64 / 100.0);
            let efficiency_other = efficiency_other as f64 / 100.0;
            let result = if zero_on_a {
                cheaper_fuel(price_zero, price_other, 0.0, efficiency_other)
            } else {
                cheaper_fuel(price_other, price_zero, efficiency_other, 0.0)
            }
            .expect("one usable fuel");
            let expected = if zero_on_a { FuelSide::B } else { FuelSide::A };
            prop_assert_eq!(result.winner, expected);
        }
    }
}
