use serde::{Deserialize, Serialize};

use super::error::{CalcError, ensure_non_negative};

pub const FUEL: &str = "fuel";
pub const INSURANCE: &str = "insurance";
pub const REGISTRATION_TAX: &str = "registration tax";
pub const MAINTENANCE: &str = "maintenance";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CostRule {
    /// Fixed amount per month, independent of the vehicle.
    #[serde(alias = "flatMonthly", alias = "flat_monthly")]
    Flat { monthly: f64 },
    /// Yearly fraction of the vehicle price (0.04 = 4 %/yr), spread over twelve months.
    #[serde(alias = "annualFraction", alias = "annual_fraction")]
    AnnualFraction { fraction: f64 },
}

impl CostRule {
    fn monthly_amount(self, category: &str, vehicle_price: f64) -> Result<f64, CalcError> {
        match self {
            CostRule::Flat { monthly } => ensure_non_negative(category, monthly),
            CostRule::AnnualFraction { fraction } => {
                let fraction = ensure_non_negative(category, fraction)?;
                Ok(fraction * vehicle_price / 12.0)
            }
        }
    }
}

/// Named cost rules plus ad hoc flat extras, both kept in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPolicy {
    rules: Vec<(String, CostRule)>,
    extras: Vec<(String, f64)>,
}

impl CostPolicy {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        Self::empty()
            .with_rule(FUEL, CostRule::Flat { monthly: 300.0 })
            .with_rule(INSURANCE, CostRule::AnnualFraction { fraction: 0.04 })
            .with_rule(REGISTRATION_TAX, CostRule::AnnualFraction { fraction: 0.04 })
            .with_rule(MAINTENANCE, CostRule::AnnualFraction { fraction: 0.02 })
    }

    /// Adds a rule, replacing any earlier rule with the same name in place.
    pub fn with_rule(mut self, name: &str, rule: CostRule) -> Self {
        upsert(&mut self.rules, name, rule);
        self
    }

    /// Adds a flat monthly extra. Extras are merged after the rules and win
    /// on a name collision.
    pub fn with_extra(mut self, name: &str, monthly: f64) -> Self {
        upsert(&mut self.extras, name, monthly);
        self
    }
}

fn upsert<T>(entries: &mut Vec<(String, T)>, name: &str, value: T) {
    match entries.iter_mut().find(|(existing, _)| existing == name) {
        Some(slot) => slot.1 = value,
        None => entries.push((name.to_string(), value)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEntry {
    pub category: String,
    pub monthly: f64,
}

/// Monthly ownership costs by category. Only built by [`compute_fixed_costs`],
/// so every entry is non-negative and the total is the plain sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    entries: Vec<CostEntry>,
    total: f64,
}

impl CostBreakdown {
    fn from_entries(entries: Vec<CostEntry>) -> Self {
        let total = entries.iter().map(|entry| entry.monthly).sum();
        Self { entries, total }
    }

    pub fn entries(&self) -> &[CostEntry] {
        &self.entries
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.monthly)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn compute_fixed_costs(
    vehicle_price: f64,
    policy: &CostPolicy,
) -> Result<CostBreakdown, CalcError> {
    let vehicle_price = ensure_non_negative("vehiclePrice", vehicle_price)?;

    let mut entries: Vec<CostEntry> = Vec::with_capacity(policy.rules.len() + policy.extras.len());
    for (category, rule) in &policy.rules {
        entries.push(CostEntry {
            category: category.clone(),
            monthly: rule.monthly_amount(category, vehicle_price)?,
        });
    }

    for (category, monthly) in &policy.extras {
        let monthly = ensure_non_negative(category, *monthly)?;
        match entries.iter_mut().find(|entry| &entry.category == category) {
            Some(entry) => entry.monthly = monthly,
            None => entries.push(CostEntry {
                category: category.clone(),
                monthly,
            }),
        }
    }

    Ok(CostBreakdown::from_entries(entries))
}
