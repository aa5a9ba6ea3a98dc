use serde::Serialize;

use super::types::BuyerProfile;

/// Below this much spendable cash an outright purchase is not realistic.
pub const CASH_PURCHASE_THRESHOLD: f64 = 10_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    SaveBeforeCashPurchase,
    ConsiderUsedVehicle,
    CompareFinancingOffers,
    LargerDownPayment,
    KeepMaintenanceReserve,
}

pub fn recommendations(profile: &BuyerProfile) -> Vec<Recommendation> {
    let mut advice = Vec::with_capacity(5);
    if profile.max_cash_available() < CASH_PURCHASE_THRESHOLD {
        advice.push(Recommendation::SaveBeforeCashPurchase);
    }
    advice.extend([
        Recommendation::ConsiderUsedVehicle,
        Recommendation::CompareFinancingOffers,
        Recommendation::LargerDownPayment,
        Recommendation::KeepMaintenanceReserve,
    ]);
    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_cash_leads_with_saving_advice() {
        let profile = BuyerProfile::new(5_000.0, 10_000.0).expect("valid profile");
        let advice = recommendations(&profile);
        assert_eq!(advice.len(), 5);
        assert_eq!(advice[0], Recommendation::SaveBeforeCashPurchase);
    }

    #[test]
    fn enough_cash_skips_saving_advice() {
        let profile = BuyerProfile::new(5_000.0, 100_000.0).expect("valid profile");
        let advice = recommendations(&profile);
        assert_eq!(
            advice,
            vec![
                Recommendation::ConsiderUsedVehicle,
                Recommendation::CompareFinancingOffers,
                Recommendation::LargerDownPayment,
                Recommendation::KeepMaintenanceReserve,
            ]
        );
    }

    #[test]
    fn codes_serialize_as_kebab_case() {
        let json = serde_json::to_string(&Recommendation::SaveBeforeCashPurchase)
            .expect("serializes");
        assert_eq!(json, "\"save-before-cash-purchase\"");
    }
}
