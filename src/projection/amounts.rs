//! One-time amounts derived from the purchase terms

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::investment::InvestmentParameters;

/// Booking (down payment) share of the acquisition price
pub const BOOKING_PCT: f64 = 10.0;
/// Possession payment cap, further limited by the financing headroom below 90%
pub const POSSESSION_PCT_CAP: f64 = 5.0;
/// Combined loan + builder threshold used for possession headroom
pub const POSSESSION_HEADROOM_PCT: f64 = 90.0;
/// Loan + builder up-front payment always covers this share before possession
pub const BUILDER_THRESHOLD_PCT: f64 = 85.0;

/// Statutory charge applied at handover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    /// Handover at or after the planned exit: the unit is resold before registration
    TransferFees,
    /// Handover before the exit: stamp duty and registration are paid
    StampDutyAndRegistration,
}

impl ChargeKind {
    /// Charge as a share of the acquisition price
    pub fn rate(&self) -> f64 {
        match self {
            ChargeKind::TransferFees => 0.02,
            ChargeKind::StampDutyAndRegistration => 0.065,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChargeKind::TransferFees => "transfer fees",
            ChargeKind::StampDutyAndRegistration => "stamp duty & registration charges",
        }
    }
}

/// Scalars fixed before the monthly loop starts
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedAmounts {
    pub booking_amount: f64,
    pub possession_amount: f64,
    pub builder_upfront: f64,
    pub loan_principal: f64,
    pub charge_kind: ChargeKind,
    pub charge_amount: f64,

    /// Handover year minus booking year
    pub handover_period_years: i32,
}

impl DerivedAmounts {
    pub fn compute(params: &InvestmentParameters, booking_date: NaiveDate, handover_date: NaiveDate) -> Self {
        let price = params.acquisition_price;

        let possession_pct = POSSESSION_PCT_CAP.min(POSSESSION_HEADROOM_PCT - params.loan_percentage);
        let builder_pct = (BUILDER_THRESHOLD_PCT - params.loan_percentage).max(0.0);

        let handover_period_years = calendar::year(handover_date) - calendar::year(booking_date);
        let charge_kind = if i64::from(handover_period_years) >= i64::from(params.holding_period_years) {
            ChargeKind::TransferFees
        } else {
            ChargeKind::StampDutyAndRegistration
        };

        Self {
            booking_amount: BOOKING_PCT / 100.0 * price,
            possession_amount: possession_pct / 100.0 * price,
            builder_upfront: builder_pct / 100.0 * price,
            loan_principal: params.loan_principal(),
            charge_kind,
            charge_amount: price * charge_kind.rate(),
            handover_period_years,
        }
    }

    /// The charge is borne before exit only when the holding period outlasts handover
    pub fn charge_borne_before_exit(&self, holding_period_years: u32) -> bool {
        i64::from(holding_period_years) > i64::from(self.handover_period_years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investment::AssetType;
    use approx::assert_relative_eq;

    fn params(loan_percentage: f64, holding: u32) -> InvestmentParameters {
        InvestmentParameters {
            acquisition_price: 5_000_000.0,
            tenure_years: 20,
            holding_period_years: holding,
            construction_completion_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            final_price: 8_000_000.0,
            annual_interest_rate_percent: 8.5,
            loan_percentage,
            asset_type: AssetType::Apartment,
            booking_date: None,
        }
    }

    fn dates() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_fully_financed_purchase() {
        let (booking, handover) = dates();
        let amounts = DerivedAmounts::compute(&params(85.0, 4), booking, handover);

        assert_relative_eq!(amounts.booking_amount, 500_000.0);
        assert_relative_eq!(amounts.possession_amount, 250_000.0);
        assert_eq!(amounts.builder_upfront, 0.0);
        assert_eq!(amounts.handover_period_years, 4);
        assert_eq!(amounts.charge_kind, ChargeKind::TransferFees);
        assert_relative_eq!(amounts.charge_amount, 100_000.0);
        assert!(!amounts.charge_borne_before_exit(4));
    }

    #[test]
    fn test_lower_loan_pays_builder_upfront() {
        let (booking, handover) = dates();
        let amounts = DerivedAmounts::compute(&params(75.0, 5), booking, handover);

        assert_relative_eq!(amounts.builder_upfront, 500_000.0);
        assert_relative_eq!(amounts.possession_amount, 250_000.0);
        assert_eq!(amounts.charge_kind, ChargeKind::StampDutyAndRegistration);
        assert_relative_eq!(amounts.charge_amount, 325_000.0);
        assert!(amounts.charge_borne_before_exit(5));
    }

    #[test]
    fn test_possession_limited_by_headroom() {
        let (booking, handover) = dates();
        let amounts = DerivedAmounts::compute(&params(87.0, 4), booking, handover);

        assert_relative_eq!(amounts.possession_amount, 150_000.0);
    }
}
