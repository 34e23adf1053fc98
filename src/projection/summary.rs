//! Summary metrics reduced from the monthly table

use serde::{Deserialize, Serialize};

use super::amounts::DerivedAmounts;
use super::cashflows::MonthlyRow;
use super::schedule::round_cents;
use crate::investment::InvestmentParameters;

/// Investment-level metrics for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    pub total_interest: f64,
    pub total_principal: f64,

    /// Booking + interest + principal, plus the statutory charge when paid before exit
    pub total_investment: f64,

    /// Exit gain net of interest and the statutory charge
    pub total_returns: f64,

    /// (investment + returns) / investment, two decimals
    pub equity_multiplier: Option<f64>,

    pub cagr: f64,

    /// Outstanding loan at exit, rounded up
    pub loan_balance: f64,
}

pub fn summarize(
    rows: &[MonthlyRow],
    amounts: &DerivedAmounts,
    params: &InvestmentParameters,
    final_balance: f64,
) -> InvestmentSummary {
    let total_interest: f64 = rows.iter().map(|r| r.interest).sum();
    let total_principal: f64 = rows.iter().map(|r| r.principal).sum();

    let mut total_investment = (amounts.booking_amount + total_interest + total_principal).trunc();
    if amounts.charge_borne_before_exit(params.holding_period_years) {
        total_investment += amounts.charge_amount;
    }

    let total_returns = params.final_price - params.acquisition_price - total_interest - amounts.charge_amount;

    let equity_multiplier = if total_investment != 0.0 {
        Some(round_cents((total_investment + total_returns) / total_investment))
    } else {
        None
    };

    InvestmentSummary {
        total_interest,
        total_principal,
        total_investment,
        total_returns,
        equity_multiplier,
        cagr: cagr(params.acquisition_price, params.final_price, params.holding_period_years),
        loan_balance: final_balance.ceil(),
    }
}

/// Compound annual growth from acquisition to exit price
pub fn cagr(acquisition_price: f64, final_price: f64, years: u32) -> f64 {
    (final_price / acquisition_price).powf(1.0 / years as f64) - 1.0
}
