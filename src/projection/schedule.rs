//! Quarterly loan disbursement schedule
//!
//! Construction-linked loans are released in quarterly tranches. Apartments and
//! villas front-load the release over a year-percentage profile; plots release
//! half of the loan in the first year and the rest evenly afterwards.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::calendar;
use crate::error::{Result, SimulationError};
use crate::investment::{AssetType, InvestmentParameters};

/// Months between two disbursement quarters
pub const QUARTER_MONTHS: u32 = 3;

/// Round to two decimals
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Year-percentage profile for apartments and villas, chosen by quarter count
fn year_profile(num_quarters: usize) -> &'static [f64] {
    match num_quarters {
        n if n >= 13 => &[0.40, 0.30, 0.15, 0.15],
        9..=12 => &[0.70, 0.15, 0.15],
        5..=8 => &[0.85, 0.15],
        _ => &[1.0],
    }
}

/// Split `total_loan` over `quarters` according to the asset type's policy.
///
/// Every entry is rounded to two decimals independently, so the sum may drift
/// from `total_loan` by at most one cent per quarter.
pub fn disburse(quarters: &[NaiveDate], total_loan: f64, asset_type: AssetType) -> Result<Vec<f64>> {
    if quarters.is_empty() {
        return Err(SimulationError::InvalidScheduleInput("quarter list is empty".into()));
    }
    if !total_loan.is_finite() || total_loan <= 0.0 {
        return Err(SimulationError::InvalidScheduleInput(format!(
            "loan amount must be positive, got {}",
            total_loan
        )));
    }

    let n = quarters.len();

    let disbursement = match asset_type {
        AssetType::Plot if n <= 4 => vec![round_cents(total_loan / n as f64); n],
        AssetType::Plot => {
            let first_year_share = round_cents(total_loan * 0.5 / 4.0);
            let later_share = round_cents(total_loan * 0.5 / (n - 4) as f64);
            let mut amounts = vec![first_year_share; 4];
            amounts.extend(std::iter::repeat(later_share).take(n - 4));
            amounts
        }
        AssetType::Apartment | AssetType::Villa => {
            let profile = year_profile(n);
            let years = profile.len();
            let quarters_per_year = n / years;
            let remainder = n % years;

            let mut amounts = Vec::with_capacity(n);
            for (i, pct) in profile.iter().enumerate() {
                // Remainder quarters all land in the last bucket
                let bucket_quarters = if i < years - 1 {
                    quarters_per_year
                } else {
                    quarters_per_year + remainder
                };
                for _ in 0..bucket_quarters {
                    amounts.push(round_cents(total_loan * (pct / bucket_quarters as f64)));
                }
            }
            amounts
        }
    };

    Ok(disbursement)
}

/// Disbursement quarters: every 3 months from `first_quarter`, strictly before `handover`
pub fn quarter_dates(first_quarter: NaiveDate, handover: NaiveDate) -> Result<Vec<NaiveDate>> {
    let mut quarters = Vec::new();
    let mut quarter = first_quarter;
    while calendar::is_before(quarter, handover) {
        quarters.push(quarter);
        quarter = calendar::add_months(quarter, QUARTER_MONTHS)?;
    }
    Ok(quarters)
}

/// Quarters, amounts and the adjusted handover date for one simulation
#[derive(Debug, Clone, PartialEq)]
pub struct DisbursementPlan {
    /// Handover date, pushed out a year when it falls too close to booking
    pub handover_date: NaiveDate,

    /// Disbursement quarters after the asset-type cap
    pub quarters: Vec<NaiveDate>,

    /// Amount released at each quarter
    pub amounts: Vec<f64>,
}

impl DisbursementPlan {
    pub fn build(params: &InvestmentParameters, booking_date: NaiveDate) -> Result<Self> {
        let first_quarter = calendar::add_months(booking_date, QUARTER_MONTHS)?;

        // A handover on or before the first quarter leaves nothing to disburse
        let handover_date = if calendar::is_before(first_quarter, params.construction_completion_date) {
            params.construction_completion_date
        } else {
            let adjusted = calendar::add_years(first_quarter, 1)?;
            warn!(
                "Construction date {} precedes first quarter {}, handover moved to {}",
                params.construction_completion_date, first_quarter, adjusted
            );
            adjusted
        };

        let mut quarters = quarter_dates(first_quarter, handover_date)?;
        if let Some(max) = params.asset_type.max_quarters() {
            quarters.truncate(max);
        }

        let amounts = disburse(&quarters, params.loan_principal(), params.asset_type)?;

        debug!(
            "Disbursement plan: {} quarters from {} totalling {:.2}",
            quarters.len(),
            first_quarter,
            amounts.iter().sum::<f64>()
        );

        Ok(Self { handover_date, quarters, amounts })
    }

    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }
}
