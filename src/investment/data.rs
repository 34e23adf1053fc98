//! Investment input structures

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Longest loan tenure or holding period accepted, in years
pub const MAX_TERM_YEARS: u32 = 100;

/// Kind of property being bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Apartment in an under-construction project
    Apartment,
    /// Independent villa
    Villa,
    /// Land plot, no multi-year construction
    Plot,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Apartment => "apartment",
            AssetType::Villa => "villa",
            AssetType::Plot => "plot",
        }
    }

    /// Maximum number of disbursement quarters (apartment 4 years, plot 2 years)
    pub fn max_quarters(&self) -> Option<usize> {
        match self {
            AssetType::Apartment => Some(16),
            AssetType::Plot => Some(8),
            AssetType::Villa => None,
        }
    }

    pub fn default_holding_period_years(&self) -> u32 {
        match self {
            AssetType::Plot => 3,
            AssetType::Apartment | AssetType::Villa => 4,
        }
    }

    pub fn default_loan_percentage(&self) -> f64 {
        match self {
            AssetType::Plot => 75.0,
            AssetType::Apartment | AssetType::Villa => 85.0,
        }
    }

    /// Years from booking to the assumed handover when no date is given
    pub fn default_construction_years(&self) -> u32 {
        match self {
            AssetType::Plot => 3,
            AssetType::Apartment | AssetType::Villa => 4,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apartment" => Ok(AssetType::Apartment),
            "villa" => Ok(AssetType::Villa),
            "plot" => Ok(AssetType::Plot),
            _ => Err(SimulationError::UnsupportedAssetType(s.to_string())),
        }
    }
}

/// Parameters of one simulated purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentParameters {
    /// Purchase price of the property
    pub acquisition_price: f64,

    /// Loan tenure in years
    pub tenure_years: u32,

    /// Years the investor holds the property before selling
    pub holding_period_years: u32,

    /// Expected construction completion (handover) date
    pub construction_completion_date: NaiveDate,

    /// Expected exit (sale) price
    pub final_price: f64,

    /// Annual loan interest rate in percent, e.g. 8.5
    pub annual_interest_rate_percent: f64,

    /// Share of the acquisition price financed by the loan, 0-100
    pub loan_percentage: f64,

    pub asset_type: AssetType,

    /// Simulation start; `None` means today
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
}

impl InvestmentParameters {
    /// Loan principal scheduled for disbursement
    pub fn loan_principal(&self) -> f64 {
        self.loan_percentage / 100.0 * self.acquisition_price
    }

    /// Number of simulated months: the earlier of loan maturity and exit
    pub fn simulation_months(&self) -> u32 {
        self.tenure_years.min(self.holding_period_years).saturating_mul(12)
    }

    /// Monthly loan rate as a decimal
    pub fn monthly_rate(&self) -> f64 {
        self.annual_interest_rate_percent / 12.0 / 100.0
    }

    /// Reject inputs that cannot produce a meaningful table
    pub fn validate(&self) -> Result<()> {
        if self.tenure_years == 0 {
            return Err(SimulationError::DegenerateSimulation("tenure must be at least one year".into()));
        }
        if self.holding_period_years == 0 {
            return Err(SimulationError::DegenerateSimulation("holding period must be at least one year".into()));
        }
        if self.tenure_years > MAX_TERM_YEARS || self.holding_period_years > MAX_TERM_YEARS {
            return Err(SimulationError::DegenerateSimulation(format!(
                "tenure and holding period are capped at {} years, got {} and {}",
                MAX_TERM_YEARS, self.tenure_years, self.holding_period_years
            )));
        }
        if !self.acquisition_price.is_finite() || self.acquisition_price <= 0.0 {
            return Err(SimulationError::DegenerateSimulation(format!(
                "acquisition price must be positive, got {}",
                self.acquisition_price
            )));
        }
        if !self.final_price.is_finite() || self.final_price <= 0.0 {
            return Err(SimulationError::DegenerateSimulation(format!(
                "final price must be positive, got {}",
                self.final_price
            )));
        }
        if !self.annual_interest_rate_percent.is_finite() || self.annual_interest_rate_percent < 0.0 {
            return Err(SimulationError::DegenerateSimulation(format!(
                "interest rate must be non-negative, got {}",
                self.annual_interest_rate_percent
            )));
        }
        if !(0.0..=100.0).contains(&self.loan_percentage) {
            return Err(SimulationError::DegenerateSimulation(format!(
                "loan percentage must be between 0 and 100, got {}",
                self.loan_percentage
            )));
        }
        Ok(())
    }
}
