//! Request payload with asset-type dependent defaults
//!
//! Mirrors the JSON body accepted by the report endpoint. Only the prices and
//! the asset type are required; everything else falls back to defaults.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data::{AssetType, InvestmentParameters};
use crate::calendar;
use crate::error::{Result, SimulationError};

pub const DEFAULT_TENURE_YEARS: u32 = 20;
pub const DEFAULT_INTEREST_RATE_PERCENT: f64 = 8.5;

/// A date given either as `YYYY-MM-DD` text or as a Unix timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Timestamp(i64),
    Text(String),
}

impl DateInput {
    pub fn resolve(&self) -> Result<NaiveDate> {
        match self {
            DateInput::Timestamp(ts) => calendar::from_unix_timestamp(*ts),
            DateInput::Text(text) => calendar::parse_date(text),
        }
    }
}

/// Raw investment report request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRequest {
    pub acquisition_price: Option<f64>,
    pub final_price: Option<f64>,
    pub asset_type: Option<String>,
    pub tenure: Option<u32>,
    pub holding_period: Option<u32>,
    pub construction_completion_date: Option<DateInput>,
    pub interest_rate: Option<f64>,
    pub loan_percentage: Option<f64>,
    pub booking_date: Option<DateInput>,
}

/// Parameters after defaults were applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub parameters: InvestmentParameters,

    /// Set when the construction date had to be defaulted
    pub warning: Option<String>,
}

impl InvestmentRequest {
    /// Apply defaults and produce simulation parameters.
    /// `today` is the booking date when the request does not carry one.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedRequest> {
        let acquisition_price = self.acquisition_price.ok_or(SimulationError::MissingField("acquisitionPrice"))?;
        let final_price = self.final_price.ok_or(SimulationError::MissingField("finalPrice"))?;
        let asset_type: AssetType = self
            .asset_type
            .as_deref()
            .ok_or(SimulationError::MissingField("assetType"))?
            .parse()?;

        let booking_date = match &self.booking_date {
            Some(input) => input.resolve()?,
            None => today,
        };

        let (construction_completion_date, warning) = match &self.construction_completion_date {
            Some(input) => (input.resolve()?, None),
            None => {
                let date = calendar::add_years(booking_date, asset_type.default_construction_years())?;
                let warning = format!(
                    "Construction completion date not provided, using default date based on asset type: {}",
                    asset_type
                );
                (date, Some(warning))
            }
        };

        let parameters = InvestmentParameters {
            acquisition_price,
            tenure_years: self.tenure.unwrap_or(DEFAULT_TENURE_YEARS),
            holding_period_years: self
                .holding_period
                .unwrap_or_else(|| asset_type.default_holding_period_years()),
            construction_completion_date,
            final_price,
            annual_interest_rate_percent: self.interest_rate.unwrap_or(DEFAULT_INTEREST_RATE_PERCENT),
            loan_percentage: self
                .loan_percentage
                .unwrap_or_else(|| asset_type.default_loan_percentage()),
            asset_type,
            booking_date: Some(booking_date),
        };

        Ok(ResolvedRequest { parameters, warning })
    }
}
