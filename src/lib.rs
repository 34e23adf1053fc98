//! Property Cashflow - month-by-month projection of a leveraged property purchase
//!
//! This library provides:
//! - Quarterly construction-linked loan disbursement schedules
//! - Monthly amortization with one-off booking, possession and exit cash events
//! - Annualized IRR of the investor's monthly cash flows
//! - Summary metrics (total investment, returns, equity multiplier, CAGR)

pub mod calendar;
pub mod error;
pub mod format;
pub mod investment;
pub mod projection;

// Re-export commonly used types
pub use error::SimulationError;
pub use investment::{AssetType, InvestmentParameters, InvestmentRequest};
pub use projection::{simulate, InvestmentResult, MonthlyRow, SimulationEngine};
