//! Investment inputs, request defaulting and request loading

mod data;
mod request;
pub mod loader;

pub use data::{AssetType, InvestmentParameters, MAX_TERM_YEARS};
pub use request::{
    DateInput, InvestmentRequest, ResolvedRequest, DEFAULT_INTEREST_RATE_PERCENT, DEFAULT_TENURE_YEARS,
};
pub use loader::{load_request, load_request_from_reader};
