//! Simulation engine: disbursement schedule, monthly loop, IRR and summary

mod amounts;
mod cashflows;
mod engine;
mod irr;
mod schedule;
mod state;
mod summary;

pub use amounts::{ChargeKind, DerivedAmounts};
pub use cashflows::{CashEvent, CashEventKind, InvestmentResult, MonthlyRow};
pub use engine::{emi, simulate, SimulationConfig, SimulationEngine};
pub use irr::{irr_monthly, npv_monthly, IrrOutcome, DEFAULT_IRR_GUESS};
pub use schedule::{disburse, quarter_dates, round_cents, DisbursementPlan, QUARTER_MONTHS};
pub use state::LoopState;
pub use summary::{cagr, summarize, InvestmentSummary};
