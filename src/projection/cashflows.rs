//! Cashflow output structures for simulations

use std::io;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::amounts::ChargeKind;

/// Non-EMI cash movement injected once into a specific month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashEventKind {
    /// Booking amount paid in the first month
    DownPayment,
    /// Share of the price not covered by the loan, paid to the builder at booking
    BuilderUpfront,
    /// Possession payment to the builder at handover
    Possession,
    /// Transfer fees or stamp duty & registration at handover
    StatutoryCharge,
    /// Exit price received in the final month
    SalePrice,
    /// Outstanding loan repaid from the sale proceeds
    LoanRepayment,
    /// Scheduled principal that was never disbursed, paid to the builder at exit
    UndisbursedLoan,
}

impl CashEventKind {
    /// Whether the payment goes to the builder (as opposed to the bank or the state)
    pub fn is_builder_directed(&self) -> bool {
        matches!(
            self,
            CashEventKind::BuilderUpfront | CashEventKind::Possession | CashEventKind::UndisbursedLoan
        )
    }
}

/// Signed amount from the investor's perspective (negative = outflow)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashEvent {
    pub kind: CashEventKind,
    pub amount: f64,
}

impl CashEvent {
    pub fn outflow(kind: CashEventKind, amount: f64) -> Self {
        Self { kind, amount: -amount }
    }

    pub fn inflow(kind: CashEventKind, amount: f64) -> Self {
        Self { kind, amount }
    }
}

/// A single row of the amortization table for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    /// Months since booking, 0 = booking month
    pub month_index: u32,
    pub date: NaiveDate,

    /// e.g. "April 2026"
    pub label: String,

    pub opening_balance: f64,

    /// Sum of `events` from the investor's side: outflows are negative and the
    /// sale is positive. Negate to get the builder-facing convention where
    /// payments are positive.
    pub other_cash_flow: f64,

    /// Human-readable descriptions of `events`, filled by the annotation pass
    pub components: Vec<String>,

    pub events: Vec<CashEvent>,

    pub emi: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,

    /// Paid to the builder this month (up-front, possession, undisbursed true-up)
    pub builder_amount: f64,

    /// `-emi` plus all events
    pub net_cash_flow: f64,
}

/// Complete simulation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    /// Annualized return in percent, two decimals; `None` when the solver found no root
    pub xirr: Option<f64>,

    /// Net cash per calendar year
    pub cashflows_yearly: Vec<f64>,

    pub booking_amount: f64,
    pub possession_amount: f64,
    pub charges_value: f64,
    pub charge_kind: ChargeKind,

    /// Loan principal scheduled but not released before exit
    pub amount_not_disbursed: f64,

    pub loan_principal: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_investment: f64,
    pub total_returns: f64,

    /// Outstanding loan at exit, rounded up
    pub loan_balance: f64,

    pub cagr: f64,

    /// Handover date actually used (after any adjustment)
    pub construction_completion_date: NaiveDate,

    /// `None` when the total investment is zero
    pub equity_multiplier: Option<f64>,

    pub monthly_cf: Vec<MonthlyRow>,
}

/// Flat CSV record for one table row
#[derive(Debug, Serialize)]
struct TableRecord<'a> {
    month: &'a str,
    opening_balance: String,
    other_cash_flow: String,
    components: String,
    emi: String,
    interest: String,
    principal: String,
    closing_balance: String,
    builder_amount: String,
    net_cash_flow: String,
}

impl InvestmentResult {
    /// Monthly net cash flows, in table order
    pub fn net_cash_flows(&self) -> Vec<f64> {
        self.monthly_cf.iter().map(|r| r.net_cash_flow).collect()
    }

    /// Write the monthly table as CSV
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.monthly_cf {
            wtr.serialize(TableRecord {
                month: &row.label,
                opening_balance: format!("{:.2}", row.opening_balance),
                other_cash_flow: format!("{:.2}", row.other_cash_flow),
                components: row.components.join("; "),
                emi: format!("{:.2}", row.emi),
                interest: format!("{:.2}", row.interest),
                principal: format!("{:.2}", row.principal),
                closing_balance: format!("{:.2}", row.closing_balance),
                builder_amount: format!("{:.2}", row.builder_amount),
                net_cash_flow: format!("{:.2}", row.net_cash_flow),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
