//! Property Cashflow CLI
//!
//! Command-line interface for simulating a property purchase

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use property_cashflow::{
    calendar,
    format::format_inr,
    investment::{load_request, DateInput, InvestmentRequest},
    projection::{SimulationConfig, SimulationEngine},
};

/// Simulate the cash flows of a leveraged property purchase
#[derive(Parser, Debug)]
#[command(name = "property_cashflow", version, about)]
struct Cli {
    /// JSON request file (same fields as the HTTP API); flags override its values
    #[arg(long)]
    input: Option<PathBuf>,

    /// Purchase price
    #[arg(long)]
    acquisition_price: Option<f64>,

    /// Expected exit price
    #[arg(long)]
    final_price: Option<f64>,

    /// apartment, villa or plot
    #[arg(long)]
    asset_type: Option<String>,

    /// Loan tenure in years
    #[arg(long)]
    tenure: Option<u32>,

    /// Holding period in years
    #[arg(long)]
    holding_period: Option<u32>,

    /// Annual interest rate in percent
    #[arg(long)]
    interest_rate: Option<f64>,

    /// Financed share of the price in percent
    #[arg(long)]
    loan_percentage: Option<f64>,

    /// Construction completion date (YYYY-MM-DD)
    #[arg(long)]
    construction_date: Option<String>,

    /// Booking date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    booking_date: Option<String>,

    /// Write the monthly table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Number of monthly rows to print
    #[arg(long, default_value_t = 24)]
    rows: usize,
}

impl Cli {
    fn request(&self) -> Result<InvestmentRequest> {
        let mut request = match &self.input {
            Some(path) => load_request(path)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("Failed to load request from {}", path.display()))?,
            None => InvestmentRequest::default(),
        };

        if self.acquisition_price.is_some() {
            request.acquisition_price = self.acquisition_price;
        }
        if self.final_price.is_some() {
            request.final_price = self.final_price;
        }
        if self.asset_type.is_some() {
            request.asset_type = self.asset_type.clone();
        }
        if self.tenure.is_some() {
            request.tenure = self.tenure;
        }
        if self.holding_period.is_some() {
            request.holding_period = self.holding_period;
        }
        if self.interest_rate.is_some() {
            request.interest_rate = self.interest_rate;
        }
        if self.loan_percentage.is_some() {
            request.loan_percentage = self.loan_percentage;
        }
        if let Some(date) = &self.construction_date {
            request.construction_completion_date = Some(DateInput::Text(date.clone()));
        }
        if let Some(date) = &self.booking_date {
            request.booking_date = Some(DateInput::Text(date.clone()));
        }

        Ok(request)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let request = cli.request()?;
    let resolved = request.resolve(calendar::today())?;
    if let Some(warning) = &resolved.warning {
        log::warn!("{}", warning);
    }

    let engine = SimulationEngine::new(SimulationConfig::default());
    let result = engine.simulate(&resolved.parameters)?;

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        result.write_csv(file)?;
        log::info!("Monthly table written to {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let p = &resolved.parameters;
    println!("Property Cashflow v{}", env!("CARGO_PKG_VERSION"));
    println!("=========================\n");
    println!("Asset: {}  Price: {}  Exit: {}", p.asset_type, format_inr(p.acquisition_price as i64), format_inr(p.final_price as i64));
    println!(
        "Loan: {:.1}% at {:.2}% over {} years, holding {} years, handover {}",
        p.loan_percentage,
        p.annual_interest_rate_percent,
        p.tenure_years,
        p.holding_period_years,
        result.construction_completion_date
    );
    println!();

    println!(
        "{:<15} {:>14} {:>14} {:>12} {:>12} {:>12} {:>14} {:>14}",
        "Month", "Opening", "Other CF", "EMI", "Interest", "Principal", "Closing", "Net CF"
    );
    println!("{}", "-".repeat(115));
    for row in result.monthly_cf.iter().take(cli.rows) {
        println!(
            "{:<15} {:>14.2} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2}",
            row.label,
            row.opening_balance,
            row.other_cash_flow,
            row.emi,
            row.interest,
            row.principal,
            row.closing_balance,
            row.net_cash_flow,
        );
        for component in &row.components {
            println!("{:<15} {}", "", component);
        }
    }
    if result.monthly_cf.len() > cli.rows {
        println!("... ({} more months)", result.monthly_cf.len() - cli.rows);
    }

    println!("\nSummary:");
    match result.xirr {
        Some(xirr) => println!("  XIRR: {:.2}%", xirr),
        None => println!("  XIRR: N/A"),
    }
    println!("  CAGR: {:.2}%", result.cagr * 100.0);
    match result.equity_multiplier {
        Some(m) => println!("  Equity Multiplier: {:.2}x", m),
        None => println!("  Equity Multiplier: N/A"),
    }
    println!("  Total Investment: {}", format_inr(result.total_investment as i64));
    println!("  Total Returns: {}", format_inr(result.total_returns as i64));
    println!("  Booking Amount: {}", format_inr(result.booking_amount as i64));
    println!("  Possession Amount: {}", format_inr(result.possession_amount as i64));
    println!("  Charges: {}", format_inr(result.charges_value as i64));
    println!("  Loan Balance at Exit: {}", format_inr(result.loan_balance as i64));
    println!("  Yearly Cash Flows: {:?}", result.cashflows_yearly.iter().map(|v| v.round()).collect::<Vec<_>>());

    Ok(())
}
