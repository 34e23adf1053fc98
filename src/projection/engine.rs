//! Core simulation engine for monthly amortization and cash-flow projections

use chrono::NaiveDate;
use log::{debug, info, warn};

use super::amounts::DerivedAmounts;
use super::cashflows::{CashEvent, CashEventKind, InvestmentResult, MonthlyRow};
use super::irr::{irr_monthly, IrrOutcome, DEFAULT_IRR_GUESS};
use super::schedule::{round_cents, DisbursementPlan};
use super::state::LoopState;
use super::summary::summarize;
use crate::calendar;
use crate::error::{Result, SimulationError};
use crate::format;
use crate::investment::InvestmentParameters;

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Starting rate for the IRR solve
    pub irr_guess: f64,

    /// Whether to attach human-readable labels to one-off cash events
    pub annotate_labels: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            irr_guess: DEFAULT_IRR_GUESS,
            annotate_labels: true,
        }
    }
}

/// Fixed inputs shared by every simulated month
struct MonthContext<'a> {
    params: &'a InvestmentParameters,
    booking_date: NaiveDate,
    plan: &'a DisbursementPlan,
    amounts: &'a DerivedAmounts,
    total_months: u32,
    monthly_rate: f64,
}

/// Main simulation engine
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

/// Run one simulation with the default configuration
pub fn simulate(params: &InvestmentParameters) -> Result<InvestmentResult> {
    SimulationEngine::default().simulate(params)
}

/// Level payment on `balance` over `remaining_months` at `monthly_rate`.
/// A zero rate amortizes linearly.
pub fn emi(balance: f64, monthly_rate: f64, remaining_months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return balance / remaining_months as f64;
    }
    let periods = i32::try_from(remaining_months).unwrap_or(i32::MAX);
    balance * monthly_rate / (1.0 - (1.0 + monthly_rate).powi(-periods))
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Simulate the purchase from booking to exit
    pub fn simulate(&self, params: &InvestmentParameters) -> Result<InvestmentResult> {
        params.validate()?;

        let booking_date = params.booking_date.unwrap_or_else(calendar::today);
        let plan = DisbursementPlan::build(params, booking_date)?;
        let amounts = DerivedAmounts::compute(params, booking_date, plan.handover_date);
        debug!("Derived amounts: {:?}", amounts);

        let ctx = MonthContext {
            params,
            booking_date,
            plan: &plan,
            amounts: &amounts,
            total_months: params.simulation_months(),
            monthly_rate: params.monthly_rate(),
        };

        let mut rows = Vec::with_capacity(ctx.total_months as usize);
        let state = (0..ctx.total_months).try_fold(LoopState::initial(), |state, _| {
            let (next, row) = self.step_month(&ctx, state)?;
            rows.push(row);
            Ok::<_, SimulationError>(next)
        })?;

        let final_balance = state.balance;
        let amount_not_disbursed = (amounts.loan_principal - state.disbursed).max(0.0);
        let cashflows_yearly = reconcile_yearly(state, params, &amounts);

        let net: Vec<f64> = rows.iter().map(|r| r.net_cash_flow).collect();
        let xirr = match irr_monthly(&net, self.config.irr_guess) {
            IrrOutcome::Converged(rate) if rate.is_finite() && rate != 0.0 => Some(round_cents(rate * 100.0)),
            outcome => {
                warn!("IRR unavailable for {} monthly flows ({:?})", net.len(), outcome);
                None
            }
        };

        let summary = summarize(&rows, &amounts, params, final_balance);

        if self.config.annotate_labels {
            format::annotate(&mut rows, amounts.charge_kind);
        }

        info!(
            "Simulated {} months for {} purchase: xirr={:?} investment={:.0} multiplier={:?}",
            rows.len(),
            params.asset_type,
            xirr,
            summary.total_investment,
            summary.equity_multiplier
        );

        Ok(InvestmentResult {
            xirr,
            cashflows_yearly,
            booking_amount: amounts.booking_amount,
            possession_amount: amounts.possession_amount,
            charges_value: amounts.charge_amount,
            charge_kind: amounts.charge_kind,
            amount_not_disbursed,
            loan_principal: amounts.loan_principal,
            total_interest: summary.total_interest,
            total_principal: summary.total_principal,
            total_investment: summary.total_investment,
            total_returns: summary.total_returns,
            loan_balance: summary.loan_balance,
            cagr: summary.cagr,
            construction_completion_date: plan.handover_date,
            equity_multiplier: summary.equity_multiplier,
            monthly_cf: rows,
        })
    }

    /// Calculate one month of amortization and one-off cash events
    fn step_month(&self, ctx: &MonthContext<'_>, mut state: LoopState) -> Result<(LoopState, MonthlyRow)> {
        let i = state.month_index;
        let date = calendar::add_months(ctx.booking_date, i)?;
        let is_last = i + 1 == ctx.total_months;

        // Quarterly tranche lands before this month's EMI is computed
        if let Some(&quarter) = ctx.plan.quarters.get(state.next_quarter) {
            if calendar::same_month(quarter, date) {
                let amount = ctx.plan.amounts[state.next_quarter];
                state = state.disburse(amount);
            }
        }

        // EMI is recomputed against the current balance and the remaining term
        let opening_balance = state.balance;
        let remaining_months = ctx.params.tenure_years * 12 - i;
        let emi = emi(opening_balance, ctx.monthly_rate, remaining_months);
        let interest = opening_balance * ctx.monthly_rate;
        let principal = emi - interest;
        let closing_balance = opening_balance - principal;

        let amounts = ctx.amounts;
        let mut events = Vec::new();

        if i == 0 {
            events.push(CashEvent::outflow(CashEventKind::DownPayment, amounts.booking_amount));
            if amounts.builder_upfront > 0.0 {
                events.push(CashEvent::outflow(CashEventKind::BuilderUpfront, amounts.builder_upfront));
            }
        }

        let is_handover_month = calendar::same_month(date, ctx.plan.handover_date);
        if is_handover_month || (is_last && !state.handover_settled) {
            if !is_handover_month {
                warn!(
                    "Handover {} falls outside the {}-month window, settling possession in {}",
                    ctx.plan.handover_date,
                    ctx.total_months,
                    calendar::month_label(date)
                );
            }
            events.push(CashEvent::outflow(CashEventKind::Possession, amounts.possession_amount));
            events.push(CashEvent::outflow(CashEventKind::StatutoryCharge, amounts.charge_amount));
            state.handover_settled = true;
        }

        if is_last {
            events.push(CashEvent::inflow(CashEventKind::SalePrice, ctx.params.final_price));
            events.push(CashEvent::outflow(CashEventKind::LoanRepayment, closing_balance));

            let undisbursed = (amounts.loan_principal - state.disbursed).trunc();
            if undisbursed != 0.0 {
                events.push(CashEvent::outflow(CashEventKind::UndisbursedLoan, undisbursed));
            }
        }

        let other_cash_flow: f64 = events.iter().map(|e| e.amount).sum();
        let builder_amount: f64 = events
            .iter()
            .filter(|e| e.kind.is_builder_directed())
            .map(|e| -e.amount)
            .sum();
        let emi_outflow = if emi.is_finite() { -emi } else { 0.0 };

        let row = MonthlyRow {
            month_index: i,
            date,
            label: calendar::month_label(date),
            opening_balance,
            other_cash_flow,
            components: Vec::new(),
            events,
            emi,
            interest,
            principal,
            closing_balance,
            builder_amount,
            net_cash_flow: emi_outflow + other_cash_flow,
        };

        let next = state.advance(
            date,
            emi,
            builder_amount,
            closing_balance,
            ctx.plan.handover_date,
            amounts.charge_amount,
        );

        Ok((next, row))
    }
}

/// Close the calendar-year buckets after the last simulated month.
///
/// Any partial year is flushed, exit proceeds land in the last non-zero year,
/// the booking amount comes out of the first year and a statutory charge that
/// never fell into a closed year comes out of the last one.
fn reconcile_yearly(state: LoopState, params: &InvestmentParameters, amounts: &DerivedAmounts) -> Vec<f64> {
    let open_year = state.has_open_year();
    let mut yearly = state.yearly;

    if open_year {
        yearly.push(-(state.yearly_emi + state.yearly_builder));
    }
    if yearly.is_empty() {
        yearly.push(0.0);
    }

    let exit_proceeds = params.final_price - state.balance;
    let last = yearly.len() - 1;
    if yearly[last] != 0.0 || last == 0 {
        yearly[last] += exit_proceeds;
    } else {
        yearly.pop();
        yearly[last - 1] += exit_proceeds;
    }

    yearly[0] -= amounts.booking_amount;

    if !state.charge_in_yearly {
        if let Some(last) = yearly.last_mut() {
            *last -= amounts.charge_amount;
        }
    }

    yearly.retain(|v| v.is_finite());
    yearly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investment::AssetType;
    use crate::projection::ChargeKind;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario() -> InvestmentParameters {
        InvestmentParameters {
            acquisition_price: 5_000_000.0,
            tenure_years: 20,
            holding_period_years: 4,
            construction_completion_date: date(2030, 1, 15),
            final_price: 8_000_000.0,
            annual_interest_rate_percent: 8.5,
            loan_percentage: 85.0,
            asset_type: AssetType::Apartment,
            booking_date: Some(date(2026, 1, 15)),
        }
    }

    fn count_events(result: &InvestmentResult, kind: CashEventKind) -> usize {
        result
            .monthly_cf
            .iter()
            .flat_map(|r| r.events.iter())
            .filter(|e| e.kind == kind)
            .count()
    }

    #[test]
    fn test_emi_formula() {
        // 100k over 12 months at 1% per month
        assert_abs_diff_eq!(emi(100_000.0, 0.01, 12), 8_884.88, epsilon = 1e-2);
        assert_eq!(emi(0.0, 0.01, 12), 0.0);
        assert_eq!(emi(1_200.0, 0.0, 12), 100.0);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let result = simulate(&scenario()).unwrap();

        assert_eq!(result.monthly_cf.len(), 48);
        assert!(result.xirr.is_some());
        assert!(result.equity_multiplier.unwrap() > 1.0);
        assert_eq!(result.charge_kind, ChargeKind::TransferFees);
        assert_eq!(result.construction_completion_date, date(2030, 1, 15));
        assert_eq!(result.monthly_cf[0].label, "January 2026");
        assert_eq!(result.monthly_cf[47].label, "December 2029");
    }

    #[test]
    fn test_row_invariants() {
        let result = simulate(&scenario()).unwrap();

        for row in &result.monthly_cf {
            assert_abs_diff_eq!(row.closing_balance, row.opening_balance - row.principal, epsilon = 1e-6);
            assert_abs_diff_eq!(row.principal + row.interest, row.emi, epsilon = 1e-6);
            let events: f64 = row.events.iter().map(|e| e.amount).sum();
            assert_abs_diff_eq!(row.net_cash_flow, events - row.emi, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_disbursements_follow_plan() {
        let result = simulate(&scenario()).unwrap();
        let rows = &result.monthly_cf;

        // Nothing is outstanding before the first quarter in April 2026
        assert_eq!(rows[0].opening_balance, 0.0);
        assert_eq!(rows[2].emi, 0.0);
        assert!(rows[3].opening_balance > 0.0);

        // 15 quarters from April 2026 to October 2029, all released before exit
        assert_eq!(result.amount_not_disbursed, 0.0);
        assert_eq!(count_events(&result, CashEventKind::UndisbursedLoan), 0);
    }

    #[test]
    fn test_idempotent_with_fixed_booking_date() {
        let first = serde_json::to_string(&simulate(&scenario()).unwrap()).unwrap();
        let second = serde_json::to_string(&simulate(&scenario()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_holding_equals_tenure() {
        let mut params = scenario();
        params.tenure_years = 3;
        params.holding_period_years = 3;
        params.construction_completion_date = date(2027, 6, 30);

        let result = simulate(&params).unwrap();

        assert_eq!(result.monthly_cf.len(), 36);
        assert_eq!(count_events(&result, CashEventKind::SalePrice), 1);
        assert_eq!(count_events(&result, CashEventKind::LoanRepayment), 1);
        assert_eq!(count_events(&result, CashEventKind::Possession), 1);

        let last = result.monthly_cf.last().unwrap();
        assert!(last.events.iter().any(|e| e.kind == CashEventKind::SalePrice));
        // The final EMI retires the loan
        assert_abs_diff_eq!(last.closing_balance, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_handover_inside_window() {
        let mut params = scenario();
        params.construction_completion_date = date(2027, 6, 30);

        let result = simulate(&params).unwrap();
        let june_2027 = &result.monthly_cf[17];

        assert_eq!(june_2027.label, "June 2027");
        assert!(june_2027.events.iter().any(|e| e.kind == CashEventKind::Possession));
        assert_eq!(count_events(&result, CashEventKind::Possession), 1);
        assert_eq!(count_events(&result, CashEventKind::StatutoryCharge), 1);

        // Handed over a year in, so stamp duty applies and is borne before exit
        assert_eq!(result.charge_kind, ChargeKind::StampDutyAndRegistration);
        assert_abs_diff_eq!(result.charges_value, 325_000.0, epsilon = 1e-6);
        let base = (result.booking_amount + result.total_interest + result.total_principal).trunc();
        assert_abs_diff_eq!(result.total_investment, base + 325_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_handover_after_exit_falls_back_to_last_month() {
        let mut params = scenario();
        params.construction_completion_date = date(2035, 1, 15);
        params.asset_type = AssetType::Villa;

        let result = simulate(&params).unwrap();
        let last = result.monthly_cf.last().unwrap();

        assert_eq!(count_events(&result, CashEventKind::Possession), 1);
        assert!(last.events.iter().any(|e| e.kind == CashEventKind::Possession));
        assert!(last.events.iter().any(|e| e.kind == CashEventKind::StatutoryCharge));

        // Villa quarters run past exit, so part of the loan is never released
        assert!(result.amount_not_disbursed > 0.0);
        assert_eq!(count_events(&result, CashEventKind::UndisbursedLoan), 1);
        assert!(last.builder_amount > result.possession_amount);
    }

    #[test]
    fn test_builder_upfront_with_lower_loan() {
        let mut params = scenario();
        params.loan_percentage = 75.0;

        let result = simulate(&params).unwrap();
        let first = &result.monthly_cf[0];

        assert_abs_diff_eq!(first.builder_amount, 500_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(first.net_cash_flow, -1_000_000.0, epsilon = 1e-6);
        assert_eq!(first.components.len(), 2);
    }

    #[test]
    fn test_yearly_matches_monthly_total() {
        for construction in [date(2027, 6, 30), date(2030, 1, 15), date(2035, 1, 15)] {
            let mut params = scenario();
            params.construction_completion_date = construction;
            params.booking_date = Some(date(2026, 5, 10));

            let result = simulate(&params).unwrap();
            let monthly: f64 = result.net_cash_flows().iter().sum();
            let yearly: f64 = result.cashflows_yearly.iter().sum();

            assert_abs_diff_eq!(monthly, yearly, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_yearly_buckets_by_calendar_year() {
        let result = simulate(&scenario()).unwrap();

        // Booked in January: one bucket per year 2026-2029
        assert_eq!(result.cashflows_yearly.len(), 4);
        assert!(result.cashflows_yearly[0] < -result.booking_amount + 1.0);
        assert!(*result.cashflows_yearly.last().unwrap() > 0.0);
    }

    #[test]
    fn test_zero_interest_rate() {
        let mut params = scenario();
        params.annual_interest_rate_percent = 0.0;

        let result = simulate(&params).unwrap();

        assert_eq!(result.total_interest, 0.0);
        for row in &result.monthly_cf {
            assert!(row.emi.is_finite());
            assert_eq!(row.interest, 0.0);
        }
    }

    #[test]
    fn test_unfinanced_purchase_is_rejected() {
        let mut params = scenario();
        params.loan_percentage = 0.0;

        match simulate(&params) {
            Err(SimulationError::InvalidScheduleInput(_)) => {}
            other => panic!("expected InvalidScheduleInput, got {:?}", other),
        }
    }

    #[test]
    fn test_unlabelled_core() {
        let engine = SimulationEngine::new(SimulationConfig {
            annotate_labels: false,
            ..Default::default()
        });
        let result = engine.simulate(&scenario()).unwrap();

        assert!(result.monthly_cf.iter().all(|r| r.components.is_empty()));
        assert!(!result.monthly_cf[0].events.is_empty());
    }

    #[test]
    fn test_degenerate_input_is_an_error() {
        let mut params = scenario();
        params.holding_period_years = 0;
        assert!(simulate(&params).is_err());
    }

    fn fixed_amounts() -> DerivedAmounts {
        DerivedAmounts {
            booking_amount: 400_000.0,
            possession_amount: 250_000.0,
            builder_upfront: 0.0,
            loan_principal: 4_250_000.0,
            charge_kind: ChargeKind::TransferFees,
            charge_amount: 100_000.0,
            handover_period_years: 4,
        }
    }

    #[test]
    fn test_reconcile_moves_exit_past_empty_final_year() {
        let state = LoopState {
            yearly: vec![-1_200.0, 0.0],
            balance: 500_000.0,
            charge_in_yearly: true,
            ..LoopState::initial()
        };

        let yearly = reconcile_yearly(state, &scenario(), &fixed_amounts());

        // The empty year is dropped and the proceeds land in the one before it
        assert_eq!(yearly.len(), 1);
        assert_abs_diff_eq!(yearly[0], -1_200.0 + 8_000_000.0 - 500_000.0 - 400_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reconcile_flushes_open_year_and_charge() {
        let state = LoopState {
            yearly: vec![-1_200.0],
            yearly_emi: 300.0,
            yearly_builder: 50.0,
            balance: 500_000.0,
            ..LoopState::initial()
        };

        let yearly = reconcile_yearly(state, &scenario(), &fixed_amounts());

        assert_eq!(yearly.len(), 2);
        assert_abs_diff_eq!(yearly[0], -1_200.0 - 400_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(yearly[1], -350.0 + 7_500_000.0 - 100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_oversized_terms_are_rejected() {
        for (tenure, holding) in [(178_956_971, 4), (200_000_000, 4), (u32::MAX, u32::MAX)] {
            let mut params = scenario();
            params.tenure_years = tenure;
            params.holding_period_years = holding;
            assert!(matches!(simulate(&params), Err(SimulationError::DegenerateSimulation(_))));
        }
    }

    #[test]
    fn test_emi_with_huge_term_stays_finite() {
        // Amortizes like a perpetuity: interest only
        assert_abs_diff_eq!(emi(100_000.0, 0.01, u32::MAX), 1_000.0, epsilon = 1e-6);
    }
}
