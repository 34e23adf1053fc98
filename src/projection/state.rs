//! Loop state threaded through the monthly simulation

use chrono::NaiveDate;

use crate::calendar;

/// State carried from one simulated month to the next.
///
/// Each month consumes the previous state and returns a new one, so the loop
/// is a plain fold with no hidden mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopState {
    /// Months elapsed since booking
    pub month_index: u32,

    /// Outstanding loan at the start of the month
    pub balance: f64,

    /// Loan principal released so far
    pub disbursed: f64,

    /// Index of the next disbursement quarter
    pub next_quarter: usize,

    /// EMIs paid in the current calendar year
    pub yearly_emi: f64,

    /// Builder-directed payments in the current calendar year
    pub yearly_builder: f64,

    /// Closed calendar-year net cash flows
    pub yearly: Vec<f64>,

    /// Possession payment and statutory charge already booked in a month
    pub handover_settled: bool,

    /// Statutory charge already folded into a yearly entry
    pub charge_in_yearly: bool,
}

impl LoopState {
    pub fn initial() -> Self {
        Self {
            month_index: 0,
            balance: 0.0,
            disbursed: 0.0,
            next_quarter: 0,
            yearly_emi: 0.0,
            yearly_builder: 0.0,
            yearly: Vec::new(),
            handover_settled: false,
            charge_in_yearly: false,
        }
    }

    /// Release a quarter's tranche into the balance
    pub fn disburse(self, amount: f64) -> Self {
        Self {
            balance: self.balance + amount,
            disbursed: self.disbursed + amount,
            next_quarter: self.next_quarter + 1,
            ..self
        }
    }

    /// Roll into the next month after a row was recorded.
    ///
    /// December closes the calendar year; the statutory charge is folded into
    /// the handover year's entry the first time that year closes.
    pub fn advance(
        mut self,
        date: NaiveDate,
        emi: f64,
        builder_amount: f64,
        closing_balance: f64,
        handover_date: NaiveDate,
        charge_amount: f64,
    ) -> Self {
        self.balance = closing_balance;
        self.yearly_emi += emi;
        self.yearly_builder += builder_amount;

        if calendar::is_december(date) {
            self.yearly.push(-(self.yearly_emi + self.yearly_builder));
            self.yearly_emi = 0.0;
            self.yearly_builder = 0.0;

            if !self.charge_in_yearly && calendar::year(date) == calendar::year(handover_date) {
                if let Some(last) = self.yearly.last_mut() {
                    *last -= charge_amount;
                }
                self.charge_in_yearly = true;
            }
        }

        self.month_index += 1;
        self
    }

    /// True when EMIs or builder payments were accumulated after the last December
    pub fn has_open_year(&self) -> bool {
        self.yearly_emi > 0.0 || self.yearly_builder > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 15).unwrap()
    }

    #[test]
    fn test_disburse_advances_cursor() {
        let state = LoopState::initial().disburse(1_000.0).disburse(500.0);
        assert_eq!(state.balance, 1_500.0);
        assert_eq!(state.disbursed, 1_500.0);
        assert_eq!(state.next_quarter, 2);
    }

    #[test]
    fn test_december_closes_year() {
        let handover = date(2027, 6);
        let state = LoopState::initial()
            .advance(date(2026, 11), 100.0, 50.0, 10.0, handover, 7.0)
            .advance(date(2026, 12), 100.0, 0.0, 9.0, handover, 7.0);

        assert_eq!(state.yearly, vec![-250.0]);
        assert_eq!(state.balance, 9.0);
        assert_eq!(state.month_index, 2);
        assert!(!state.has_open_year());
        assert!(!state.charge_in_yearly);
    }

    #[test]
    fn test_charge_folded_once_in_handover_year() {
        let handover = date(2026, 6);
        let state = LoopState::initial()
            .advance(date(2026, 12), 100.0, 0.0, 0.0, handover, 7.0)
            .advance(date(2027, 1), 100.0, 0.0, 0.0, handover, 7.0);

        assert_eq!(state.yearly, vec![-107.0]);
        assert!(state.charge_in_yearly);
        assert!(state.has_open_year());
    }
}
