//! Internal Rate of Return (IRR) calculation
//!
//! Used to annualize the investor's monthly net cash flows

/// Initial rate guess for the Newton-Raphson solve
pub const DEFAULT_IRR_GUESS: f64 = 0.05;

const TOLERANCE: f64 = 1e-8;
const MAX_ITERATIONS: u32 = 100;

/// Outcome of an IRR solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IrrOutcome {
    Converged(f64),
    /// No sign change, flat derivative or no convergence within the iteration budget
    NoSolution,
}

impl IrrOutcome {
    pub fn rate(&self) -> Option<f64> {
        match self {
            IrrOutcome::Converged(rate) => Some(*rate),
            IrrOutcome::NoSolution => None,
        }
    }
}

/// Calculate the annual IRR of monthly cash flows using the Newton-Raphson method.
///
/// Flow `i` is discounted by `(1 + rate)^(i/12)`: monthly-indexed flows under an
/// annual compounding rate.
///
/// # Arguments
/// * `cashflows` - Monthly cash flows (positive = inflow, negative = outflow)
/// * `initial_guess` - Starting annual rate, usually [`DEFAULT_IRR_GUESS`]
///
/// # Returns
/// * `IrrOutcome::Converged(rate)` with the annual rate as a decimal, or
///   `IrrOutcome::NoSolution`
pub fn irr_monthly(cashflows: &[f64], initial_guess: f64) -> IrrOutcome {
    // At least one sign change is required for a root to exist
    let has_positive = cashflows.iter().any(|&cf| cf > 0.0);
    let has_negative = cashflows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return IrrOutcome::NoSolution;
    }

    let mut rate = initial_guess;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < TOLERANCE {
            // Too flat to take a safe step
            return IrrOutcome::NoSolution;
        }

        let new_rate = rate - npv / dnpv;

        if (new_rate - rate).abs() < TOLERANCE {
            return IrrOutcome::Converged(new_rate);
        }

        rate = new_rate;
    }

    IrrOutcome::NoSolution
}

/// Present value of monthly cash flows at an annual rate
pub fn npv_monthly(cashflows: &[f64], rate: f64) -> f64 {
    npv_and_derivative(cashflows, rate).0
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let base = 1.0 + rate;
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let years = t as f64 / 12.0;
        npv += cf / base.powf(years);
        if t > 0 {
            dnpv -= years * cf / base.powf(years + 1.0);
        }
    }

    (npv, dnpv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // Invest 1000, get 1100 back twelve months later
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1100.0);

        let irr = irr_monthly(&cashflows, DEFAULT_IRR_GUESS).rate().unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_loan_like_series_residual() {
        let mut cashflows = vec![-100.0];
        cashflows.extend(vec![10.0; 11]);
        cashflows.push(110.0);

        let rate = irr_monthly(&cashflows, DEFAULT_IRR_GUESS).rate().expect("should converge");
        assert!(npv_monthly(&cashflows, rate).abs() < 1e-6);
        // Roughly 10% per month compounded over a year
        assert!(rate > 1.0);
    }

    #[test]
    fn test_single_sign_has_no_solution() {
        assert_eq!(irr_monthly(&[100.0, 50.0, 10.0], DEFAULT_IRR_GUESS), IrrOutcome::NoSolution);
        assert_eq!(irr_monthly(&[-100.0, -50.0, 0.0], DEFAULT_IRR_GUESS), IrrOutcome::NoSolution);
        assert_eq!(irr_monthly(&[], DEFAULT_IRR_GUESS), IrrOutcome::NoSolution);
    }

    #[test]
    fn test_flat_derivative_has_no_solution() {
        // Only the undiscounted first flow carries weight
        assert_eq!(irr_monthly(&[100.0, -1e-12], DEFAULT_IRR_GUESS), IrrOutcome::NoSolution);
    }
}
