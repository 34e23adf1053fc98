//! Currency formatting and cash-event labels
//!
//! Labels are attached after the numeric simulation finishes; nothing in the
//! simulation reads them back.

use crate::projection::{CashEvent, CashEventKind, ChargeKind, MonthlyRow};

const RUPEE: char = '₹';

/// Format whole rupees with Indian digit grouping, e.g. `₹1,23,45,678`
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let split = digits.len().saturating_sub(3);
    let (head, last_three) = digits.split_at(split);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2 + 4);
    if amount < 0 {
        grouped.push('-');
    }
    grouped.push(RUPEE);

    // Above the thousands, digits are grouped in pairs
    let lead = head.len() % 2;
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (i + 2 - lead) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !head.is_empty() {
        grouped.push(',');
    }
    grouped.push_str(last_three);
    grouped
}

/// Label for one event, e.g. `possession amount (-₹2,50,000)`
pub fn describe(event: &CashEvent, charge_kind: ChargeKind) -> String {
    let name = match event.kind {
        CashEventKind::DownPayment => "down payment",
        CashEventKind::BuilderUpfront => "builder's remaining amount",
        CashEventKind::Possession => "possession amount",
        CashEventKind::StatutoryCharge => charge_kind.label(),
        CashEventKind::SalePrice => "selling price",
        CashEventKind::LoanRepayment => "loan repayment at sale",
        CashEventKind::UndisbursedLoan => "remaining loan disbursed amount",
    };
    let sign = if event.amount < 0.0 { '-' } else { '+' };
    format!("{} ({}{})", name, sign, format_inr(event.amount.abs().trunc() as i64))
}

/// Fill each row's `components` from its events
pub fn annotate(rows: &mut [MonthlyRow], charge_kind: ChargeKind) {
    for row in rows.iter_mut() {
        row.components = row.events.iter().map(|e| describe(e, charge_kind)).collect();
    }
}
