use crate::pipeline::processing::behavior;
use crate::types::{AccountDimRow, CustomerDimRow, LoanPaymentFactRow, RawLoanRecord};
use std::collections::HashSet;

/// Drop rows with a non-positive loan amount. Returns the retained rows and
/// the dropped-row count for logging.
pub fn filter_positive_loans(rows: Vec<RawLoanRecord>) -> (Vec<RawLoanRecord>, usize) {
    let before = rows.len();
    let retained: Vec<RawLoanRecord> = rows.into_iter().filter(|r| r.loan_amount > 0.0).collect();
    let dropped = before - retained.len();
    (retained, dropped)
}

/// Customer dimension: one row per customer id, first occurrence wins.
pub fn project_customers(rows: &[RawLoanRecord]) -> Vec<CustomerDimRow> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.customer_id.clone()))
        .map(|r| CustomerDimRow {
            customer_id: r.customer_id.clone(),
            name: r.name.clone(),
            region: r.region.clone(),
            contact_number: r.contact_number.clone(),
            email: r.email.clone(),
            customer_score: r.customer_score,
            risk_level: r.risk_level.clone(),
        })
        .collect()
}

/// Account dimension: one row per account number, first occurrence wins.
pub fn project_accounts(rows: &[RawLoanRecord]) -> Vec<AccountDimRow> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.account_number.clone()))
        .map(|r| AccountDimRow {
            account_number: r.account_number.clone(),
            account_type: r.account_type.clone(),
            loan_type: r.loan_type.clone(),
        })
        .collect()
}

/// Fact table: one row per retained bronze row, with the derived payment
/// flag and behavior label attached.
pub fn project_facts(rows: &[RawLoanRecord]) -> Vec<LoanPaymentFactRow> {
    rows.iter()
        .map(|r| LoanPaymentFactRow {
            customer_id: r.customer_id.clone(),
            account_number: r.account_number.clone(),
            loan_amount: r.loan_amount,
            outstanding_amount: r.outstanding_amount,
            emi_amount: r.emi_amount,
            due_date: r.due_date.clone(),
            payment_status: r.payment_status.clone(),
            last_payment_date: r.last_payment_date.clone(),
            payment_delay_days: r.payment_delay_days,
            payment_on_time_flag: behavior::on_time_flag(r.payment_delay_days).to_string(),
            payment_behavior: behavior::classify(r.payment_delay_days).label().to_string(),
        })
        .collect()
}
