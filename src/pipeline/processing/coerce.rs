use crate::error::{EtlError, Result};
use crate::types::RawLoanRecord;
use csv::ReaderBuilder;
use serde::Deserialize;

/// Bronze row exactly as it appears in the CSV header, everything a string
/// until coercion.
#[derive(Debug, Deserialize)]
struct BronzeRow {
    #[serde(rename = "Customer_ID")]
    customer_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Contact_Number")]
    contact_number: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Customer_Score")]
    customer_score: String,
    #[serde(rename = "Risk_Level")]
    risk_level: String,
    #[serde(rename = "Account_Number")]
    account_number: String,
    #[serde(rename = "Account_Type")]
    account_type: String,
    #[serde(rename = "Loan_Type")]
    loan_type: String,
    #[serde(rename = "Loan_Amount")]
    loan_amount: String,
    #[serde(rename = "Outstanding_Amount")]
    outstanding_amount: String,
    #[serde(rename = "EMI_Amount")]
    emi_amount: String,
    #[serde(rename = "Due_Date")]
    due_date: String,
    #[serde(rename = "Payment_Status")]
    payment_status: String,
    #[serde(rename = "Last_Payment_Date")]
    last_payment_date: String,
    #[serde(rename = "Payment_Delay_Days")]
    payment_delay_days: String,
}

fn parse_f64(column: &str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| EtlError::TypeCoercion {
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(column: &str, value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| EtlError::TypeCoercion {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Parse one bronze CSV object and coerce the numeric columns. Any
/// non-numeric value fails the whole parse, so a run aborts before a single
/// silver row has been written.
pub fn parse_bronze_csv(bytes: &[u8]) -> Result<Vec<RawLoanRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let mut records = Vec::new();
    for row in reader.deserialize::<BronzeRow>() {
        let row = row?;
        records.push(RawLoanRecord {
            customer_score: parse_i64("Customer_Score", &row.customer_score)?,
            loan_amount: parse_f64("Loan_Amount", &row.loan_amount)?,
            outstanding_amount: parse_f64("Outstanding_Amount", &row.outstanding_amount)?,
            emi_amount: parse_f64("EMI_Amount", &row.emi_amount)?,
            payment_delay_days: parse_i64("Payment_Delay_Days", &row.payment_delay_days)?,
            customer_id: row.customer_id,
            name: row.name,
            region: row.region,
            contact_number: row.contact_number,
            email: row.email,
            risk_level: row.risk_level,
            account_number: row.account_number,
            account_type: row.account_type,
            loan_type: row.loan_type,
            due_date: row.due_date,
            payment_status: row.payment_status,
            last_payment_date: row.last_payment_date,
        });
    }
    Ok(records)
}
