use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One loan-payment observation from the bronze layer, after numeric
/// coercion. Date fields stay as strings; the pipeline never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLoanRecord {
    pub customer_id: String,
    pub name: String,
    pub region: String,
    pub contact_number: String,
    pub email: String,
    pub customer_score: i64,
    pub risk_level: String,
    pub account_number: String,
    pub account_type: String,
    pub loan_type: String,
    pub loan_amount: f64,
    pub outstanding_amount: f64,
    pub emi_amount: f64,
    pub due_date: String,
    pub payment_status: String,
    pub last_payment_date: String,
    pub payment_delay_days: i64,
}

/// Customer dimension row, unique on `customer_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDimRow {
    pub customer_id: String,
    pub name: String,
    pub region: String,
    pub contact_number: String,
    pub email: String,
    pub customer_score: i64,
    pub risk_level: String,
}

/// Account dimension row, unique on `account_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDimRow {
    pub account_number: String,
    pub account_type: String,
    pub loan_type: String,
}

/// Loan-payment fact row. `customer_id` and `account_number` reference the
/// dimensions but are not enforced at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPaymentFactRow {
    pub customer_id: String,
    pub account_number: String,
    pub loan_amount: f64,
    pub outstanding_amount: f64,
    pub emi_amount: f64,
    pub due_date: String,
    pub payment_status: String,
    pub last_payment_date: String,
    pub payment_delay_days: i64,
    pub payment_on_time_flag: String,
    pub payment_behavior: String,
}

/// Payment-behavior label derived from the payment delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentBehavior {
    Good,
    Average,
    Delayed,
}

impl PaymentBehavior {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentBehavior::Good => "Good",
            PaymentBehavior::Average => "Average",
            PaymentBehavior::Delayed => "Delayed",
        }
    }
}

/// One row of the gold region summary. `region` is `None` for fact rows
/// whose customer was missing from the dimension at join time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummaryRow {
    pub region: Option<String>,
    pub total_loan_amount: f64,
    pub total_outstanding_amount: f64,
    pub total_emi_amount: f64,
    pub avg_payment_delay: f64,
    pub customer_count: i64,
}

/// Opaque payload passed through from whatever triggered the run. Neither
/// component inspects it today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerEvent {
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Per-invocation context, mainly for log correlation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub invoked_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            invoked_at: Utc::now(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Result reported back to the invoker by both components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
}

impl RunStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "Success".to_string(),
            message: message.into(),
            record_count: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.record_count = Some(count);
        self
    }
}
