//! Arrow schemas and Parquet encode/decode for the silver and gold tables.
//!
//! Silver columns keep the bronze header casing; readers resolve columns
//! case-insensitively, which gives the aggregator its lower-cased view.

use crate::error::{EtlError, Result};
use crate::sink::{ColumnSpec, SqlType};
use crate::types::{AccountDimRow, CustomerDimRow, LoanPaymentFactRow, RegionSummaryRow};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::sync::Arc;

pub const DIM_CUSTOMER: &str = "dim_customer";
pub const DIM_ACCOUNT: &str = "dim_account";
pub const FACT_LOAN_PAYMENT: &str = "fact_loan_payment";
pub const REGION_SUMMARY: &str = "region_summary";

/// Catalog column listing for `dim_customer`.
pub const CUSTOMER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Customer_ID", SqlType::Text),
    ColumnSpec::new("Name", SqlType::Text),
    ColumnSpec::new("Region", SqlType::Text),
    ColumnSpec::new("Contact_Number", SqlType::Text),
    ColumnSpec::new("Email", SqlType::Text),
    ColumnSpec::new("Customer_Score", SqlType::Integer),
    ColumnSpec::new("Risk_Level", SqlType::Text),
];

/// Catalog column listing for `dim_account`.
pub const ACCOUNT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Account_Number", SqlType::Text),
    ColumnSpec::new("Account_Type", SqlType::Text),
    ColumnSpec::new("Loan_Type", SqlType::Text),
];

/// Catalog column listing for `fact_loan_payment`.
pub const FACT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Customer_ID", SqlType::Text),
    ColumnSpec::new("Account_Number", SqlType::Text),
    ColumnSpec::new("Loan_Amount", SqlType::Float),
    ColumnSpec::new("Outstanding_Amount", SqlType::Float),
    ColumnSpec::new("EMI_Amount", SqlType::Float),
    ColumnSpec::new("Due_Date", SqlType::Text),
    ColumnSpec::new("Payment_Status", SqlType::Text),
    ColumnSpec::new("Last_Payment_Date", SqlType::Text),
    ColumnSpec::new("Payment_Delay_Days", SqlType::Integer),
    ColumnSpec::new("Payment_On_Time_Flag", SqlType::Text),
    ColumnSpec::new("Payment_Behavior", SqlType::Text),
];

fn utf8(values: Vec<String>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

fn int64(values: Vec<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(values))
}

fn float64(values: Vec<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

pub fn customers_to_batch(rows: &[CustomerDimRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Customer_ID", DataType::Utf8, false),
        Field::new("Name", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Contact_Number", DataType::Utf8, false),
        Field::new("Email", DataType::Utf8, false),
        Field::new("Customer_Score", DataType::Int64, false),
        Field::new("Risk_Level", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            utf8(rows.iter().map(|r| r.customer_id.clone()).collect()),
            utf8(rows.iter().map(|r| r.name.clone()).collect()),
            utf8(rows.iter().map(|r| r.region.clone()).collect()),
            utf8(rows.iter().map(|r| r.contact_number.clone()).collect()),
            utf8(rows.iter().map(|r| r.email.clone()).collect()),
            int64(rows.iter().map(|r| r.customer_score).collect()),
            utf8(rows.iter().map(|r| r.risk_level.clone()).collect()),
        ],
    )?;
    Ok(batch)
}

pub fn accounts_to_batch(rows: &[AccountDimRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Account_Number", DataType::Utf8, false),
        Field::new("Account_Type", DataType::Utf8, false),
        Field::new("Loan_Type", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            utf8(rows.iter().map(|r| r.account_number.clone()).collect()),
            utf8(rows.iter().map(|r| r.account_type.clone()).collect()),
            utf8(rows.iter().map(|r| r.loan_type.clone()).collect()),
        ],
    )?;
    Ok(batch)
}

pub fn facts_to_batch(rows: &[LoanPaymentFactRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Customer_ID", DataType::Utf8, false),
        Field::new("Account_Number", DataType::Utf8, false),
        Field::new("Loan_Amount", DataType::Float64, false),
        Field::new("Outstanding_Amount", DataType::Float64, false),
        Field::new("EMI_Amount", DataType::Float64, false),
        Field::new("Due_Date", DataType::Utf8, false),
        Field::new("Payment_Status", DataType::Utf8, false),
        Field::new("Last_Payment_Date", DataType::Utf8, false),
        Field::new("Payment_Delay_Days", DataType::Int64, false),
        Field::new("Payment_On_Time_Flag", DataType::Utf8, false),
        Field::new("Payment_Behavior", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            utf8(rows.iter().map(|r| r.customer_id.clone()).collect()),
            utf8(rows.iter().map(|r| r.account_number.clone()).collect()),
            float64(rows.iter().map(|r| r.loan_amount).collect()),
            float64(rows.iter().map(|r| r.outstanding_amount).collect()),
            float64(rows.iter().map(|r| r.emi_amount).collect()),
            utf8(rows.iter().map(|r| r.due_date.clone()).collect()),
            utf8(rows.iter().map(|r| r.payment_status.clone()).collect()),
            utf8(rows.iter().map(|r| r.last_payment_date.clone()).collect()),
            int64(rows.iter().map(|r| r.payment_delay_days).collect()),
            utf8(rows.iter().map(|r| r.payment_on_time_flag.clone()).collect()),
            utf8(rows.iter().map(|r| r.payment_behavior.clone()).collect()),
        ],
    )?;
    Ok(batch)
}

pub fn summary_to_batch(rows: &[RegionSummaryRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, true),
        Field::new("total_loan_amount", DataType::Float64, false),
        Field::new("total_outstanding_amount", DataType::Float64, false),
        Field::new("total_emi_amount", DataType::Float64, false),
        Field::new("avg_payment_delay", DataType::Float64, false),
        Field::new("customer_count", DataType::Int64, false),
    ]));
    let regions: Vec<Option<String>> = rows.iter().map(|r| r.region.clone()).collect();
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(regions)) as ArrayRef,
            float64(rows.iter().map(|r| r.total_loan_amount).collect()),
            float64(rows.iter().map(|r| r.total_outstanding_amount).collect()),
            float64(rows.iter().map(|r| r.total_emi_amount).collect()),
            float64(rows.iter().map(|r| r.avg_payment_delay).collect()),
            int64(rows.iter().map(|r| r.customer_count).collect()),
        ],
    )?;
    Ok(batch)
}

/// Serialize one batch as a standalone Parquet object.
pub fn write_parquet(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(buffer)
}

/// Decode one Parquet object into its record batches.
pub fn read_parquet(bytes: Vec<u8>) -> Result<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))?.build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

fn column_index(batch: &RecordBatch, name: &str) -> Result<usize> {
    batch
        .schema()
        .fields()
        .iter()
        .position(|f| f.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| EtlError::Arrow(ArrowError::SchemaError(format!("missing column '{name}'"))))
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let index = column_index(batch, name)?;
    batch.column(index).as_any().downcast_ref::<StringArray>().ok_or_else(|| {
        EtlError::Arrow(ArrowError::SchemaError(format!("column '{name}' is not utf8")))
    })
}

fn i64_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int64Array> {
    let index = column_index(batch, name)?;
    batch.column(index).as_any().downcast_ref::<Int64Array>().ok_or_else(|| {
        EtlError::Arrow(ArrowError::SchemaError(format!("column '{name}' is not int64")))
    })
}

fn f64_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    let index = column_index(batch, name)?;
    batch.column(index).as_any().downcast_ref::<Float64Array>().ok_or_else(|| {
        EtlError::Arrow(ArrowError::SchemaError(format!("column '{name}' is not float64")))
    })
}

/// Decode customer dimension rows from a set of Parquet fragments.
pub fn customers_from_parquet(fragments: &[Vec<u8>]) -> Result<Vec<CustomerDimRow>> {
    let mut rows = Vec::new();
    for fragment in fragments {
        for batch in read_parquet(fragment.clone())? {
            let customer_id = string_col(&batch, "customer_id")?;
            let name = string_col(&batch, "name")?;
            let region = string_col(&batch, "region")?;
            let contact_number = string_col(&batch, "contact_number")?;
            let email = string_col(&batch, "email")?;
            let customer_score = i64_col(&batch, "customer_score")?;
            let risk_level = string_col(&batch, "risk_level")?;
            for i in 0..batch.num_rows() {
                rows.push(CustomerDimRow {
                    customer_id: customer_id.value(i).to_string(),
                    name: name.value(i).to_string(),
                    region: region.value(i).to_string(),
                    contact_number: contact_number.value(i).to_string(),
                    email: email.value(i).to_string(),
                    customer_score: customer_score.value(i),
                    risk_level: risk_level.value(i).to_string(),
                });
            }
        }
    }
    Ok(rows)
}

/// Decode fact rows from a set of Parquet fragments.
pub fn facts_from_parquet(fragments: &[Vec<u8>]) -> Result<Vec<LoanPaymentFactRow>> {
    let mut rows = Vec::new();
    for fragment in fragments {
        for batch in read_parquet(fragment.clone())? {
            let customer_id = string_col(&batch, "customer_id")?;
            let account_number = string_col(&batch, "account_number")?;
            let loan_amount = f64_col(&batch, "loan_amount")?;
            let outstanding_amount = f64_col(&batch, "outstanding_amount")?;
            let emi_amount = f64_col(&batch, "emi_amount")?;
            let due_date = string_col(&batch, "due_date")?;
            let payment_status = string_col(&batch, "payment_status")?;
            let last_payment_date = string_col(&batch, "last_payment_date")?;
            let payment_delay_days = i64_col(&batch, "payment_delay_days")?;
            let payment_on_time_flag = string_col(&batch, "payment_on_time_flag")?;
            let payment_behavior = string_col(&batch, "payment_behavior")?;
            for i in 0..batch.num_rows() {
                rows.push(LoanPaymentFactRow {
                    customer_id: customer_id.value(i).to_string(),
                    account_number: account_number.value(i).to_string(),
                    loan_amount: loan_amount.value(i),
                    outstanding_amount: outstanding_amount.value(i),
                    emi_amount: emi_amount.value(i),
                    due_date: due_date.value(i).to_string(),
                    payment_status: payment_status.value(i).to_string(),
                    last_payment_date: last_payment_date.value(i).to_string(),
                    payment_delay_days: payment_delay_days.value(i),
                    payment_on_time_flag: payment_on_time_flag.value(i).to_string(),
                    payment_behavior: payment_behavior.value(i).to_string(),
                });
            }
        }
    }
    Ok(rows)
}

/// Decode gold summary rows, mainly for verification and local tooling.
pub fn summary_from_parquet(fragments: &[Vec<u8>]) -> Result<Vec<RegionSummaryRow>> {
    let mut rows = Vec::new();
    for fragment in fragments {
        for batch in read_parquet(fragment.clone())? {
            let region = string_col(&batch, "region")?;
            let total_loan = f64_col(&batch, "total_loan_amount")?;
            let total_outstanding = f64_col(&batch, "total_outstanding_amount")?;
            let total_emi = f64_col(&batch, "total_emi_amount")?;
            let avg_delay = f64_col(&batch, "avg_payment_delay")?;
            let customer_count = i64_col(&batch, "customer_count")?;
            for i in 0..batch.num_rows() {
                rows.push(RegionSummaryRow {
                    region: if region.is_null(i) {
                        None
                    } else {
                        Some(region.value(i).to_string())
                    },
                    total_loan_amount: total_loan.value(i),
                    total_outstanding_amount: total_outstanding.value(i),
                    total_emi_amount: total_emi.value(i),
                    avg_payment_delay: avg_delay.value(i),
                    customer_count: customer_count.value(i),
                });
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silver_columns_resolve_case_insensitively_on_read() {
        // The writer emits bronze-cased column names; the reader asks for
        // lower-cased ones, mirroring the aggregator's view.
        let rows = vec![CustomerDimRow {
            customer_id: "C1".to_string(),
            name: "Asha Rao".to_string(),
            region: "South".to_string(),
            contact_number: "555-0101".to_string(),
            email: "asha@example.com".to_string(),
            customer_score: 712,
            risk_level: "Low".to_string(),
        }];
        let bytes = write_parquet(&customers_to_batch(&rows).unwrap()).unwrap();

        let decoded = customers_from_parquet(&[bytes]).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].customer_id, "C1");
        assert_eq!(decoded[0].customer_score, 712);
    }

    #[test]
    fn null_region_survives_the_gold_artifact() {
        let rows = vec![
            RegionSummaryRow {
                region: None,
                total_loan_amount: 40.0,
                total_outstanding_amount: 20.0,
                total_emi_amount: 4.0,
                avg_payment_delay: 6.0,
                customer_count: 1,
            },
            RegionSummaryRow {
                region: Some("North".to_string()),
                total_loan_amount: 300.0,
                total_outstanding_amount: 130.0,
                total_emi_amount: 30.0,
                avg_payment_delay: 3.0,
                customer_count: 2,
            },
        ];
        let bytes = write_parquet(&summary_to_batch(&rows).unwrap()).unwrap();

        let decoded = summary_from_parquet(&[bytes]).unwrap();
        assert_eq!(decoded, rows);
    }
}
