//! Relational sink: the column → SQL type mapping table, DDL generation,
//! and CSV staging for the bulk-copy protocol.

pub mod postgres;

use crate::error::Result;
use crate::types::RegionSummaryRow;

/// SQL types the pipeline emits. The mapping from output columns to SQL
/// types is pinned here rather than inferred from runtime values, so the
/// relational schema cannot drift between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Float,
    Boolean,
    Timestamp,
    Text,
}

impl SqlType {
    pub fn ddl(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Float => "FLOAT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Text => "TEXT",
        }
    }
}

/// A named, typed output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub sql_type: SqlType,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self { name, sql_type }
    }
}

/// Columns of the relational region-summary table, in load order.
pub const SUMMARY_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("region", SqlType::Text),
    ColumnSpec::new("total_loan_amount", SqlType::Float),
    ColumnSpec::new("total_outstanding_amount", SqlType::Float),
    ColumnSpec::new("total_emi_amount", SqlType::Float),
    ColumnSpec::new("avg_payment_delay", SqlType::Float),
    ColumnSpec::new("customer_count", SqlType::Integer),
];

pub fn create_table_ddl(table: &str, columns: &[ColumnSpec]) -> String {
    let column_list = columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.sql_type.ddl()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {table} ({column_list})")
}

/// Stage summary rows as header-less CSV for `COPY ... WITH (FORMAT CSV)`.
/// A null region becomes an empty unquoted field, which COPY reads as NULL.
pub fn stage_csv(rows: &[RegionSummaryRow]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(&[
            row.region.clone().unwrap_or_default(),
            row.total_loan_amount.to_string(),
            row.total_outstanding_amount.to_string(),
            row.total_emi_amount.to_string(),
            row.avg_payment_delay.to_string(),
            row.customer_count.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::error::EtlError::BulkLoad(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_uses_the_pinned_type_mapping() {
        let ddl = create_table_ddl("region_summary", SUMMARY_COLUMNS);
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS region_summary (region TEXT, \
             total_loan_amount FLOAT, total_outstanding_amount FLOAT, \
             total_emi_amount FLOAT, avg_payment_delay FLOAT, customer_count INTEGER)"
        );
    }

    #[test]
    fn every_sql_type_has_ddl() {
        assert_eq!(SqlType::Integer.ddl(), "INTEGER");
        assert_eq!(SqlType::Float.ddl(), "FLOAT");
        assert_eq!(SqlType::Boolean.ddl(), "BOOLEAN");
        assert_eq!(SqlType::Timestamp.ddl(), "TIMESTAMP");
        assert_eq!(SqlType::Text.ddl(), "TEXT");
    }

    #[test]
    fn staged_csv_has_no_header_and_null_region_is_empty() {
        let rows = vec![
            RegionSummaryRow {
                region: Some("North".to_string()),
                total_loan_amount: 300.0,
                total_outstanding_amount: 130.0,
                total_emi_amount: 30.0,
                avg_payment_delay: 3.0,
                customer_count: 2,
            },
            RegionSummaryRow {
                region: None,
                total_loan_amount: 40.0,
                total_outstanding_amount: 20.0,
                total_emi_amount: 4.0,
                avg_payment_delay: 6.0,
                customer_count: 1,
            },
        ];
        let staged = String::from_utf8(stage_csv(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = staged.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "North,300,130,30,3,2");
        assert_eq!(lines[1], ",40,20,4,6,1");
    }
}
