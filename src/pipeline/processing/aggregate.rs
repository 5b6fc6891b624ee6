use crate::types::{CustomerDimRow, LoanPaymentFactRow, RegionSummaryRow};
use std::collections::{BTreeMap, HashMap};

/// Result of joining facts to customers and rolling up by region.
#[derive(Debug)]
pub struct RegionRollup {
    pub rows: Vec<RegionSummaryRow>,
    /// Fact rows whose customer id had no dimension match; they aggregate
    /// under the `None` region bucket.
    pub unmatched_facts: usize,
}

#[derive(Default)]
struct Accumulator {
    loan_sum: f64,
    outstanding_sum: f64,
    emi_sum: f64,
    delay_sum: i64,
    count: i64,
}

/// Left-join facts to customers on customer id, then aggregate per region:
/// summed amounts, mean payment delay, and a row count. Region order in the
/// output is deterministic (null bucket first, then lexicographic).
pub fn summarize_by_region(
    facts: &[LoanPaymentFactRow],
    customers: &[CustomerDimRow],
) -> RegionRollup {
    // First occurrence wins if a customer id somehow appears twice across
    // dimension fragments.
    let mut regions_by_customer: HashMap<&str, &str> = HashMap::new();
    for customer in customers {
        regions_by_customer
            .entry(customer.customer_id.as_str())
            .or_insert(customer.region.as_str());
    }

    let mut unmatched_facts = 0;
    let mut buckets: BTreeMap<Option<String>, Accumulator> = BTreeMap::new();
    for fact in facts {
        let region = regions_by_customer
            .get(fact.customer_id.as_str())
            .map(|r| r.to_string());
        if region.is_none() {
            unmatched_facts += 1;
        }

        let bucket = buckets.entry(region).or_default();
        bucket.loan_sum += fact.loan_amount;
        bucket.outstanding_sum += fact.outstanding_amount;
        bucket.emi_sum += fact.emi_amount;
        bucket.delay_sum += fact.payment_delay_days;
        bucket.count += 1;
    }

    let rows = buckets
        .into_iter()
        .map(|(region, acc)| RegionSummaryRow {
            region,
            total_loan_amount: acc.loan_sum,
            total_outstanding_amount: acc.outstanding_sum,
            total_emi_amount: acc.emi_sum,
            avg_payment_delay: acc.delay_sum as f64 / acc.count as f64,
            customer_count: acc.count,
        })
        .collect();

    RegionRollup {
        rows,
        unmatched_facts,
    }
}
