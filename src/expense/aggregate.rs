//! Grouped aggregation over a filtered expense set
//!
//! Partitions filtered records by category, vendor, or month and computes
//! one metric per group. Entries sort descending by the two-decimal rounded
//! value; the sort is stable, so groups with equal rounded values keep their
//! discovery order. Rounding before sorting is deliberate and must be
//! preserved: near-tied groups can order differently than they would on full
//! precision.

use serde::{Deserialize, Serialize};

use super::stats::{mean, median, round2, sum};
use super::{filter, ExpenseFilter, ExpenseStore};

/// The dimension used to partition filtered records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Category,
    Vendor,
    Month,
}

/// The per-group metric for aggregation (`min`/`max` are statistics-only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMetric {
    Sum,
    Count,
    Mean,
    Median,
}

/// Input for the aggregation operation: a filter, a grouping dimension, and
/// a per-group metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateInput {
    pub group_by: GroupBy,
    pub metric: GroupMetric,
    #[serde(flatten)]
    pub filter: ExpenseFilter,
}

/// One aggregated group: its key, rounded metric value, and member count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub key: String,
    pub value: f64,
    pub count: usize,
}

/// Result of the aggregation operation. `count` is the total number of
/// filtered records across all groups, not the number of groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub group_by: GroupBy,
    pub metric: GroupMetric,
    pub count: usize,
    pub filter: ExpenseFilter,
    pub entries: Vec<AggregateEntry>,
}

/// Group the filtered store and compute one metric per group.
///
/// Group keys: `category` (records without a category fall under
/// "Uncategorized"), `vendor` (verbatim), or `month` (`YYYY-MM`). Entries
/// are sorted descending by rounded value.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use spendsage::expense::{aggregate, AggregateInput, Expense, ExpenseStore};
///
/// let store = ExpenseStore::new(vec![
///     Expense::new(NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(), None, "a", 50.0),
///     Expense::new(NaiveDate::from_ymd_opt(2025, 9, 20).unwrap(), None, "b", 30.0),
/// ]);
/// let input: AggregateInput =
///     serde_json::from_str(r#"{"groupBy": "month", "metric": "sum"}"#).unwrap();
/// let result = aggregate(&store, &input);
/// assert_eq!(result.entries.len(), 1);
/// assert_eq!(result.entries[0].key, "2025-09");
/// assert_eq!(result.entries[0].value, 80.0);
/// assert_eq!(result.entries[0].count, 2);
/// ```
pub fn aggregate(store: &ExpenseStore, input: &AggregateInput) -> AggregateResult {
    let filtered = filter(store, &input.filter);
    let total = filtered.len();

    // Insertion-ordered grouping: discovery order is what the stable sort
    // falls back to for equal rounded values.
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for expense in &filtered {
        let key = match input.group_by {
            GroupBy::Category => expense
                .category
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_string()),
            GroupBy::Vendor => expense.vendor.clone(),
            GroupBy::Month => expense.month(),
        };
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, amounts)) => amounts.push(expense.amount),
            None => groups.push((key, vec![expense.amount])),
        }
    }

    let mut entries: Vec<AggregateEntry> = groups
        .into_iter()
        .map(|(key, amounts)| {
            let value = match input.metric {
                GroupMetric::Sum => sum(&amounts),
                GroupMetric::Count => amounts.len() as f64,
                GroupMetric::Mean => mean(&amounts),
                GroupMetric::Median => median(&amounts),
            };
            AggregateEntry {
                key,
                value: round2(value),
                count: amounts.len(),
            }
        })
        .collect();

    // Stable descending sort on the already-rounded value.
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));

    AggregateResult {
        group_by: input.group_by,
        metric: input.metric,
        count: total,
        filter: input.filter.clone(),
        entries,
    }
}
