//! Conjunctive expense filtering with optional anomaly exclusion
//!
//! `ExpenseFilter` is the predicate set shared by every analytics tool: all
//! fields are optional, an absent field places no constraint on that
//! dimension, and a record must satisfy every supplied predicate.

use serde::{Deserialize, Serialize};

use super::{anomaly::detect_anomalies, Expense, ExpenseStore};

/// Multiplier applied to the population standard deviation when the filter
/// excludes anomalies. Engine policy; `detect_anomalies` itself takes the
/// multiplier as a parameter.
pub const ANOMALY_THRESHOLD_MULTIPLIER: f64 = 2.0;

/// The optional predicate set applied before any statistic or aggregation.
///
/// Field names are camelCase on the wire so tool inputs deserialize
/// directly. Empty-string `category`/`vendor` values are treated as absent.
///
/// # Example
/// ```
/// use spendsage::expense::ExpenseFilter;
///
/// let spec: ExpenseFilter = serde_json::from_str(
///     r#"{"startDate": "2025-09-01", "endDate": "2025-09-30", "category": "Groceries"}"#,
/// )
/// .unwrap();
/// assert_eq!(spec.category.as_deref(), Some("Groceries"));
/// assert!(spec.min_amount.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilter {
    /// Inclusive start of the date range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<chrono::NaiveDate>,
    /// Inclusive end of the date range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<chrono::NaiveDate>,
    /// Case-insensitive exact category match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Inclusive lower amount bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    /// Inclusive upper amount bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    /// Case-insensitive vendor substring match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Drop statistical outliers from the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_anomalies: Option<bool>,
}

impl ExpenseFilter {
    /// Whether a single record satisfies every supplied predicate except
    /// anomaly exclusion (which is a property of the surviving set, not of
    /// one record).
    fn matches(&self, expense: &Expense) -> bool {
        if let Some(start) = self.start_date {
            if expense.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if expense.date > end {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            match expense.category.as_deref() {
                Some(c) if c.to_lowercase() == category.to_lowercase() => {}
                _ => return false,
            }
        }
        if let Some(min) = self.min_amount {
            if expense.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if expense.amount > max {
                return false;
            }
        }
        if let Some(vendor) = self.vendor.as_deref().filter(|s| !s.is_empty()) {
            if !expense
                .vendor
                .to_lowercase()
                .contains(&vendor.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Apply a filter to the store, returning matching records in store order.
///
/// Predicates are conjunctive; absent predicates are vacuously true. When
/// `excludeAnomalies` is set and at least two records survive the other
/// predicates, the anomaly detector runs over the surviving set (multiplier
/// [`ANOMALY_THRESHOLD_MULTIPLIER`]) and flagged records are removed. The
/// result is always a fresh sequence.
pub fn filter(store: &ExpenseStore, spec: &ExpenseFilter) -> Vec<Expense> {
    let filtered: Vec<Expense> = store
        .iter()
        .filter(|e| spec.matches(e))
        .cloned()
        .collect();

    if spec.exclude_anomalies != Some(true) || filtered.len() < 2 {
        return filtered;
    }

    let flagged = detect_anomalies(&filtered, ANOMALY_THRESHOLD_MULTIPLIER);
    filtered
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !flagged.contains(i))
        .map(|(_, e)| e)
        .collect()
}
