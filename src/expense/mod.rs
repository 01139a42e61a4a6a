//! Expense records and the in-memory expense store
//!
//! This module defines the core data model for the analytics engine:
//! `Expense` (one dated transaction) and `ExpenseStore` (an immutable,
//! ordered collection of records for one agent session). The store is
//! supplied by the caller and never mutated; every engine operation reads
//! from it and returns fresh data.
//!
//! # Overview
//!
//! - `filter`: conjunctive predicate filtering with optional anomaly exclusion
//! - `anomaly`: standard-deviation outlier detection
//! - `stats`: single-metric statistics over a filtered set
//! - `aggregate`: grouped aggregation (category / vendor / month)

pub mod aggregate;
pub mod anomaly;
pub mod filter;
pub mod stats;

pub use aggregate::{aggregate, AggregateEntry, AggregateInput, AggregateResult, GroupBy, GroupMetric};
pub use anomaly::detect_anomalies;
pub use filter::{filter, ExpenseFilter};
pub use stats::{statistics, Metric, StatisticsInput, StatisticsResult};

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};

/// One expense transaction record.
///
/// Records are immutable once the store is constructed. Amounts are
/// non-negative USD values; `category` is optional and treated as
/// "Uncategorized" where a label is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Transaction date (ISO `YYYY-MM-DD` in serialized form)
    pub date: NaiveDate,
    /// Optional category label (e.g. "Groceries", "Dining")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Payee name, non-empty
    pub vendor: String,
    /// Transaction amount in USD, non-negative
    pub amount: f64,
}

impl Expense {
    /// Create a new expense record.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use spendsage::expense::Expense;
    ///
    /// let e = Expense::new(
    ///     NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
    ///     Some("Groceries"),
    ///     "Whole Foods",
    ///     82.13,
    /// );
    /// assert_eq!(e.vendor, "Whole Foods");
    /// ```
    pub fn new(date: NaiveDate, category: Option<&str>, vendor: &str, amount: f64) -> Self {
        Self {
            date,
            category: category.map(str::to_string),
            vendor: vendor.to_string(),
            amount,
        }
    }

    /// The `YYYY-MM` month key for this expense.
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// An immutable, ordered collection of expense records for one session.
///
/// The store is read-only for the lifetime of an agent instance; filtering
/// and aggregation return new sequences, never the backing storage.
#[derive(Debug, Clone, Default)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    /// Create a store from an already-validated sequence of records.
    ///
    /// Loading and validating raw source data is the caller's
    /// responsibility; see [`ExpenseStore::from_json_str`] for a validating
    /// ingestion helper.
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    /// Parse and validate a JSON array of expense records.
    ///
    /// Rejects records with negative or non-finite amounts and empty vendor
    /// names, reporting the offending record index.
    ///
    /// # Example
    /// ```
    /// use spendsage::expense::ExpenseStore;
    ///
    /// let store = ExpenseStore::from_json_str(
    ///     r#"[{"date": "2025-09-05", "vendor": "Netflix", "amount": 15.49}]"#,
    /// )
    /// .unwrap();
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let expenses: Vec<Expense> = serde_json::from_str(json)?;
        for (i, e) in expenses.iter().enumerate() {
            if !e.amount.is_finite() || e.amount < 0.0 {
                return Err(SpendError::InvalidExpense(format!(
                    "record {}: amount must be a non-negative number, got {}",
                    i, e.amount
                )));
            }
            if e.vendor.trim().is_empty() {
                return Err(SpendError::InvalidExpense(format!(
                    "record {}: vendor must be non-empty",
                    i
                )));
            }
        }
        Ok(Self::new(expenses))
    }

    /// Read and validate expense records from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The records in store iteration order.
    pub fn as_slice(&self) -> &[Expense] {
        &self.expenses
    }

    /// Iterate over records in store order.
    pub fn iter(&self) -> std::slice::Iter<'_, Expense> {
        self.expenses.iter()
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}
