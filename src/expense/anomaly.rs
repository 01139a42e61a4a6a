//! Statistical outlier detection over expense amounts
//!
//! An expense is anomalous when its amount deviates from the input set's
//! mean by more than a caller-supplied multiple of the population standard
//! deviation. The multiplier is a free parameter here; the engine's policy
//! value lives with the filter (see [`crate::expense::filter`]).

use std::collections::HashSet;

use super::Expense;

/// Flag statistical outliers by amount.
///
/// Returns the indices (into `expenses`) of records whose amount satisfies
/// `|amount - mean| > threshold_multiplier * stddev`, where `stddev` is the
/// population standard deviation of all input amounts. The comparison is
/// strict: an amount sitting exactly on the threshold is not flagged.
///
/// Degenerate cases yield an empty set: fewer than two records, or zero
/// standard deviation (all amounts equal).
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use spendsage::expense::{detect_anomalies, Expense};
///
/// let d = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
/// let expenses: Vec<Expense> = [10.0, 10.0, 10.0, 10.0, 10.0, 100.0]
///     .iter()
///     .map(|&a| Expense::new(d, None, "x", a))
///     .collect();
///
/// let flagged = detect_anomalies(&expenses, 2.0);
/// assert_eq!(flagged.len(), 1);
/// assert!(flagged.contains(&5));
/// ```
pub fn detect_anomalies(expenses: &[Expense], threshold_multiplier: f64) -> HashSet<usize> {
    if expenses.len() < 2 {
        return HashSet::new();
    }

    let n = expenses.len() as f64;
    let mean = expenses.iter().map(|e| e.amount).sum::<f64>() / n;
    let variance = expenses
        .iter()
        .map(|e| {
            let d = e.amount - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return HashSet::new();
    }

    let threshold = threshold_multiplier * stddev;
    expenses
        .iter()
        .enumerate()
        .filter(|(_, e)| (e.amount - mean).abs() > threshold)
        .map(|(i, _)| i)
        .collect()
}
