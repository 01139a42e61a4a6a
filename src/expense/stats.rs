//! Single-metric statistics over a filtered expense set
//!
//! Shared amount math (`sum`, `mean`, `median`, …) lives here and is reused
//! by grouped aggregation. Values are rounded to two decimals at the result
//! boundary only — intermediate computation keeps full precision.

use serde::{Deserialize, Serialize};

use super::{filter, ExpenseFilter, ExpenseStore};

/// Round to two decimal places for financial display.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic total of the amounts.
pub(crate) fn sum(amounts: &[f64]) -> f64 {
    amounts.iter().sum()
}

/// Arithmetic mean; 0 for an empty slice.
pub(crate) fn mean(amounts: &[f64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    sum(amounts) / amounts.len() as f64
}

/// Middle value of the sorted amounts, averaging the two central values when
/// the count is even; 0 for an empty slice.
pub(crate) fn median(amounts: &[f64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    let mut sorted = amounts.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub(crate) fn min(amounts: &[f64]) -> f64 {
    amounts.iter().copied().fold(f64::INFINITY, f64::min)
}

pub(crate) fn max(amounts: &[f64]) -> f64 {
    amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// The metric computed by `calculate_statistics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Count,
}

/// Input for the statistics operation: a filter plus one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsInput {
    pub metric: Metric,
    #[serde(flatten)]
    pub filter: ExpenseFilter,
}

/// Result of the statistics operation.
///
/// `value` is the computed metric (two-decimal rounded for non-count
/// metrics); `count` is the size of the filtered set; `filter` echoes the
/// applied predicate set back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResult {
    pub metric: Metric,
    pub value: f64,
    pub count: usize,
    pub filter: ExpenseFilter,
}

/// Compute one metric over the filtered store.
///
/// `count` reports the filtered size even when it is zero. Every other
/// metric on an empty filtered set yields `value = 0, count = 0`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use spendsage::expense::{statistics, Expense, ExpenseFilter, ExpenseStore, Metric,
///     StatisticsInput};
///
/// let d = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
/// let store = ExpenseStore::new(vec![
///     Expense::new(d, None, "a", 10.0),
///     Expense::new(d, None, "b", 30.0),
/// ]);
/// let result = statistics(
///     &store,
///     &StatisticsInput { metric: Metric::Mean, filter: ExpenseFilter::default() },
/// );
/// assert_eq!(result.value, 20.0);
/// assert_eq!(result.count, 2);
/// ```
pub fn statistics(store: &ExpenseStore, input: &StatisticsInput) -> StatisticsResult {
    let filtered = filter(store, &input.filter);

    if input.metric == Metric::Count {
        return StatisticsResult {
            metric: input.metric,
            value: filtered.len() as f64,
            count: filtered.len(),
            filter: input.filter.clone(),
        };
    }

    let amounts: Vec<f64> = filtered.iter().map(|e| e.amount).collect();
    if amounts.is_empty() {
        return StatisticsResult {
            metric: input.metric,
            value: 0.0,
            count: 0,
            filter: input.filter.clone(),
        };
    }

    let value = match input.metric {
        Metric::Sum => sum(&amounts),
        Metric::Mean => mean(&amounts),
        Metric::Median => median(&amounts),
        Metric::Min => min(&amounts),
        Metric::Max => max(&amounts),
        Metric::Count => unreachable!("count handled above"),
    };

    StatisticsResult {
        metric: input.metric,
        value: round2(value),
        count: amounts.len(),
        filter: input.filter.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::test_fixtures::sample_store;

    fn input(json: &str) -> StatisticsInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(13.625), 13.63);
        assert_eq!(round2(10.004), 10.0);
        assert_eq!(round2(-1.125), -1.13);
        assert_eq!(round2(42.0), 42.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[7.5]), 7.5);
    }

    #[test]
    fn test_count_equals_filtered_size_even_when_zero() {
        let store = sample_store();
        let result = statistics(&store, &input(r#"{"metric": "count"}"#));
        assert_eq!(result.value, 6.0);
        assert_eq!(result.count, 6);

        let none = statistics(
            &store,
            &input(r#"{"metric": "count", "category": "Travel"}"#),
        );
        assert_eq!(none.value, 0.0);
        assert_eq!(none.count, 0);
    }

    #[test]
    fn test_empty_filtered_set_yields_zero() {
        let store = sample_store();
        for metric in ["sum", "mean", "median", "min", "max"] {
            let result = statistics(
                &store,
                &input(&format!(
                    r#"{{"metric": "{}", "category": "Travel"}}"#,
                    metric
                )),
            );
            assert_eq!(result.value, 0.0, "metric {}", metric);
            assert_eq!(result.count, 0);
        }
    }

    #[test]
    fn test_sum_is_rounded_to_two_decimals() {
        let store = sample_store();
        let result = statistics(
            &store,
            &input(r#"{"metric": "sum", "category": "Groceries"}"#),
        );
        // 82.13 + 54.20 + 97.40
        assert_eq!(result.value, 233.73);
        assert_eq!(result.count, 3);
    }

    #[test]
    fn test_mean_over_filtered_set() {
        let store = sample_store();
        let result = statistics(&store, &input(r#"{"metric": "mean", "vendor": "chipotle"}"#));
        // (14.50 + 12.75) / 2 = 13.625 -> 13.63
        assert_eq!(result.value, 13.63);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_min_max_extrema() {
        let store = sample_store();
        let min = statistics(&store, &input(r#"{"metric": "min"}"#));
        let max = statistics(&store, &input(r#"{"metric": "max"}"#));
        assert_eq!(min.value, 12.75);
        assert_eq!(max.value, 120.0);
    }

    #[test]
    fn test_result_echoes_the_filter() {
        let store = sample_store();
        let result = statistics(
            &store,
            &input(r#"{"metric": "sum", "category": "Dining"}"#),
        );
        assert_eq!(result.filter.category.as_deref(), Some("Dining"));
    }

    #[test]
    fn test_unknown_metric_fails_shape_validation() {
        let parsed: std::result::Result<StatisticsInput, _> =
            serde_json::from_str(r#"{"metric": "variance"}"#);
        assert!(parsed.is_err());
    }
}
