//! Integration tests for the analytics engine through the public tool API
//!
//! Exercises the three registered tools over a realistic fixture store,
//! checking filter semantics, statistic correctness, aggregation ordering,
//! and the invariants that hold across the tool boundary.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};

use spendsage::expense::{detect_anomalies, filter, ExpenseFilter};
use spendsage::tools::{analytics, ToolRegistry};
use spendsage::{Expense, ExpenseStore, SpendError};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Two months of activity across several vendors, one uncategorized record,
/// and one spike suitable for anomaly exclusion.
fn fixture_store() -> ExpenseStore {
    ExpenseStore::new(vec![
        Expense::new(date("2025-09-02"), Some("Groceries"), "Whole Foods", 82.13),
        Expense::new(date("2025-09-05"), Some("Groceries"), "Trader Joe's", 54.20),
        Expense::new(date("2025-09-09"), Some("Dining"), "Chipotle", 14.50),
        Expense::new(date("2025-09-14"), Some("Groceries"), "Whole Foods", 91.02),
        Expense::new(date("2025-09-21"), None, "Amazon", 64.99),
        Expense::new(date("2025-09-27"), Some("Groceries"), "Whole Foods", 88.00),
        Expense::new(date("2025-10-03"), Some("Dining"), "Chipotle", 12.75),
        Expense::new(date("2025-10-08"), Some("Groceries"), "Trader Joe's", 61.40),
        Expense::new(date("2025-10-12"), Some("Electronics"), "Best Buy", 1499.99),
        Expense::new(date("2025-10-19"), Some("Dining"), "Olive Garden", 58.30),
        Expense::new(date("2025-10-22"), Some("Coffee"), "Starbucks", 6.40),
        Expense::new(date("2025-10-26"), Some("Groceries"), "Whole Foods", 79.95),
    ])
}

fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in analytics::expense_tools(Arc::new(fixture_store())) {
        registry.register(tool);
    }
    registry
}

// ============================================================================
// Filter invariants
// ============================================================================

#[test]
fn filter_result_is_subset_satisfying_all_predicates() {
    let store = fixture_store();
    let spec: ExpenseFilter = serde_json::from_value(json!({
        "startDate": "2025-09-01",
        "endDate": "2025-09-30",
        "category": "groceries",
        "minAmount": 60
    }))
    .unwrap();

    let result = filter(&store, &spec);
    assert_eq!(result.len(), 3);
    for e in &result {
        assert!(store.as_slice().contains(e));
        assert!(e.date >= date("2025-09-01") && e.date <= date("2025-09-30"));
        assert_eq!(e.category.as_deref(), Some("Groceries"));
        assert!(e.amount >= 60.0);
    }
}

#[test]
fn filter_is_deterministic_and_order_preserving() {
    let store = fixture_store();
    let spec: ExpenseFilter = serde_json::from_value(json!({"vendor": "o"})).unwrap();

    let first = filter(&store, &spec);
    let second = filter(&store, &spec);
    assert_eq!(first, second);

    // Store order, not value order.
    let dates: Vec<_> = first.iter().map(|e| e.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[test]
fn anomaly_exclusion_composes_with_other_predicates() {
    let store = fixture_store();
    // October only: [12.75, 61.40, 1499.99, 58.30, 6.40, 79.95] — the TV is
    // the outlier within that window.
    let with_spike: ExpenseFilter = serde_json::from_value(json!({
        "startDate": "2025-10-01",
        "endDate": "2025-10-31"
    }))
    .unwrap();
    let without_spike: ExpenseFilter = serde_json::from_value(json!({
        "startDate": "2025-10-01",
        "endDate": "2025-10-31",
        "excludeAnomalies": true
    }))
    .unwrap();

    assert_eq!(filter(&store, &with_spike).len(), 6);
    let reduced = filter(&store, &without_spike);
    assert_eq!(reduced.len(), 5);
    assert!(reduced.iter().all(|e| e.vendor != "Best Buy"));
}

#[test]
fn detector_multiplier_is_strict_at_the_boundary() {
    let expenses = vec![
        Expense::new(date("2025-09-01"), None, "a", 10.0),
        Expense::new(date("2025-09-02"), None, "b", 30.0),
    ];
    // mean 20, population stddev exactly 10: deviations sit on the boundary.
    assert!(detect_anomalies(&expenses, 1.0).is_empty());
    assert_eq!(detect_anomalies(&expenses, 0.99).len(), 2);
}

// ============================================================================
// Statistics through the tool boundary
// ============================================================================

#[tokio::test]
async fn count_matches_filter_cardinality() {
    let registry = registry();

    let stats = registry
        .execute("calculate_statistics", json!({"metric": "count", "vendor": "whole foods"}))
        .await
        .unwrap();
    let filtered = registry
        .execute("filter_expenses", json!({"vendor": "whole foods"}))
        .await
        .unwrap();

    assert_eq!(stats["value"], 4.0);
    assert_eq!(stats["count"], 4);
    assert_eq!(filtered["metadata"]["totalMatching"], 4);
}

#[tokio::test]
async fn mean_on_empty_set_is_zero_zero() {
    let registry = registry();
    let result = registry
        .execute(
            "calculate_statistics",
            json!({"metric": "mean", "category": "Travel"}),
        )
        .await
        .unwrap();
    assert_eq!(result["value"], 0.0);
    assert_eq!(result["count"], 0);
}

#[tokio::test]
async fn median_averages_central_pair_on_even_counts() {
    let registry = registry();
    let result = registry
        .execute(
            "calculate_statistics",
            json!({"metric": "median", "category": "Dining"}),
        )
        .await
        .unwrap();
    // Dining amounts sorted: [12.75, 14.50, 58.30] -> odd count, 14.50
    assert_eq!(result["value"], 14.5);

    let groceries = registry
        .execute(
            "calculate_statistics",
            json!({"metric": "median", "category": "Groceries"}),
        )
        .await
        .unwrap();
    // [54.20, 61.40, 79.95, 82.13, 88.00, 91.02] -> (79.95 + 82.13) / 2
    assert_eq!(groceries["value"], 81.04);
}

// ============================================================================
// Aggregation through the tool boundary
// ============================================================================

#[tokio::test]
async fn aggregate_entries_sorted_descending_and_counts_reconcile() {
    let registry = registry();
    let result = registry
        .execute(
            "aggregate_expenses",
            json!({"groupBy": "category", "metric": "sum"}),
        )
        .await
        .unwrap();

    let entries = result["entries"].as_array().unwrap();
    let values: Vec<f64> = entries.iter().map(|e| e["value"].as_f64().unwrap()).collect();
    for pair in values.windows(2) {
        assert!(pair[0] >= pair[1], "entries not descending: {:?}", values);
    }

    let member_total: u64 = entries.iter().map(|e| e["count"].as_u64().unwrap()).sum();
    assert_eq!(member_total, result["count"].as_u64().unwrap());
    assert_eq!(result["count"], 12);

    // The uncategorized Amazon purchase groups under the default key.
    assert!(entries.iter().any(|e| e["key"] == "Uncategorized"));
}

#[tokio::test]
async fn aggregate_by_month_uses_year_month_keys() {
    let registry = registry();
    let result = registry
        .execute(
            "aggregate_expenses",
            json!({"groupBy": "month", "metric": "count"}),
        )
        .await
        .unwrap();

    let entries = result["entries"].as_array().unwrap();
    let mut keys: Vec<&str> = entries.iter().map(|e| e["key"].as_str().unwrap()).collect();
    keys.sort();
    assert_eq!(keys, vec!["2025-09", "2025-10"]);
}

#[tokio::test]
async fn aggregate_by_vendor_keeps_vendor_names_verbatim() {
    let registry = registry();
    let result = registry
        .execute(
            "aggregate_expenses",
            json!({"groupBy": "vendor", "metric": "sum", "category": "Dining"}),
        )
        .await
        .unwrap();

    let entries = result["entries"].as_array().unwrap();
    assert_eq!(entries[0]["key"], "Olive Garden");
    assert_eq!(entries[0]["value"], 58.3);
    assert_eq!(entries[1]["key"], "Chipotle");
    assert_eq!(entries[1]["value"], 27.25);
}

// ============================================================================
// Validation at the tool boundary
// ============================================================================

#[tokio::test]
async fn aggregate_requires_group_by() {
    let registry = registry();
    let err = registry
        .execute("aggregate_expenses", json!({"metric": "sum"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SpendError::InvalidToolInput(_)));
}

#[tokio::test]
async fn statistics_rejects_aggregate_only_shapes() {
    let registry = registry();
    let err = registry
        .execute("calculate_statistics", json!({"metric": "variance"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SpendError::InvalidToolInput(_)));
}

#[tokio::test]
async fn malformed_dates_are_rejected_before_execution() {
    let registry = registry();
    let err = registry
        .execute("filter_expenses", json!({"startDate": "September 1st"}))
        .await
        .unwrap_err();
    assert!(matches!(err, SpendError::InvalidToolInput(_)));
}
