//! The expense analytics tools
//!
//! Three tools over one shared filter vocabulary: `filter_expenses` lists
//! matching transactions, `calculate_statistics` computes one metric, and
//! `aggregate_expenses` groups and computes one metric per group. Each tool
//! binds an `Arc<ExpenseStore>` at construction and performs read-only,
//! synchronous computation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::{Result, SpendError};
use crate::expense::{
    aggregate, filter, statistics, AggregateInput, ExpenseFilter, ExpenseStore, StatisticsInput,
};

use super::Tool;

/// Maximum number of example expenses kept when a `filter_expenses` result
/// is summarized into conversation memory.
pub const FILTER_RESULT_LIMIT: usize = 25;

/// Build the full analytics tool set bound to one store.
pub fn expense_tools(store: Arc<ExpenseStore>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(FilterExpensesTool::new(Arc::clone(&store))),
        Box::new(CalculateStatisticsTool::new(Arc::clone(&store))),
        Box::new(AggregateExpensesTool::new(store)),
    ]
}

/// The shared optional filter fields declared by every analytics tool.
fn filter_properties() -> Map<String, Value> {
    let props = json!({
        "startDate": {
            "type": "string",
            "description": "Inclusive start date in YYYY-MM-DD format."
        },
        "endDate": {
            "type": "string",
            "description": "Inclusive end date in YYYY-MM-DD format."
        },
        "category": {
            "type": "string",
            "description": "Expense category, e.g. Groceries, Dining, Entertainment."
        },
        "minAmount": {
            "type": "number",
            "description": "Minimum transaction amount in USD."
        },
        "maxAmount": {
            "type": "number",
            "description": "Maximum transaction amount in USD."
        },
        "vendor": {
            "type": "string",
            "description": "Case-insensitive vendor match by partial name."
        },
        "excludeAnomalies": {
            "type": "boolean",
            "description": "Set true when the user asks to exclude outliers/anomalies."
        }
    });
    match props {
        Value::Object(map) => map,
        _ => unreachable!("filter properties literal is an object"),
    }
}

// ============================================================================
// filter_expenses
// ============================================================================

/// Returns the raw list of matching transactions.
pub struct FilterExpensesTool {
    store: Arc<ExpenseStore>,
}

impl FilterExpensesTool {
    pub fn new(store: Arc<ExpenseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for FilterExpensesTool {
    fn name(&self) -> &str {
        "filter_expenses"
    }

    fn description(&self) -> &str {
        "Return the matching transactions. Use this for listing expenses or \
         getting transaction-level details."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": filter_properties(),
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let spec: ExpenseFilter = serde_json::from_value(args)
            .map_err(|e| SpendError::InvalidToolInput(e.to_string()))?;
        let expenses = filter(&self.store, &spec);
        Ok(json!({
            "metadata": {
                "totalMatching": expenses.len(),
                "filter": spec
            },
            "expenses": expenses
        }))
    }

    /// Cap the expense list so a broad filter cannot flood conversation
    /// memory. The true total and the applied filter survive truncation.
    fn summarize_for_memory(&self, result: &Value) -> String {
        let expenses = match result.get("expenses").and_then(Value::as_array) {
            Some(list) if list.len() > FILTER_RESULT_LIMIT => list,
            _ => return result.to_string(),
        };

        json!({
            "metadata": {
                "totalMatching": result["metadata"]["totalMatching"],
                "filter": result["metadata"]["filter"],
                "truncated": true,
                "showing": FILTER_RESULT_LIMIT
            },
            "expenses": &expenses[..FILTER_RESULT_LIMIT]
        })
        .to_string()
    }
}

// ============================================================================
// calculate_statistics
// ============================================================================

/// Computes a single metric over a filtered set of expenses.
pub struct CalculateStatisticsTool {
    store: Arc<ExpenseStore>,
}

impl CalculateStatisticsTool {
    pub fn new(store: Arc<ExpenseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CalculateStatisticsTool {
    fn name(&self) -> &str {
        "calculate_statistics"
    }

    fn description(&self) -> &str {
        "Calculate a single metric (sum, mean, median, min, max, count) over \
         filtered expenses."
    }

    fn parameters(&self) -> Value {
        let mut properties = filter_properties();
        properties.insert(
            "metric".to_string(),
            json!({
                "type": "string",
                "enum": ["sum", "mean", "median", "min", "max", "count"],
                "description": "Metric to compute for filtered transactions."
            }),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": ["metric"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let input: StatisticsInput = serde_json::from_value(args)
            .map_err(|e| SpendError::InvalidToolInput(e.to_string()))?;
        let result = statistics(&self.store, &input);
        Ok(serde_json::to_value(result)?)
    }
}

// ============================================================================
// aggregate_expenses
// ============================================================================

/// Groups filtered expenses and computes one metric per group.
pub struct AggregateExpensesTool {
    store: Arc<ExpenseStore>,
}

impl AggregateExpensesTool {
    pub fn new(store: Arc<ExpenseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AggregateExpensesTool {
    fn name(&self) -> &str {
        "aggregate_expenses"
    }

    fn description(&self) -> &str {
        "Group filtered expenses and compute one metric per group, useful for \
         category/month/vendor breakdowns."
    }

    fn parameters(&self) -> Value {
        let mut properties = filter_properties();
        properties.insert(
            "groupBy".to_string(),
            json!({
                "type": "string",
                "enum": ["category", "vendor", "month"],
                "description": "Dimension used for grouping results."
            }),
        );
        properties.insert(
            "metric".to_string(),
            json!({
                "type": "string",
                "enum": ["sum", "count", "mean", "median"],
                "description": "Metric to compute per group."
            }),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": ["groupBy", "metric"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let input: AggregateInput = serde_json::from_value(args)
            .map_err(|e| SpendError::InvalidToolInput(e.to_string()))?;
        let result = aggregate(&self.store, &input);
        Ok(serde_json::to_value(result)?)
    }
}
