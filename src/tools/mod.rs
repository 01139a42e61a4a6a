//! Tools module - analytics operations exposed to the reasoning provider
//!
//! This module provides the infrastructure for declaring and executing the
//! deterministic analytics tools the agent can call during a conversation.
//!
//! # Overview
//!
//! - `Tool` trait: the interface all tools implement, including the
//!   per-tool `summarize_for_memory` hook that bounds conversation growth
//! - `ToolRegistry`: name-addressable registry, declarations, dispatch
//! - `analytics`: the three expense tools (`filter_expenses`,
//!   `calculate_statistics`, `aggregate_expenses`)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use spendsage::expense::ExpenseStore;
//! use spendsage::tools::{analytics, ToolRegistry};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(ExpenseStore::new(vec![]));
//! let mut registry = ToolRegistry::new();
//! for tool in analytics::expense_tools(store) {
//!     registry.register(tool);
//! }
//!
//! assert!(registry.has("filter_expenses"));
//! let result = registry
//!     .execute("calculate_statistics", json!({"metric": "count"}))
//!     .await
//!     .unwrap();
//! assert_eq!(result["count"], 0);
//! # });
//! ```

pub mod analytics;
mod registry;

pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Trait that all tools must implement.
///
/// Tools are deterministic analytics operations the reasoning provider can
/// request. Execution is synchronous computation behind an async signature;
/// nothing here suspends besides the trait machinery.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool name, unique within a registry.
    fn name(&self) -> &str;

    /// Human-readable description sent to the reasoning provider.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input shape.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    ///
    /// Inputs that fail shape validation return
    /// [`SpendError::InvalidToolInput`](crate::error::SpendError) before any
    /// execution happens; semantic failures during execution return
    /// [`SpendError::Tool`](crate::error::SpendError). The agent loop folds
    /// both into structured error results rather than propagating them.
    async fn execute(&self, args: Value) -> Result<Value>;

    /// Render a result for conversation memory.
    ///
    /// The default keeps the full payload. Tools whose results can be large
    /// (`filter_expenses`) override this to truncate, so the agent loop
    /// never special-cases a tool by name.
    fn summarize_for_memory(&self, result: &Value) -> String {
        result.to_string()
    }
}
