//! Tool registry for SpendSage
//!
//! A static, name-addressable mapping from tool names to their executable
//! entry points and declared input shapes. The registry produces the
//! declarations handed to the reasoning provider and dispatches requested
//! calls back to the bound tools.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use tracing::{error, info};

use crate::error::{Result, SpendError};
use crate::providers::ToolDefinition;

use super::Tool;

/// A registry that holds and manages tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        info!(tool = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Execute a tool by name.
    ///
    /// Unknown names return [`SpendError::UnknownTool`]; the agent loop
    /// converts that (like any tool failure) into a structured error result
    /// for the conversation instead of raising to the `run` caller.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| SpendError::UnknownTool(name.to_string()))?;

        let start = Instant::now();
        match tool.execute(args).await {
            Ok(result) => {
                info!(
                    tool = name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool executed successfully"
                );
                Ok(result)
            }
            Err(e) => {
                error!(
                    tool = name,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool execution failed"
                );
                Err(e)
            }
        }
    }

    /// Render a tool result for conversation memory using the owning tool's
    /// summarizer. Falls back to the full payload for unregistered names.
    pub fn summarize(&self, name: &str, result: &Value) -> String {
        match self.tools.get(name) {
            Some(tool) => tool.summarize_for_memory(result),
            None => result.to_string(),
        }
    }

    /// All tool declarations for the reasoning provider.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect()
    }

    /// The names of all registered tools.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Whether a tool exists in the registry.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// The number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct DoublerTool;

    #[async_trait]
    impl Tool for DoublerTool {
        fn name(&self) -> &str {
            "doubler"
        }
        fn description(&self) -> &str {
            "Doubles a number"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "n": { "type": "number" } },
                "required": ["n"]
            })
        }
        async fn execute(&self, args: Value) -> Result<Value> {
            let n = args["n"]
                .as_f64()
                .ok_or_else(|| SpendError::InvalidToolInput("n must be a number".into()))?;
            Ok(json!({"result": n * 2.0}))
        }
        fn summarize_for_memory(&self, _result: &Value) -> String {
            "doubled".to_string()
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(DoublerTool));

        assert!(registry.has("doubler"));
        let result = registry.execute("doubler", json!({"n": 21})).await.unwrap();
        assert_eq!(result, json!({"result": 42.0}));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_typed_error() {
        let registry = ToolRegistry::new();
        let err = registry.execute("nonexistent", json!({})).await.unwrap_err();
        assert!(matches!(err, SpendError::UnknownTool(_)));
        assert_eq!(err.to_string(), "Unknown tool: nonexistent");
    }

    #[tokio::test]
    async fn test_invalid_input_is_typed_error() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(DoublerTool));
        let err = registry
            .execute("doubler", json!({"n": "not a number"}))
            .await
            .unwrap_err();
        assert!(matches!(err, SpendError::InvalidToolInput(_)));
    }

    #[test]
    fn test_definitions() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(DoublerTool));

        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "doubler");
        assert_eq!(definitions[0].description, "Doubles a number");
        assert!(definitions[0].parameters.is_object());
    }

    #[test]
    fn test_summarize_uses_tool_override() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(DoublerTool));

        assert_eq!(registry.summarize("doubler", &json!({"result": 2})), "doubled");
        // Unregistered names fall back to the raw payload.
        assert_eq!(
            registry.summarize("mystery", &json!({"a": 1})),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(DoublerTool));
        registry.register(Box::new(DoublerTool));
        assert_eq!(registry.len(), 1);
    }
}
