//! SpendSage - conversational expense analytics agent
//!
//! A bounded tool-calling agent that answers questions about a fixed set of
//! personal expense records by invoking deterministic analytics operations
//! (filter, statistic, aggregate) and folding their results back into its
//! conversation memory until it produces a final answer or exhausts its
//! step budget.

pub mod agent;
pub mod config;
pub mod error;
pub mod expense;
pub mod logging;
pub mod memory;
pub mod providers;
pub mod tools;

pub use agent::{ContextBuilder, ExpenseAgent, MAX_STEPS_MESSAGE};
pub use config::Config;
pub use error::{ProviderError, Result, SpendError};
pub use expense::{Expense, ExpenseFilter, ExpenseStore};
pub use memory::{ConversationMemory, Message, Role, ToolCall};
pub use providers::{
    ClaudeProvider, FinishReason, GeminiProvider, GenerateOptions, LlmProvider, LlmResponse,
    LlmToolCall, ToolDefinition, Usage,
};
