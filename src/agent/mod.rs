//! Agent module - the bounded tool-calling orchestration loop
//!
//! `ExpenseAgent` mediates between conversation memory and tool execution:
//! it sends the conversation plus tool declarations to the reasoning
//! provider, dispatches requested tool calls in issue order, folds their
//! (summarized) results back into memory, and repeats until the provider
//! produces a final answer or the step budget runs out. The step budget is
//! the loop's only defense against runaway execution, so it terminates in a
//! fixed number of provider round-trips regardless of provider behavior.

mod context;

pub use context::ContextBuilder;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::error::Result;
use crate::expense::ExpenseStore;
use crate::memory::{ConversationMemory, Message, ToolCall};
use crate::providers::{FinishReason, GenerateOptions, LlmProvider, LlmToolCall};
use crate::tools::{analytics, ToolRegistry};

/// Fixed response returned when the step budget is exhausted while the
/// provider is still requesting tools. Not an error: a defined terminal
/// state.
pub const MAX_STEPS_MESSAGE: &str =
    "I'm sorry, I reached my maximum processing limit for this request.";

/// Default maximum number of provider round-trips per `run` call.
pub const DEFAULT_MAX_STEPS: usize = 3;

/// Default pause between tool rounds, a courtesy to provider rate limits.
const DEFAULT_STEP_PAUSE_MS: u64 = 500;

/// The bounded agent loop over one expense store.
///
/// One instance owns its conversation memory exclusively; `run` takes
/// `&mut self`, so the loop cannot be re-entered concurrently for the same
/// instance.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use spendsage::agent::ExpenseAgent;
/// use spendsage::expense::ExpenseStore;
/// use spendsage::providers::GeminiProvider;
///
/// let store = Arc::new(ExpenseStore::from_json_file("expenses.json")?);
/// let provider = Arc::new(GeminiProvider::new("api-key"));
/// let mut agent = ExpenseAgent::new(provider, store);
///
/// let answer = agent.run("What did I spend on groceries in September?").await?;
/// println!("{}", answer);
/// ```
pub struct ExpenseAgent {
    /// The reasoning provider
    provider: Arc<dyn LlmProvider>,
    /// Registered analytics tools bound to the store
    tools: ToolRegistry,
    /// Append-only conversation memory, seeded with the system prompt
    memory: ConversationMemory,
    /// Optional model override passed to the provider
    model: Option<String>,
    /// Sampling options for every provider call
    options: GenerateOptions,
    /// Maximum provider round-trips per `run`
    max_steps: usize,
    /// Pause between tool rounds
    step_pause: Duration,
}

impl ExpenseAgent {
    /// Create an agent over the given store with the default context.
    pub fn new(provider: Arc<dyn LlmProvider>, store: Arc<ExpenseStore>) -> Self {
        Self::with_context_builder(provider, store, ContextBuilder::new())
    }

    /// Create an agent with a custom context builder.
    pub fn with_context_builder(
        provider: Arc<dyn LlmProvider>,
        store: Arc<ExpenseStore>,
        context_builder: ContextBuilder,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        for tool in analytics::expense_tools(store) {
            tools.register(tool);
        }
        Self {
            provider,
            tools,
            memory: ConversationMemory::with_system(&context_builder.build_system_prompt()),
            model: None,
            options: GenerateOptions::new().with_max_tokens(2048).with_temperature(0.3),
            max_steps: DEFAULT_MAX_STEPS,
            step_pause: Duration::from_millis(DEFAULT_STEP_PAUSE_MS),
        }
    }

    /// Create an agent taking model, step budget, pause, and sampling
    /// settings from the configuration.
    pub fn from_config(
        provider: Arc<dyn LlmProvider>,
        store: Arc<ExpenseStore>,
        config: &Config,
    ) -> Self {
        let mut agent = Self::new(provider, store);
        agent.model = config.agent.model.clone();
        agent.max_steps = config.agent.max_steps;
        agent.step_pause = Duration::from_millis(config.agent.step_pause_ms);
        agent.options = GenerateOptions::new()
            .with_max_tokens(config.agent.max_tokens)
            .with_temperature(config.agent.temperature);
        agent
    }

    /// Override the provider model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Override the step budget.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Override the pause between tool rounds.
    pub fn with_step_pause(mut self, pause: Duration) -> Self {
        self.step_pause = pause;
        self
    }

    /// Override the sampling options.
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// The conversation memory accumulated so far.
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// The number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Answer one user query.
    ///
    /// Appends the query to memory and runs up to `max_steps` provider
    /// rounds. A round that requests tools has each call dispatched
    /// synchronously in the order issued, with one tool-result message
    /// appended per call; a round that produces text ends the loop. When the
    /// budget runs out while the provider still wants tools, the fixed
    /// [`MAX_STEPS_MESSAGE`] is returned without calling the provider again.
    ///
    /// Tool failures never surface here: they are folded into the
    /// conversation as `{"error": ...}` results so the provider can correct
    /// itself. The only errors returned are provider transport failures.
    pub async fn run(&mut self, query: &str) -> Result<String> {
        let span = info_span!("run", run_id = %uuid::Uuid::new_v4());
        async {
            info!(query_len = query.len(), "Running agent");
            self.memory.push(Message::user(query));

            let definitions = self.tools.definitions();

            for step in 1..=self.max_steps {
                let response = self
                    .provider
                    .generate(
                        self.memory.messages().to_vec(),
                        definitions.clone(),
                        self.model.as_deref(),
                        self.options.clone(),
                    )
                    .await?;

                match response.finish_reason {
                    FinishReason::Stop => {
                        info!(step, "Final answer received");
                        self.memory.push(Message::assistant(&response.content));
                        return Ok(response.content);
                    }
                    FinishReason::ToolCalls => {
                        debug!(
                            step,
                            calls = response.tool_calls.len(),
                            "Tool calls requested"
                        );

                        // Record the provider's own request verbatim.
                        let mut assistant = Message::assistant(&response.content);
                        assistant.tool_calls = Some(
                            response
                                .tool_calls
                                .iter()
                                .map(|tc| ToolCall {
                                    id: tc.id.clone(),
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                })
                                .collect(),
                        );
                        self.memory.push(assistant);

                        // Sequential dispatch, in issue order: result append
                        // order must match request order for correlation.
                        for call in &response.tool_calls {
                            info!(tool = %call.name, id = %call.id, "Executing tool");
                            let summary = self.dispatch(call).await;
                            self.memory
                                .push(Message::tool_result(&call.id, &call.name, &summary));
                        }

                        if step < self.max_steps {
                            tokio::time::sleep(self.step_pause).await;
                        }
                    }
                }
            }

            info!(max_steps = self.max_steps, "Step budget exhausted");
            self.memory.push(Message::assistant(MAX_STEPS_MESSAGE));
            Ok(MAX_STEPS_MESSAGE.to_string())
        }
        .instrument(span)
        .await
    }

    /// Execute one requested call and render its memory summary. Failures of
    /// any kind become a structured error payload for the conversation.
    async fn dispatch(&self, call: &LlmToolCall) -> String {
        let args: Value = match serde_json::from_str(&call.arguments) {
            Ok(v) => v,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Invalid JSON in tool arguments");
                return error_payload(&format!("Invalid arguments JSON: {}", e));
            }
        };

        match self.tools.execute(&call.name, args).await {
            Ok(result) => self.tools.summarize(&call.name, &result),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool call failed");
                error_payload(&e.to_string())
            }
        }
    }
}

/// The structured error result fed back to the provider.
fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::expense::test_fixtures::sample_store;
    use crate::memory::Role;
    use crate::providers::{LlmResponse, ToolDefinition};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted provider: pops responses in order; once the script is
    /// empty it keeps requesting a tool call, like a provider that never
    /// settles.
    struct StubProvider {
        script: Mutex<VecDeque<LlmResponse>>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(script: Vec<LlmResponse>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn endless_tool_calls() -> Self {
            Self::new(vec![])
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn generate(
            &self,
            _messages: Vec<Message>,
            _tools: Vec<ToolDefinition>,
            _model: Option<&str>,
            _options: GenerateOptions,
        ) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| {
                LlmResponse::with_tools(
                    "",
                    vec![LlmToolCall::new(
                        "call_loop",
                        "calculate_statistics",
                        r#"{"metric": "count"}"#,
                    )],
                )
            }))
        }

        fn default_model(&self) -> &str {
            "stub-1"
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn agent_with(provider: Arc<StubProvider>) -> ExpenseAgent {
        ExpenseAgent::new(provider, Arc::new(sample_store()))
            .with_step_pause(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn test_immediate_answer() {
        let provider = Arc::new(StubProvider::new(vec![LlmResponse::text("You spent $80.")]));
        let mut agent = agent_with(Arc::clone(&provider));

        let answer = agent.run("how much?").await.unwrap();
        assert_eq!(answer, "You spent $80.");
        assert_eq!(provider.call_count(), 1);

        // system, user, assistant
        let roles: Vec<_> = agent.memory().messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_step_budget_terminates_after_exactly_three_rounds() {
        let provider = Arc::new(StubProvider::endless_tool_calls());
        let mut agent = agent_with(Arc::clone(&provider));

        let answer = agent.run("loop forever").await.unwrap();
        assert_eq!(answer, MAX_STEPS_MESSAGE);
        assert_eq!(provider.call_count(), DEFAULT_MAX_STEPS);
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let provider = Arc::new(StubProvider::new(vec![
            LlmResponse::with_tools(
                "",
                vec![LlmToolCall::new(
                    "call_1",
                    "calculate_statistics",
                    r#"{"metric": "sum", "category": "Dining"}"#,
                )],
            ),
            LlmResponse::text("Dining came to $27.25."),
        ]));
        let mut agent = agent_with(Arc::clone(&provider));

        let answer = agent.run("dining total?").await.unwrap();
        assert_eq!(answer, "Dining came to $27.25.");
        assert_eq!(provider.call_count(), 2);

        // The tool result landed in memory with the right correlation id.
        let tools = agent.memory().by_role(Role::Tool);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].tool_call_id.as_deref(), Some("call_1"));
        let payload: Value = serde_json::from_str(&tools[0].content).unwrap();
        assert_eq!(payload["value"], 27.25);
    }

    #[tokio::test]
    async fn test_dispatch_order_is_preserved() {
        let provider = Arc::new(StubProvider::new(vec![
            LlmResponse::with_tools(
                "",
                vec![
                    LlmToolCall::new("call_a", "calculate_statistics", r#"{"metric": "count"}"#),
                    LlmToolCall::new(
                        "call_b",
                        "aggregate_expenses",
                        r#"{"groupBy": "month", "metric": "sum"}"#,
                    ),
                ],
            ),
            LlmResponse::text("done"),
        ]));
        let mut agent = agent_with(provider);

        agent.run("breakdown please").await.unwrap();
        let tools = agent.memory().by_role(Role::Tool);
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].tool_call_id.as_deref(), Some("call_a"));
        assert_eq!(tools[1].tool_call_id.as_deref(), Some("call_b"));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_result() {
        let provider = Arc::new(StubProvider::new(vec![
            LlmResponse::with_tools(
                "",
                vec![LlmToolCall::new("call_1", "transfer_funds", "{}")],
            ),
            LlmResponse::text("I can't do that."),
        ]));
        let mut agent = agent_with(Arc::clone(&provider));

        let answer = agent.run("move my money").await.unwrap();
        assert_eq!(answer, "I can't do that.");

        let tools = agent.memory().by_role(Role::Tool);
        let payload: Value = serde_json::from_str(&tools[0].content).unwrap();
        assert_eq!(payload["error"], "Unknown tool: transfer_funds");
    }

    #[tokio::test]
    async fn test_malformed_arguments_become_error_result() {
        let provider = Arc::new(StubProvider::new(vec![
            LlmResponse::with_tools(
                "",
                vec![LlmToolCall::new("call_1", "calculate_statistics", "{not json")],
            ),
            LlmResponse::text("sorry"),
        ]));
        let mut agent = agent_with(provider);

        agent.run("stats").await.unwrap();
        let tools = agent.memory().by_role(Role::Tool);
        let payload: Value = serde_json::from_str(&tools[0].content).unwrap();
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid arguments JSON"));
    }

    #[tokio::test]
    async fn test_budget_message_is_recorded_in_memory() {
        let provider = Arc::new(StubProvider::endless_tool_calls());
        let mut agent = agent_with(provider);

        agent.run("spin").await.unwrap();
        let last = agent.memory().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, MAX_STEPS_MESSAGE);
    }

    #[tokio::test]
    async fn test_custom_step_budget() {
        let provider = Arc::new(StubProvider::endless_tool_calls());
        let mut agent = ExpenseAgent::new(Arc::clone(&provider) as Arc<dyn LlmProvider>, Arc::new(sample_store()))
            .with_max_steps(1)
            .with_step_pause(Duration::from_millis(0));

        let answer = agent.run("loop").await.unwrap();
        assert_eq!(answer, MAX_STEPS_MESSAGE);
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_agent_registers_all_three_tools() {
        let provider = Arc::new(StubProvider::endless_tool_calls());
        let agent = agent_with(provider);
        assert_eq!(agent.tool_count(), 3);
    }
}
