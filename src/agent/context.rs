//! Context builder for agent conversations
//!
//! Renders the system prompt that seeds conversation memory. The prompt
//! carries the assistant's capabilities and grounding for relative date
//! phrases ("last month"), with the current date rendered at construction
//! time rather than hardcoded.

use chrono::{Datelike, NaiveDate};

/// System prompt template; `{today}`, `{this_month}` and `{last_month}` are
/// substituted at build time.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a highly capable Personal Finance Assistant. Your goal is to help users analyze their expenses, track spending patterns, and gain insights into their financial behavior.

**Context:**
- Today's date is **{today}**.
- All amounts are in USD unless otherwise specified.

**Your Capabilities:**
- You can filter expenses by date range, category, amount, and vendor.
- You can calculate statistics like sum, mean (average), median, min, max, and count.
- You can aggregate data by category, vendor, or month.
- You can detect and exclude anomalies (outliers) from your analysis.

**Guidelines:**
1. **Be Precise:** When users ask for numbers, provide the exact figures returned by your tools.
2. **Handle Follow-ups:** You remember previous queries. If a user asks "What about the month before?", refer back to your previous tool results to understand the context.
3. **Anomaly Detection:** If a user mentions "outliers", "anomalies", or "weird purchases", use the `excludeAnomalies: true` parameter in your tools.
4. **Formatting:** Use Markdown for your responses. Use tables for breakdowns and bold text for key figures.
5. **Conciseness:** Be helpful but concise. Direct answers are preferred.

**Examples of Date Ranges:**
- This month: `startDate: "{this_month_start}", endDate: "{this_month_end}"`
- Last month: `startDate: "{last_month_start}", endDate: "{last_month_end}"`

Always aim to give the most accurate and insightful financial answers based on the data provided."#;

/// Builds the system prompt for the agent's conversation memory.
///
/// # Example
///
/// ```rust
/// use spendsage::agent::ContextBuilder;
///
/// let prompt = ContextBuilder::new().build_system_prompt();
/// assert!(prompt.contains("Personal Finance Assistant"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    /// Full replacement for the default prompt, if set
    system_prompt: Option<String>,
}

impl ContextBuilder {
    /// Create a new context builder using the default prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default system prompt entirely.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    /// Render the system prompt with today's date.
    pub fn build_system_prompt(&self) -> String {
        self.build_system_prompt_for(chrono::Local::now().date_naive())
    }

    /// Render the system prompt for a specific "today" (deterministic tests).
    pub fn build_system_prompt_for(&self, today: NaiveDate) -> String {
        if let Some(custom) = &self.system_prompt {
            return custom.clone();
        }

        let (this_start, this_end) = month_range(today);
        let (last_start, last_end) = month_range(this_start.pred_opt().unwrap_or(this_start));

        SYSTEM_PROMPT_TEMPLATE
            .replace("{today}", &today.format("%A, %B %-d, %Y").to_string())
            .replace("{this_month_start}", &this_start.to_string())
            .replace("{this_month_end}", &this_end.to_string())
            .replace("{last_month_start}", &last_start.to_string())
            .replace("{last_month_end}", &last_end.to_string())
    }
}

/// First and last day of the month containing `date`.
fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).expect("day 1 is valid for every month");
    let next_month_start = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    }
    .expect("first of next month is valid");
    (
        start,
        next_month_start
            .pred_opt()
            .expect("last day of month is valid"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_month_range() {
        assert_eq!(
            month_range(date("2025-12-30")),
            (date("2025-12-01"), date("2025-12-31"))
        );
        assert_eq!(
            month_range(date("2024-02-10")),
            (date("2024-02-01"), date("2024-02-29"))
        );
    }

    #[test]
    fn test_prompt_renders_dates() {
        let prompt = ContextBuilder::new().build_system_prompt_for(date("2025-12-30"));
        assert!(prompt.contains("Tuesday, December 30, 2025"));
        assert!(prompt.contains(r#"startDate: "2025-12-01", endDate: "2025-12-31""#));
        assert!(prompt.contains(r#"startDate: "2025-11-01", endDate: "2025-11-30""#));
    }

    #[test]
    fn test_prompt_handles_january() {
        let prompt = ContextBuilder::new().build_system_prompt_for(date("2026-01-15"));
        assert!(prompt.contains(r#"startDate: "2025-12-01", endDate: "2025-12-31""#));
    }

    #[test]
    fn test_custom_prompt_wins() {
        let prompt = ContextBuilder::new()
            .with_system_prompt("You are a terse accountant.")
            .build_system_prompt();
        assert_eq!(prompt, "You are a terse accountant.");
    }
}
