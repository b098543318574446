use crate::utils::links::contains_url;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Everything a task can do. The planner only ever emits these; anything else
/// in a plan deserializes to `Unknown` and is reported as a task-level error
/// at execution time instead of failing the whole plan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Search,
    Scrape,
    Summarize,
    Sentiment,
    Compare,
    #[serde(rename = "final_report")]
    #[strum(serialize = "final_report")]
    Finalize,
    #[serde(other)]
    Unknown,
}

/// One step of a research plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub action: Action,
    /// Free-text input; required when the task does not follow another task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Reference to earlier task outputs, e.g. "task:0" or "task:1,task:3".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_task: Option<String>,
    /// Which element of a list-valued upstream output to use (default 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_index: Option<usize>,
    /// Human-readable label, used only for progress display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            query: None,
            from_task: None,
            url_index: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn with_from_task(mut self, reference: impl Into<String>) -> Self {
        self.from_task = Some(reference.into());
        self
    }

    #[must_use]
    pub fn with_url_index(mut self, index: usize) -> Self {
        self.url_index = Some(index);
        self
    }
}

/// An ordered research plan. Task position is the execution order; a task may
/// only reference outputs of strictly earlier tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub intent: String,
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Plan {
    /// Deterministic plan used whenever the LLM planner is unavailable or
    /// returns garbage. Always non-empty and well-formed, so the dispatcher
    /// has something to execute no matter what.
    pub fn fallback(query: &str) -> Self {
        if contains_url(query) {
            Self {
                intent: "product_analysis".into(),
                tasks: vec![
                    Task::new(Action::Scrape).with_query(query),
                    Task::new(Action::Summarize).with_from_task("task:0"),
                    Task::new(Action::Sentiment).with_from_task("task:0"),
                    Task::new(Action::Finalize),
                ],
                reasoning: Some("Fallback plan (LLM unavailable)".into()),
            }
        } else {
            Self {
                intent: "product_research".into(),
                tasks: vec![
                    Task::new(Action::Search).with_query(query),
                    Task::new(Action::Scrape).with_from_task("task:0"),
                    Task::new(Action::Summarize).with_from_task("task:1"),
                    Task::new(Action::Sentiment).with_from_task("task:1"),
                    Task::new(Action::Finalize),
                ],
                reasoning: Some("Fallback plan (LLM unavailable)".into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_plan_for_url_query_starts_with_scrape() {
        let plan = Plan::fallback("https://example.com/x");
        assert_eq!(plan.tasks.len(), 4);
        assert_eq!(plan.tasks[0].action, Action::Scrape);
        assert_eq!(plan.tasks.last().unwrap().action, Action::Finalize);
        assert_eq!(plan.intent, "product_analysis");
    }

    #[test]
    fn fallback_plan_for_text_query_starts_with_search() {
        let plan = Plan::fallback("wireless headphones");
        assert_eq!(plan.tasks.len(), 5);
        assert_eq!(plan.tasks[0].action, Action::Search);
        assert_eq!(plan.tasks[1].action, Action::Scrape);
        assert_eq!(plan.tasks[1].from_task.as_deref(), Some("task:0"));
        assert_eq!(plan.intent, "product_research");
    }

    #[test]
    fn action_serializes_finalize_as_final_report() {
        let json = serde_json::to_string(&Action::Finalize).unwrap();
        assert_eq!(json, "\"final_report\"");
        let parsed: Action = serde_json::from_str("\"final_report\"").unwrap();
        assert_eq!(parsed, Action::Finalize);
    }

    #[test]
    fn unrecognized_action_deserializes_to_unknown() {
        let parsed: Action = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, Action::Unknown);
    }

    #[test]
    fn plan_round_trips_through_json() {
        let raw = r#"{
            "intent": "product_comparison",
            "tasks": [
                {"action": "search", "query": "AirPods 4"},
                {"action": "scrape", "from_task": "task:0", "url_index": 1},
                {"action": "final_report"}
            ]
        }"#;
        let plan: Plan = serde_json::from_str(raw).unwrap();
        assert_eq!(plan.tasks.len(), 3);
        assert_eq!(plan.tasks[1].url_index, Some(1));
        assert!(plan.reasoning.is_none());
    }
}
