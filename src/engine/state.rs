use crate::planner::{Action, Plan, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Result record written by one task.
///
/// The record is open-ended: the dispatcher and the finalize step only give
/// meaning to the documented fields, everything a handler adds beyond them
/// rides along in `extra` as opaque payload. Once the dispatcher writes a
/// record for an index it is never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_compared: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, flatten, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, Value>,
}

impl TaskRecord {
    /// A record that carries nothing but an error. The run continues; the
    /// error is data, not a control-flow signal.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Dispatcher phase, reported to streaming callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Planning,
    Executing,
    Finalizing,
    Done,
}

/// The single mutable record threaded through one research run.
///
/// Owned exclusively by the dispatcher; handlers receive it by shared
/// reference to resolve `from_task` references and never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Stable identifier for this run, passed explicitly (never ambient).
    pub run_id: String,
    /// Original input, immutable after creation.
    pub query: String,
    pub deep_research: bool,
    /// Set once by the planning phase, then read-only.
    pub plan: Option<Plan>,
    /// Append-only: keyed by task index, written exactly once per task.
    pub task_results: BTreeMap<usize, TaskRecord>,
    /// The only field that drives control flow.
    pub current_task_index: usize,
    /// Populated only by the terminal extraction step.
    pub final_report: Option<String>,
    /// Transient, overwritten on every transition; progress display only.
    pub status: RunStatus,
    pub message: String,
}

impl RunState {
    pub fn new(query: impl Into<String>, deep_research: bool) -> Self {
        let query = query.into();
        Self {
            run_id: Uuid::new_v4().to_string(),
            query,
            deep_research,
            plan: None,
            task_results: BTreeMap::new(),
            current_task_index: 0,
            final_report: None,
            status: RunStatus::Planning,
            message: String::new(),
        }
    }

    /// Tasks of the accepted plan; empty before planning has completed.
    pub fn planned_tasks(&self) -> &[Task] {
        self.plan.as_ref().map_or(&[], |plan| plan.tasks.as_slice())
    }

    pub fn intent(&self) -> &str {
        self.plan.as_ref().map_or("", |plan| plan.intent.as_str())
    }
}

/// Name of the graph step a `StepEvent` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Planner,
    TaskExecutor,
    Finalize,
}

impl StepName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::TaskExecutor => "task_executor",
            Self::Finalize => "finalize",
        }
    }
}

/// Per-task metadata attached to task-executor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMeta {
    pub action: Action,
    pub task_index: usize,
    pub total_tasks: usize,
}

/// One entry of the step stream a caller observes while a run executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEvent {
    pub step: StepName,
    pub state: RunState,
    /// 0-100, monotonically non-decreasing within a run.
    pub progress: u8,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<StepMeta>,
}
