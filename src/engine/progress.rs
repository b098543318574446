use super::state::{RunState, StepName};
use crate::planner::{Action, Task};
use crate::utils::truncate_with_ellipsis;

/// Percentage of the run completed after the given step.
///
/// A run of N tasks has N+2 reportable steps: planning, each task, and the
/// terminal extraction. The value never decreases across a run and the
/// finalize step always reports 100.
pub fn progress_for(step: StepName, state: &RunState) -> u8 {
    let total = state.planned_tasks().len() + 2;
    let completed = match step {
        StepName::Planner => 1,
        // current_task_index has already been advanced past the task.
        StepName::TaskExecutor => 1 + state.current_task_index,
        StepName::Finalize => total,
    };
    u8::try_from((completed * 100 / total).min(100)).unwrap_or(100)
}

/// Human-readable line for what a task is doing, shown in progress streams.
pub fn describe_task(task: &Task) -> String {
    if let Some(description) = task.description.as_deref() {
        return description.to_string();
    }
    let target = |fallback: &str| {
        task.query
            .as_deref()
            .map_or_else(|| fallback.to_string(), |q| truncate_with_ellipsis(q, 80))
    };
    match task.action {
        Action::Search => format!("Searching for: {}", target("products")),
        Action::Scrape => format!("Scraping product page: {}", target("linked result")),
        Action::Summarize => "Summarizing product data".to_string(),
        Action::Sentiment => "Analyzing product sentiment".to_string(),
        Action::Compare => "Comparing products".to_string(),
        Action::Finalize => "Synthesizing final report".to_string(),
        Action::Unknown => format!("Running {} task...", task.action),
    }
}
