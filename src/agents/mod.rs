//! Task handlers. One per plan action, all registered into the engine's
//! handler registry at startup.

mod compare;
mod report;
mod scrape;
mod search;
mod sentiment;
mod summarize;

pub use compare::CompareHandler;
pub use report::FinalizeHandler;
pub use scrape::ScrapeHandler;
pub use search::SearchHandler;
pub use sentiment::SentimentHandler;
pub use summarize::SummarizeHandler;

use crate::engine::{resolver, RunState, TaskRecord};
use crate::planner::Task;
use serde_json::Value;

/// Product data a task should operate on: the referenced task's output when
/// `from_task` is set, otherwise the most recent scrape in the run.
fn product_data_for<'a>(task: &Task, state: &'a RunState) -> Option<&'a Value> {
    match task.from_task.as_deref() {
        Some(expr) => resolver::resolve_product_data(expr, &state.task_results),
        None => state
            .task_results
            .values()
            .rev()
            .find_map(|record| record.product_data.as_ref()),
    }
}

/// All product data referenced by the task, falling back to every scrape in
/// the run when no reference is given.
fn all_product_data_for<'a>(task: &Task, state: &'a RunState) -> Vec<&'a Value> {
    match task.from_task.as_deref() {
        Some(expr) => resolver::resolve_many_product_data(expr, &state.task_results),
        None => state
            .task_results
            .values()
            .filter_map(|record| record.product_data.as_ref())
            .collect(),
    }
}

fn record_with<F: FnOnce(&mut TaskRecord)>(fill: F) -> TaskRecord {
    let mut record = TaskRecord::default();
    fill(&mut record);
    record
}
