//! Cross-task reference resolution.
//!
//! Tasks name their inputs with `"task:<index>"` expressions, comma-separated
//! when a task consumes several upstream outputs. Resolution is lenient:
//! malformed segments and references to missing or not-yet-executed tasks are
//! skipped, never fatal. Handlers decide what an empty resolution means.

use super::state::TaskRecord;
use crate::planner::{Plan, Task};
use crate::utils::first_url;
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse a reference expression into task indices.
///
/// `"task:0"` yields `[0]`, `"task:1, task:3"` yields `[1, 3]`. Only what
/// follows the first colon matters; the tag before it is ignored. Segments
/// without a colon or with a non-numeric index are dropped.
pub fn parse_task_refs(expr: &str) -> Vec<usize> {
    expr.split(',')
        .filter_map(|segment| {
            let (_, index) = segment.trim().split_once(':')?;
            index.trim().parse().ok()
        })
        .collect()
}

/// Resolve a reference expression against the results written so far.
/// Preserves the order of the expression; unknown indices are skipped.
pub fn resolve_refs<'a>(
    expr: &str,
    results: &'a BTreeMap<usize, TaskRecord>,
) -> Vec<(usize, &'a TaskRecord)> {
    parse_task_refs(expr)
        .into_iter()
        .filter_map(|index| results.get(&index).map(|record| (index, record)))
        .collect()
}

/// First referenced record, if any.
pub fn resolve_first<'a>(
    expr: &str,
    results: &'a BTreeMap<usize, TaskRecord>,
) -> Option<&'a TaskRecord> {
    resolve_refs(expr, results).into_iter().next().map(|(_, r)| r)
}

/// Determine the URL a task should operate on.
///
/// A literal URL in the task's own query wins. Otherwise the first referenced
/// record is consulted: `product_urls[url_index]` (falling back to the first
/// element when the index is out of range), then `primary_url`, then `url`.
pub fn resolve_url(task: &Task, results: &BTreeMap<usize, TaskRecord>) -> Option<String> {
    if let Some(query) = task.query.as_deref() {
        if let Some(url) = first_url(query) {
            return Some(url.to_string());
        }
    }

    let record = resolve_first(task.from_task.as_deref()?, results)?;

    if let Some(urls) = record.product_urls.as_ref().filter(|urls| !urls.is_empty()) {
        let index = task.url_index.unwrap_or(0);
        let url = urls.get(index).unwrap_or(&urls[0]);
        return Some(url.clone());
    }

    record
        .primary_url
        .clone()
        .or_else(|| record.url.clone())
}

/// Product data of the first referenced task that produced any.
pub fn resolve_product_data<'a>(
    expr: &str,
    results: &'a BTreeMap<usize, TaskRecord>,
) -> Option<&'a Value> {
    resolve_refs(expr, results)
        .into_iter()
        .find_map(|(_, record)| record.product_data.as_ref())
}

/// Product data of every referenced task that produced some, in reference
/// order. Used by comparison tasks that fan in over several scrapes.
pub fn resolve_many_product_data<'a>(
    expr: &str,
    results: &'a BTreeMap<usize, TaskRecord>,
) -> Vec<&'a Value> {
    resolve_refs(expr, results)
        .into_iter()
        .filter_map(|(_, record)| record.product_data.as_ref())
        .collect()
}

/// Pairs `(task_index, referenced_index)` where a task references itself or a
/// later task. Such references resolve to nothing at execution time; the
/// dispatcher logs them up front so a bad plan is visible in the trace.
pub fn forward_references(plan: &Plan) -> Vec<(usize, usize)> {
    plan.tasks
        .iter()
        .enumerate()
        .flat_map(|(index, task)| {
            task.from_task
                .as_deref()
                .map(parse_task_refs)
                .unwrap_or_default()
                .into_iter()
                .filter(move |&referenced| referenced >= index)
                .map(move |referenced| (index, referenced))
        })
        .collect()
}
