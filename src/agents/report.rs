use super::record_with;
use crate::engine::{HandlerFuture, RunState, TaskHandler, TaskRecord};
use crate::planner::{Action, Task};
use crate::prompt::{self, PromptEngine};
use crate::providers::LlmRouter;
use crate::store::{ReportStore, StoredReport};
use std::sync::Arc;

/// Keeps the prompt within a sane context size even for long runs.
const MAX_RESULTS_CHARS: usize = 50_000;

/// Synthesizes the final markdown report from everything the run collected
/// and persists it.
pub struct FinalizeHandler {
    llm: Arc<LlmRouter>,
    prompts: Arc<PromptEngine>,
    store: Option<Arc<dyn ReportStore>>,
}

impl FinalizeHandler {
    pub fn new(
        llm: Arc<LlmRouter>,
        prompts: Arc<PromptEngine>,
        store: Option<Arc<dyn ReportStore>>,
    ) -> Self {
        Self { llm, prompts, store }
    }

    async fn run_inner(&self, state: &RunState, _task: &Task) -> anyhow::Result<TaskRecord> {
        let scraped = state
            .task_results
            .values()
            .filter(|record| record.product_data.is_some())
            .count();

        // A comparison report built from fewer than two products would be
        // fabricated; say so instead of asking the model to invent one.
        let report = if state.intent() == "product_comparison" && scraped < 2 {
            insufficient_data_report(state, scraped)
        } else {
            self.generate(state).await?
        };

        self.persist(state, &report).await;

        Ok(record_with(|record| {
            record.final_report = Some(report);
        }))
    }

    async fn generate(&self, state: &RunState) -> anyhow::Result<String> {
        let mut results_json = serde_json::to_string_pretty(&state.task_results)?;
        if results_json.len() > MAX_RESULTS_CHARS {
            results_json.truncate(MAX_RESULTS_CHARS);
            results_json.push_str("\n... (truncated)");
        }

        let plan_json = match &state.plan {
            Some(plan) => serde_json::to_string_pretty(plan)?,
            None => "{}".to_string(),
        };
        let target_length = if state.deep_research {
            "1100-2000 words"
        } else {
            "700-1600 words"
        };

        let mut ctx = tera::Context::new();
        ctx.insert(
            "current_date",
            &chrono::Utc::now().format("%B %d, %Y").to_string(),
        );
        ctx.insert("query", &state.query);
        ctx.insert("plan_json", &plan_json);
        ctx.insert("results_json", &results_json);
        ctx.insert("url_evidence", &url_evidence(state));
        ctx.insert("target_length", target_length);
        let prompt_text = self.prompts.render(prompt::FINAL_REPORT, &ctx)?;

        self.llm.run(&prompt_text, None, state.deep_research).await
    }

    async fn persist(&self, state: &RunState, report: &str) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let stored = StoredReport {
            id: state.run_id.clone(),
            query: state.query.clone(),
            intent: state.intent().to_string(),
            deep_research: state.deep_research,
            report: report.to_string(),
            created_at: chrono::Utc::now(),
        };
        // Persistence failures must not fail the research run.
        if let Err(err) = store.save(&stored).await {
            tracing::warn!(run_id = %state.run_id, error = %err, "failed to persist report");
        }
    }
}

impl TaskHandler for FinalizeHandler {
    fn action(&self) -> Action {
        Action::Finalize
    }

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a> {
        Box::pin(self.run_inner(state, task))
    }
}

/// URLs the run actually fetched, cited to the model so the report links
/// real pages instead of hallucinated ones.
fn url_evidence(state: &RunState) -> String {
    let mut lines = Vec::new();
    for (index, record) in &state.task_results {
        if let Some(url) = record.url.as_deref().or(record.primary_url.as_deref()) {
            lines.push(format!("- task {index}: {url}"));
        }
    }
    if lines.is_empty() {
        "(no pages were fetched)".to_string()
    } else {
        lines.join("\n")
    }
}

fn insufficient_data_report(state: &RunState, scraped: usize) -> String {
    let mut out = format!(
        "# Product Comparison: {}\n\n\
         Not enough product data was collected to produce a reliable comparison \
         ({scraped} of at least 2 products scraped successfully).\n",
        state.query
    );
    let errors: Vec<String> = state
        .task_results
        .iter()
        .filter_map(|(index, record)| {
            record
                .error
                .as_deref()
                .map(|error| format!("- Task {index}: {error}"))
        })
        .collect();
    if !errors.is_empty() {
        out.push_str("\n## What went wrong\n\n");
        out.push_str(&errors.join("\n"));
        out.push('\n');
    }
    out.push_str("\nTry again, or provide the product URLs directly.\n");
    out
}
