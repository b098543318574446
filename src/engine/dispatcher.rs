use super::progress::{describe_task, progress_for};
use super::registry::HandlerRegistry;
use super::resolver;
use super::state::{RunState, RunStatus, StepEvent, StepMeta, StepName};
use crate::planner::{Plan, PlannerService};
use futures_util::Stream;
use std::sync::Arc;

/// Sequential plan executor.
///
/// Runs planning, then every task strictly in plan order, then the terminal
/// report extraction, yielding one `StepEvent` after each step. Exactly one
/// handler invocation happens per planned task and every task leaves exactly
/// one record behind; no task outcome can abort the run.
pub struct Dispatcher {
    planner: Arc<dyn PlannerService>,
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(planner: Arc<dyn PlannerService>, registry: Arc<HandlerRegistry>) -> Self {
        Self { planner, registry }
    }

    pub fn run_stream(
        &self,
        mut state: RunState,
    ) -> impl Stream<Item = StepEvent> + Send + 'static {
        let planner = Arc::clone(&self.planner);
        let registry = Arc::clone(&self.registry);

        async_stream::stream! {
            // ── planning ─────────────────────────────────────────────
            state.status = RunStatus::Planning;
            state.message = format!("Planning research for: {}", state.query);

            let plan = match planner.plan(&state.query).await {
                Ok(plan) => plan,
                Err(err) => {
                    tracing::warn!(error = %err, "planner failed, using fallback plan");
                    Plan::fallback(&state.query)
                }
            };
            for (task, referenced) in resolver::forward_references(&plan) {
                tracing::warn!(
                    task,
                    referenced,
                    "plan references a task that has not run yet; it will resolve to nothing"
                );
            }
            tracing::info!(
                run_id = %state.run_id,
                intent = %plan.intent,
                tasks = plan.tasks.len(),
                "plan accepted"
            );
            state.plan = Some(plan);
            state.message = format!(
                "Created a {}-step research plan",
                state.planned_tasks().len()
            );

            yield StepEvent {
                step: StepName::Planner,
                progress: progress_for(StepName::Planner, &state),
                description: state.message.clone(),
                meta: None,
                state: state.clone(),
            };

            // ── task execution ───────────────────────────────────────
            let total_tasks = state.planned_tasks().len();
            while let Some(task) = state
                .planned_tasks()
                .get(state.current_task_index)
                .cloned()
            {
                let index = state.current_task_index;
                state.status = RunStatus::Executing;
                state.message = describe_task(&task);
                tracing::debug!(
                    run_id = %state.run_id,
                    task = index,
                    action = %task.action,
                    "executing task"
                );

                let record = registry.execute(&state, &task).await;
                if let Some(error) = record.error.as_deref() {
                    tracing::warn!(
                        run_id = %state.run_id,
                        task = index,
                        action = %task.action,
                        error,
                        "task recorded an error"
                    );
                }
                // First write wins; a record is never replaced.
                state.task_results.entry(index).or_insert(record);
                state.current_task_index += 1;

                yield StepEvent {
                    step: StepName::TaskExecutor,
                    progress: progress_for(StepName::TaskExecutor, &state),
                    description: state.message.clone(),
                    meta: Some(StepMeta {
                        action: task.action,
                        task_index: index,
                        total_tasks,
                    }),
                    state: state.clone(),
                };
            }

            // ── report extraction ────────────────────────────────────
            state.status = RunStatus::Finalizing;
            let report = state
                .task_results
                .values()
                .find_map(|record| record.final_report.clone())
                .unwrap_or_else(|| failure_report(&state));
            state.final_report = Some(report);
            state.status = RunStatus::Done;
            state.message = "Research complete".to_string();

            yield StepEvent {
                step: StepName::Finalize,
                progress: progress_for(StepName::Finalize, &state),
                description: state.message.clone(),
                meta: None,
                state: state.clone(),
            };
        }
    }

    /// Drive the stream to its end and return the terminal state.
    pub async fn run_to_completion(&self, state: RunState) -> RunState {
        use futures_util::StreamExt;

        let stream = self.run_stream(state);
        futures_util::pin_mut!(stream);
        let mut last = None;
        while let Some(event) = stream.next().await {
            last = Some(event.state);
        }
        match last {
            Some(state) => state,
            // The stream yields the finalize event unconditionally.
            None => unreachable!("dispatcher stream always yields a terminal event"),
        }
    }
}

/// Report produced when no task wrote one, so the caller always gets a
/// document describing what happened instead of an empty response.
fn failure_report(state: &RunState) -> String {
    let mut out = format!(
        "# Research Report\n\n**Query:** {}\n\nThe research run did not produce a final report.\n",
        state.query
    );
    let errors: Vec<_> = state
        .task_results
        .iter()
        .filter_map(|(index, record)| {
            record.error.as_deref().map(|error| (index, error))
        })
        .collect();
    if !errors.is_empty() {
        out.push_str("\n## Task errors\n\n");
        for (index, error) in errors {
            let action = state
                .planned_tasks()
                .get(*index)
                .map_or_else(|| "unknown".to_string(), |task| task.action.to_string());
            out.push_str(&format!("- Task {index} ({action}): {error}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{HandlerFuture, TaskHandler, TaskRecord};
    use crate::planner::{Action, PlanFuture, Task};
    use futures_util::StreamExt;

    struct CannedPlanner {
        plan: Option<Plan>,
    }

    impl PlannerService for CannedPlanner {
        fn plan<'a>(&'a self, _query: &'a str) -> PlanFuture<'a> {
            let plan = self.plan.clone();
            Box::pin(async move {
                plan.ok_or_else(|| anyhow::anyhow!("planner offline"))
            })
        }
    }

    struct FailingHandler(Action);

    impl TaskHandler for FailingHandler {
        fn action(&self) -> Action {
            self.0
        }

        fn run<'a>(&'a self, _state: &'a RunState, _task: &'a Task) -> HandlerFuture<'a> {
            Box::pin(async { Err(anyhow::anyhow!("always fails")) })
        }
    }

    fn dispatcher_with(plan: Option<Plan>, registry: HandlerRegistry) -> Dispatcher {
        Dispatcher::new(Arc::new(CannedPlanner { plan }), Arc::new(registry))
    }

    #[tokio::test]
    async fn planner_failure_falls_back_and_still_terminates() {
        let dispatcher = dispatcher_with(None, HandlerRegistry::new());
        let state = dispatcher
            .run_to_completion(RunState::new("wireless earbuds", false))
            .await;

        assert_eq!(state.status, RunStatus::Done);
        assert!(state.final_report.is_some());
        // Fallback text plan has five tasks, all without handlers here.
        assert_eq!(state.task_results.len(), 5);
        assert!(state.task_results.values().all(TaskRecord::is_error));
    }

    #[tokio::test]
    async fn every_task_yields_one_event_and_one_record() {
        let plan = Plan {
            intent: "test".into(),
            tasks: vec![
                Task::new(Action::Search).with_query("a"),
                Task::new(Action::Scrape).with_from_task("task:0"),
                Task::new(Action::Finalize),
            ],
            reasoning: None,
        };
        let dispatcher = dispatcher_with(Some(plan), HandlerRegistry::new());
        let stream = dispatcher.run_stream(RunState::new("q", false));
        futures_util::pin_mut!(stream);

        let events: Vec<_> = stream.collect().await;
        // planner + 3 tasks + finalize
        assert_eq!(events.len(), 5);
        let last = events.last().unwrap();
        assert_eq!(last.progress, 100);
        assert_eq!(last.state.task_results.len(), 3);

        let mut previous = 0;
        for event in &events {
            assert!(event.progress >= previous, "progress regressed");
            previous = event.progress;
        }
    }

    #[tokio::test]
    async fn handler_failures_never_abort_the_run() {
        let plan = Plan {
            intent: "test".into(),
            tasks: (0..4)
                .map(|_| Task::new(Action::Scrape).with_query("https://x.example"))
                .collect(),
            reasoning: None,
        };
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(FailingHandler(Action::Scrape)));
        let dispatcher = dispatcher_with(Some(plan), registry);

        let state = dispatcher.run_to_completion(RunState::new("q", false)).await;
        assert_eq!(state.status, RunStatus::Done);
        assert_eq!(state.task_results.len(), 4);
        let report = state.final_report.unwrap();
        assert!(report.contains("always fails"));
    }

    #[tokio::test]
    async fn final_report_is_lifted_from_task_results() {
        struct ReportHandler;
        impl TaskHandler for ReportHandler {
            fn action(&self) -> Action {
                Action::Finalize
            }
            fn run<'a>(&'a self, _s: &'a RunState, _t: &'a Task) -> HandlerFuture<'a> {
                Box::pin(async {
                    Ok(TaskRecord {
                        final_report: Some("# The Report".into()),
                        ..TaskRecord::default()
                    })
                })
            }
        }

        let plan = Plan {
            intent: "test".into(),
            tasks: vec![Task::new(Action::Finalize)],
            reasoning: None,
        };
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(ReportHandler));
        let dispatcher = dispatcher_with(Some(plan), registry);

        let state = dispatcher.run_to_completion(RunState::new("q", false)).await;
        assert_eq!(state.final_report.as_deref(), Some("# The Report"));
    }
}
