use super::state::{RunState, TaskRecord};
use crate::planner::{Action, Task};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type HandlerFuture<'a> =
    Pin<Box<dyn Future<Output = anyhow::Result<TaskRecord>> + Send + 'a>>;

/// One task implementation. Handlers read the run state to resolve their
/// inputs and return a record; they never write to the state themselves.
pub trait TaskHandler: Send + Sync {
    fn action(&self) -> Action;

    fn run<'a>(&'a self, state: &'a RunState, task: &'a Task) -> HandlerFuture<'a>;
}

/// Action-to-handler lookup table.
///
/// `execute` is the failure boundary of the engine: whatever goes wrong inside
/// a handler, and whatever action a plan asks for, the outcome is always a
/// `TaskRecord`. Errors become error records; the run itself cannot be
/// aborted from here.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<Action, Arc<dyn TaskHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(handler.action(), handler);
    }

    pub fn get(&self, action: Action) -> Option<&Arc<dyn TaskHandler>> {
        self.handlers.get(&action)
    }

    pub async fn execute(&self, state: &RunState, task: &Task) -> TaskRecord {
        let Some(handler) = self.handlers.get(&task.action) else {
            return TaskRecord::error(format!("unknown action: {}", task.action));
        };

        match handler.run(state, task).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    action = %task.action,
                    error = %err,
                    "task handler failed, recording error"
                );
                TaskRecord::error(err.to_string())
            }
        }
    }
}
