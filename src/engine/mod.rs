//! Dynamic task-graph execution engine.
//!
//! A plan's shape (task count, action types, cross-references) is not known
//! until the planner has run. The dispatcher walks the plan strictly in order,
//! isolates per-task failures as data inside the run state, and emits one
//! progress event per step for streaming callers.

mod dispatcher;
mod progress;
pub mod resolver;
mod registry;
mod state;

pub use dispatcher::Dispatcher;
pub use progress::{describe_task, progress_for};
pub use registry::{HandlerFuture, HandlerRegistry, TaskHandler};
pub use state::{RunState, RunStatus, StepEvent, StepMeta, StepName, TaskRecord};
