mod llm;
mod types;

pub use llm::{LlmPlanner, PlanFuture, PlannerService};
pub use types::{Action, Plan, Task};
