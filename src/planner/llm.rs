use super::types::Plan;
use crate::error::PlanError;
use crate::prompt::{self, PromptEngine};
use crate::providers::{strip_code_fences, LlmRouter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type PlanFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Plan>> + Send + 'a>>;

/// Planning service contract. The dispatcher holds one of these and
/// substitutes the deterministic fallback plan whenever `plan` fails.
pub trait PlannerService: Send + Sync {
    fn plan<'a>(&'a self, query: &'a str) -> PlanFuture<'a>;
}

/// LLM-backed planner: prompts the model for a JSON plan and parses it.
pub struct LlmPlanner {
    router: Arc<LlmRouter>,
    prompts: Arc<PromptEngine>,
}

impl LlmPlanner {
    pub fn new(router: Arc<LlmRouter>, prompts: Arc<PromptEngine>) -> Self {
        Self { router, prompts }
    }

    fn parse_plan(raw: &str) -> Result<Plan, PlanError> {
        let plan: Plan = serde_json::from_str(strip_code_fences(raw))?;
        if plan.tasks.is_empty() {
            return Err(PlanError::Empty);
        }
        Ok(plan)
    }

    async fn plan_inner(&self, query: &str) -> anyhow::Result<Plan> {
        let current_date = chrono::Utc::now().format("%B %d, %Y").to_string();

        let mut system_ctx = tera::Context::new();
        system_ctx.insert("current_date", &current_date);
        let system = self.prompts.render(prompt::PLANNER_SYSTEM, &system_ctx)?;

        let mut ctx = tera::Context::new();
        ctx.insert("query", query);
        let user_prompt = self.prompts.render(prompt::PLANNER, &ctx)?;

        let raw = self.router.run_planner(&user_prompt, Some(&system)).await?;
        let plan = Self::parse_plan(&raw)?;

        tracing::info!(
            intent = %plan.intent,
            tasks = plan.tasks.len(),
            "planner created plan"
        );
        Ok(plan)
    }
}

impl PlannerService for LlmPlanner {
    fn plan<'a>(&'a self, query: &'a str) -> PlanFuture<'a> {
        Box::pin(self.plan_inner(query))
    }
}
