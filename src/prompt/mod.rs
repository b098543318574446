mod templates;

pub use templates::system_instruction;

use crate::planner::Action;
use tera::Tera;

/// Tera-backed template engine for the LLM prompts.
///
/// All templates are compiled in; nothing is read from the filesystem.
pub struct PromptEngine {
    tera: Tera,
}

pub const PLANNER: &str = "planner";
pub const PLANNER_SYSTEM: &str = "planner_system";
pub const SUMMARIZE: &str = "summarize";
pub const SENTIMENT: &str = "sentiment";
pub const COMPARE: &str = "compare";
pub const FINAL_REPORT: &str = "final_report";

impl PromptEngine {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (PLANNER, templates::PLANNER_PROMPT),
            (PLANNER_SYSTEM, templates::PLANNER_SYSTEM_PROMPT),
            (SUMMARIZE, templates::SUMMARIZE_PROMPT),
            (SENTIMENT, templates::SENTIMENT_PROMPT),
            (COMPARE, templates::COMPARE_PROMPT),
            (FINAL_REPORT, templates::FINAL_REPORT_PROMPT),
        ])?;
        Ok(Self { tera })
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> anyhow::Result<String> {
        let rendered = self.tera.render(template_name, context)?;
        Ok(rendered)
    }

    /// System instruction for the action's LLM call, when one is defined.
    pub fn system_for(&self, action: Action) -> Option<&'static str> {
        system_instruction(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_compile() {
        assert!(PromptEngine::new().is_ok());
    }

    #[test]
    fn planner_prompt_embeds_query() {
        let engine = PromptEngine::new().unwrap();
        let mut ctx = tera::Context::new();
        ctx.insert("query", "Apple AirPods 4");
        let rendered = engine.render(PLANNER, &ctx).unwrap();
        assert!(rendered.contains("Apple AirPods 4"));
    }

    #[test]
    fn summarize_prompt_embeds_product_json() {
        let engine = PromptEngine::new().unwrap();
        let mut ctx = tera::Context::new();
        ctx.insert("product_json", "{\"title\": \"Widget\"}");
        let rendered = engine.render(SUMMARIZE, &ctx).unwrap();
        assert!(rendered.contains("Widget"));
    }

    #[test]
    fn system_instruction_defined_for_llm_actions() {
        assert!(system_instruction(Action::Summarize).is_some());
        assert!(system_instruction(Action::Sentiment).is_some());
        assert!(system_instruction(Action::Compare).is_some());
        assert!(system_instruction(Action::Search).is_none());
    }
}
