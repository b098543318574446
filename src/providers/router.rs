use super::traits::Provider;
use crate::config::LlmConfig;
use anyhow::Context;
use serde_json::Value;
use std::sync::Arc;

/// Routes LLM calls to the right model for the run mode.
///
/// Deep-research runs use the pro model; everything else uses the default
/// flash model. Mirrors the per-call model selection the handlers need
/// without threading model names through every call site.
pub struct LlmRouter {
    provider: Arc<dyn Provider>,
    model: String,
    deep_model: String,
    planner_model: String,
    temperature: f64,
}

impl LlmRouter {
    pub fn new(provider: Arc<dyn Provider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            deep_model: config.deep_model.clone(),
            planner_model: config.planner_model.clone(),
            temperature: config.temperature,
        }
    }

    fn model_for(&self, deep_research: bool) -> &str {
        if deep_research {
            &self.deep_model
        } else {
            &self.model
        }
    }

    /// Free-text completion.
    pub async fn run(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        deep_research: bool,
    ) -> anyhow::Result<String> {
        self.run_with_temperature(prompt, system_instruction, deep_research, self.temperature)
            .await
    }

    pub async fn run_with_temperature(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        deep_research: bool,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let model = self.model_for(deep_research);
        self.provider
            .chat_with_system(system_instruction, prompt, model, temperature)
            .await
    }

    /// Completion that must come back as a JSON object. Code fences the model
    /// wraps around the payload are stripped before parsing.
    pub async fn run_structured(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        deep_research: bool,
    ) -> anyhow::Result<Value> {
        let raw = self
            .run_with_temperature(prompt, system_instruction, deep_research, 0.5)
            .await?;
        let cleaned = strip_code_fences(&raw);
        serde_json::from_str(cleaned)
            .with_context(|| format!("structured LLM response was not valid JSON: {cleaned:.200}"))
    }

    /// Planner calls use the planner model and a low temperature for
    /// consistent plans.
    pub async fn run_planner(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> anyhow::Result<String> {
        self.provider
            .chat_with_system(system_instruction, prompt, &self.planner_model, 0.3)
            .await
    }
}

/// Strip a leading/trailing markdown code fence from an LLM response.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let inner = inner
        .split_once('\n')
        .map_or(inner, |(_first_line, rest)| rest);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
