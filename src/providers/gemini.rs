use super::traits::{ChatFuture, Provider};
use super::{pooled_client, LLM_TIMEOUT};
use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: Option<String>,
    max_output_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiProvider {
    pub fn new(base_url: &str, api_key: Option<&str>, max_output_tokens: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            max_output_tokens,
            client: pooled_client(LLM_TIMEOUT),
        }
    }

    fn build_request(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        temperature: f64,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: system_prompt.map(|text| Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: message.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn generate(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("GEMINI_API_KEY is required but not configured")?;

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let request = self.build_request(system_prompt, message, temperature);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .context("gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "gemini returned {status} for model {model}: {}",
                crate::utils::truncate_with_ellipsis(&body, 400)
            );
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("gemini response was not valid JSON")?;

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        anyhow::ensure!(!text.is_empty(), "gemini returned no candidates");
        Ok(text)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> ChatFuture<'a> {
        Box::pin(self.generate(system_prompt, message, model, temperature))
    }
}
