mod gemini;
mod router;
mod traits;

pub use gemini::GeminiProvider;
pub use router::{strip_code_fences, LlmRouter};
pub use traits::{ChatFuture, Provider};

use crate::config::LlmConfig;
use std::sync::Arc;
use std::time::Duration;

/// Model calls can run for minutes on deep-research reports.
pub(crate) const LLM_TIMEOUT: Duration = Duration::from_secs(120);
/// Search and page fetches should fail fast so the run moves on.
pub(crate) const SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pooled HTTP client shared by everything that talks to an external API.
/// Connections are kept warm since a single run fires several requests at
/// the same hosts back to back.
pub(crate) fn pooled_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Build the configured LLM provider.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn Provider> {
    Arc::new(GeminiProvider::new(
        &config.base_url,
        config.resolve_api_key().as_deref(),
        config.max_tokens,
    ))
}
