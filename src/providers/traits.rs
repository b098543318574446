use std::future::Future;
use std::pin::Pin;

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

/// LLM provider abstraction. The planner and the task handlers depend only on
/// this trait; the concrete HTTP client is wired in at startup.
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn name(&self) -> &str;

    fn chat<'a>(&'a self, message: &'a str, model: &'a str, temperature: f64) -> ChatFuture<'a> {
        self.chat_with_system(None, message, model, temperature)
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> ChatFuture<'a>;
}
