use crate::agents::{
    CompareHandler, FinalizeHandler, ScrapeHandler, SearchHandler, SentimentHandler,
    SummarizeHandler,
};
use crate::config::Config;
use crate::engine::{Dispatcher, HandlerRegistry};
use crate::error::Result;
use crate::planner::LlmPlanner;
use crate::prompt::PromptEngine;
use crate::providers::{create_provider, LlmRouter};
use crate::services::{PageScraper, TavilyClient};
use crate::store::{ReportStore, SqliteReportStore};
use std::sync::Arc;

/// Fully wired engine plus its report store.
pub struct Runtime {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<dyn ReportStore>,
}

/// Wire every component from the config. This is the only place the
/// concrete provider, store, and handler set are chosen.
pub async fn build_runtime(config: &Config) -> Result<Runtime> {
    let provider = create_provider(&config.llm);
    let router = Arc::new(LlmRouter::new(provider, &config.llm));
    let prompts = Arc::new(PromptEngine::new()?);

    let search = Arc::new(TavilyClient::new(&config.search));
    let scraper = Arc::new(PageScraper::new(&config.scraper)?);

    let db_path = config.storage.resolved_db_path(&config.workspace_dir);
    let store: Arc<dyn ReportStore> = Arc::new(SqliteReportStore::connect(&db_path).await?);

    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(SearchHandler::new(search)));
    registry.register(Arc::new(ScrapeHandler::new(scraper)));
    registry.register(Arc::new(SummarizeHandler::new(
        Arc::clone(&router),
        Arc::clone(&prompts),
    )));
    registry.register(Arc::new(SentimentHandler::new(
        Arc::clone(&router),
        Arc::clone(&prompts),
    )));
    registry.register(Arc::new(CompareHandler::new(
        Arc::clone(&router),
        Arc::clone(&prompts),
    )));
    registry.register(Arc::new(FinalizeHandler::new(
        Arc::clone(&router),
        Arc::clone(&prompts),
        Some(Arc::clone(&store)),
    )));

    let planner = Arc::new(LlmPlanner::new(router, prompts));
    let dispatcher = Arc::new(Dispatcher::new(planner, Arc::new(registry)));

    Ok(Runtime { dispatcher, store })
}
