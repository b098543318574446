mod sqlite;

pub use sqlite::SqliteReportStore;

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub type StoreFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// A completed research report as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: String,
    pub query: String,
    pub intent: String,
    pub deep_research: bool,
    pub report: String,
    pub created_at: DateTime<Utc>,
}

/// Listing row; omits the report body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: String,
    pub query: String,
    pub intent: String,
    pub created_at: DateTime<Utc>,
}

/// Report persistence. Saving is best-effort from the engine's point of
/// view: a failed save is logged, never surfaced to the research caller.
pub trait ReportStore: Send + Sync {
    fn save<'a>(&'a self, report: &'a StoredReport) -> StoreFuture<'a, ()>;

    fn list<'a>(&'a self, limit: u32) -> StoreFuture<'a, Vec<ReportSummary>>;

    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<StoredReport>>;
}
