use super::{ReportStore, ReportSummary, StoreFuture, StoredReport};
use crate::error::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS reports (
    id          TEXT PRIMARY KEY,
    query       TEXT NOT NULL,
    intent      TEXT NOT NULL DEFAULT '',
    deep        INTEGER NOT NULL DEFAULT 0,
    report      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at DESC);
";

/// SQLite-backed report store.
pub struct SqliteReportStore {
    pool: SqlitePool,
}

impl SqliteReportStore {
    pub async fn connect(db_path: &Path) -> Result<Self, StoreError> {
        let path_str = db_path
            .to_str()
            .ok_or_else(|| StoreError::Path(db_path.display().to_string()))?;
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{path_str}"))
            .map_err(StoreError::Sqlx)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// In-memory store, used by tests and ephemeral runs.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    async fn save_inner(&self, report: &StoredReport) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO reports (id, query, intent, deep, report, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&report.id)
        .bind(&report.query)
        .bind(&report.intent)
        .bind(i64::from(report.deep_research))
        .bind(&report.report)
        .bind(report.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_inner(&self, limit: u32) -> Result<Vec<ReportSummary>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, query, intent, created_at FROM reports
             ORDER BY created_at DESC LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let created_at: String = row.get("created_at");
                let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
                    .ok()?
                    .with_timezone(&chrono::Utc);
                Some(ReportSummary {
                    id: row.get("id"),
                    query: row.get("query"),
                    intent: row.get("intent"),
                    created_at,
                })
            })
            .collect())
    }

    async fn get_inner(&self, id: &str) -> Result<Option<StoredReport>, StoreError> {
        let row = sqlx::query(
            "SELECT id, query, intent, deep, report, created_at FROM reports WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| {
            let created_at: String = row.get("created_at");
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
                .ok()?
                .with_timezone(&chrono::Utc);
            let deep: i64 = row.get("deep");
            Some(StoredReport {
                id: row.get("id"),
                query: row.get("query"),
                intent: row.get("intent"),
                deep_research: deep != 0,
                report: row.get("report"),
                created_at,
            })
        }))
    }
}

impl ReportStore for SqliteReportStore {
    fn save<'a>(&'a self, report: &'a StoredReport) -> StoreFuture<'a, ()> {
        Box::pin(self.save_inner(report))
    }

    fn list<'a>(&'a self, limit: u32) -> StoreFuture<'a, Vec<ReportSummary>> {
        Box::pin(self.list_inner(limit))
    }

    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<StoredReport>> {
        Box::pin(self.get_inner(id))
    }
}
