//! Analysis result cache repository.

use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use vsight_models::AnalysisRecord;

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_operation;

/// Maximum stored length of a remote asset id.
pub const MAX_ASSET_ID_LEN: usize = 200;

/// Persistent store of analysis text keyed by remote asset id.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Insert or overwrite the analysis for `asset_id`.
    ///
    /// At most one record exists per asset id. An existing record keeps its
    /// `record_id` and `created_at`; only `content` and `updated_at` change.
    async fn upsert(&self, asset_id: &str, content: &str) -> StoreResult<AnalysisRecord>;

    /// Fetch the cached analysis for `asset_id`, if any.
    async fn get_by_asset_id(&self, asset_id: &str) -> StoreResult<Option<AnalysisRecord>>;
}

#[derive(sqlx::FromRow)]
struct AnalysisRow {
    record_id: String,
    asset_id: String,
    content: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnalysisRow> for AnalysisRecord {
    fn from(row: AnalysisRow) -> Self {
        Self {
            record_id: row.record_id,
            asset_id: row.asset_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SQLite implementation of [`ResultCache`].
#[derive(Clone)]
pub struct SqliteAnalysisStore {
    pool: SqlitePool,
}

impl SqliteAnalysisStore {
    /// Open (creating if missing) the database at `database_url` and apply migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool).await?;
        info!(database_url, "Analysis cache ready");
        Ok(store)
    }

    /// Open a private in-memory database. Used by tests and one-off CLI runs.
    pub async fn in_memory() -> StoreResult<Self> {
        // Each in-memory connection is its own database, so pin the pool to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying migrations.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap round-trip used by readiness checks.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn validate_asset_id(asset_id: &str) -> StoreResult<()> {
    if asset_id.trim().is_empty() {
        return Err(StoreError::invalid_asset_id("asset id is empty"));
    }
    if asset_id.len() > MAX_ASSET_ID_LEN {
        return Err(StoreError::invalid_asset_id(format!(
            "asset id exceeds {} bytes",
            MAX_ASSET_ID_LEN
        )));
    }
    Ok(())
}

#[async_trait]
impl ResultCache for SqliteAnalysisStore {
    async fn upsert(&self, asset_id: &str, content: &str) -> StoreResult<AnalysisRecord> {
        validate_asset_id(asset_id)?;

        let start = Instant::now();
        let now = Utc::now();
        let result = sqlx::query_as::<_, AnalysisRow>(
            r#"INSERT INTO video_analyses (id, file_id, analysis_content, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(file_id) DO UPDATE SET
                   analysis_content = excluded.analysis_content,
                   updated_at = excluded.updated_at
               RETURNING id AS record_id,
                         file_id AS asset_id,
                         analysis_content AS content,
                         created_at,
                         updated_at"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(asset_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        record_operation(
            "upsert",
            result.is_ok(),
            start.elapsed().as_secs_f64() * 1000.0,
        );
        let record: AnalysisRecord = result?.into();

        debug!(
            asset_id,
            record_id = %record.record_id,
            "Cached analysis"
        );
        Ok(record)
    }

    async fn get_by_asset_id(&self, asset_id: &str) -> StoreResult<Option<AnalysisRecord>> {
        let start = Instant::now();
        let result = sqlx::query_as::<_, AnalysisRow>(
            r#"SELECT id AS record_id,
                      file_id AS asset_id,
                      analysis_content AS content,
                      created_at,
                      updated_at
               FROM video_analyses
               WHERE file_id = ?"#,
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await;

        record_operation(
            "get_by_asset_id",
            result.is_ok(),
            start.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(result?.map(Into::into))
    }
}
