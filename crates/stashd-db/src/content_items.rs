//! Database operations for the `content_items` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stashd_core::{CompletedContent, ContentItem, ContentState, SummaryBlock};

use crate::DbError;

const COLUMNS: &str = "id, source_domain, url, title, thumbnail_url, category, topic, \
                       small_summary, medium_summary, summary_blocks, consumption_time_min, \
                       state, error_message, created_at, updated_at";

/// A row from the `content_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContentItemRow {
    pub id: Uuid,
    pub source_domain: String,
    pub url: String,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub topic: Option<String>,
    pub small_summary: Option<String>,
    pub medium_summary: Option<String>,
    /// JSONB array of `{title, body}` objects.
    pub summary_blocks: serde_json::Value,
    pub consumption_time_min: Option<i32>,
    pub state: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItemRow {
    /// Converts the raw row into the domain entity.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] when `state` or `summary_blocks`
    /// hold values the domain types cannot represent; the CHECK constraints
    /// make that unreachable for rows this crate wrote.
    pub fn into_domain(self) -> Result<ContentItem, DbError> {
        let state = ContentState::parse(&self.state).ok_or_else(|| {
            DbError::InvalidColumn(format!("content item {} state '{}'", self.id, self.state))
        })?;
        let summary_blocks: Vec<SummaryBlock> = serde_json::from_value(self.summary_blocks)
            .map_err(|err| {
                DbError::InvalidColumn(format!("content item {} summary_blocks: {err}", self.id))
            })?;
        Ok(ContentItem {
            id: self.id,
            source_domain: self.source_domain,
            url: self.url,
            title: self.title,
            thumbnail_url: self.thumbnail_url,
            category: self.category,
            topic: self.topic,
            small_summary: self.small_summary,
            medium_summary: self.medium_summary,
            summary_blocks,
            consumption_time_min: self.consumption_time_min,
            state,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Inserts a fresh `pending` item, or returns `None` when another submission
/// won the race on the URL's unique constraint.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_pending(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
    source_domain: &str,
    url: &str,
) -> Result<Option<ContentItemRow>, DbError> {
    let row = sqlx::query_as::<_, ContentItemRow>(&format!(
        "INSERT INTO content_items (id, source_domain, url) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (url) DO NOTHING \
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(source_domain)
    .bind(url)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_by_url(
    executor: impl sqlx::PgExecutor<'_>,
    url: &str,
) -> Result<Option<ContentItemRow>, DbError> {
    let row = sqlx::query_as::<_, ContentItemRow>(&format!(
        "SELECT {COLUMNS} FROM content_items WHERE url = $1",
    ))
    .bind(url)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<ContentItemRow>, DbError> {
    let row = sqlx::query_as::<_, ContentItemRow>(&format!(
        "SELECT {COLUMNS} FROM content_items WHERE id = $1",
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Resets a `failed` item to `pending` so a fresh submission can retry it.
///
/// Returns `true` when a row actually changed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn restart_failed(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE content_items \
         SET state = 'pending', error_message = NULL, updated_at = NOW() \
         WHERE id = $1 AND state = 'failed'",
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Compare-and-set `pending -> running`. The single UPDATE is the worker
/// mutual-exclusion point: exactly one caller gets the row back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn claim_pending(pool: &PgPool, id: Uuid) -> Result<Option<ContentItemRow>, DbError> {
    let row = sqlx::query_as::<_, ContentItemRow>(&format!(
        "UPDATE content_items \
         SET state = 'running', updated_at = NOW() \
         WHERE id = $1 AND state = 'pending' \
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Applies a completed classification and moves `running -> done` in one
/// statement.
///
/// # Errors
///
/// Returns [`DbError::InvalidStateTransition`] when the item is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn finalize_done(
    pool: &PgPool,
    id: Uuid,
    completed: &CompletedContent,
) -> Result<(), DbError> {
    let summary_blocks = serde_json::to_value(&completed.summary_blocks)
        .map_err(|err| DbError::InvalidColumn(format!("summary_blocks: {err}")))?;

    let result = sqlx::query(
        "UPDATE content_items \
         SET title = $1, thumbnail_url = $2, category = $3, topic = $4, \
             small_summary = $5, medium_summary = $6, summary_blocks = $7, \
             consumption_time_min = $8, error_message = NULL, \
             state = 'done', updated_at = NOW() \
         WHERE id = $9 AND state = 'running'",
    )
    .bind(&completed.title)
    .bind(&completed.thumbnail_url)
    .bind(&completed.category)
    .bind(&completed.topic)
    .bind(&completed.small_summary)
    .bind(&completed.medium_summary)
    .bind(summary_blocks)
    .bind(completed.consumption_time_min)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidStateTransition {
            id,
            expected_state: "running",
        });
    }

    Ok(())
}

/// Records the failure cause and moves `running -> failed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidStateTransition`] when the item is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn finalize_failed(pool: &PgPool, id: Uuid, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE content_items \
         SET error_message = $1, state = 'failed', updated_at = NOW() \
         WHERE id = $2 AND state = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidStateTransition {
            id,
            expected_state: "running",
        });
    }

    Ok(())
}

/// Items sitting in `running` longer than `older_than_minutes`, oldest first.
/// Consumed by the stuck-item sweep.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stuck_running(
    pool: &PgPool,
    older_than_minutes: i32,
) -> Result<Vec<ContentItemRow>, DbError> {
    let rows = sqlx::query_as::<_, ContentItemRow>(&format!(
        "SELECT {COLUMNS} FROM content_items \
         WHERE state = 'running' \
           AND updated_at < NOW() - make_interval(mins => $1) \
         ORDER BY updated_at",
    ))
    .bind(older_than_minutes)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
