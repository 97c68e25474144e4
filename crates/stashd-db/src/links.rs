//! Database operations for the `user_content_links` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stashd_core::{Depth, Perspective, UserContentLink};

use crate::DbError;

const COLUMNS: &str = "id, user_id, content_item_id, memo, is_read, is_confirmed, \
                       depth, perspective, last_viewed_at, confirmed_at, created_at";

/// A row from the `user_content_links` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserContentLinkRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_item_id: Uuid,
    pub memo: Option<String>,
    pub is_read: bool,
    pub is_confirmed: bool,
    pub depth: Option<String>,
    pub perspective: Option<String>,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserContentLinkRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] when `depth` or `perspective` hold
    /// values outside the CHECK-constrained sets.
    pub fn into_domain(self) -> Result<UserContentLink, DbError> {
        let depth = self
            .depth
            .as_deref()
            .map(|value| {
                Depth::parse(value).ok_or_else(|| {
                    DbError::InvalidColumn(format!("link {} depth '{value}'", self.id))
                })
            })
            .transpose()?;
        let perspective = self
            .perspective
            .as_deref()
            .map(|value| {
                Perspective::parse(value).ok_or_else(|| {
                    DbError::InvalidColumn(format!("link {} perspective '{value}'", self.id))
                })
            })
            .transpose()?;
        Ok(UserContentLink {
            id: self.id,
            user_id: self.user_id,
            content_item_id: self.content_item_id,
            memo: self.memo,
            is_read: self.is_read,
            is_confirmed: self.is_confirmed,
            depth,
            perspective,
            last_viewed_at: self.last_viewed_at,
            confirmed_at: self.confirmed_at,
            created_at: self.created_at,
        })
    }
}

/// Inserts a fresh link. Always a new row: resubmitting a known URL gives
/// the user a second link onto the same content item.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
    user_id: Uuid,
    content_item_id: Uuid,
    memo: Option<&str>,
) -> Result<UserContentLinkRow, DbError> {
    let row = sqlx::query_as::<_, UserContentLinkRow>(&format!(
        "INSERT INTO user_content_links (id, user_id, content_item_id, memo) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(content_item_id)
    .bind(memo)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_for_content(
    pool: &PgPool,
    content_item_id: Uuid,
) -> Result<Vec<UserContentLinkRow>, DbError> {
    let rows = sqlx::query_as::<_, UserContentLinkRow>(&format!(
        "SELECT {COLUMNS} FROM user_content_links \
         WHERE content_item_id = $1 \
         ORDER BY created_at",
    ))
    .bind(content_item_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Writes both label components, skipping the write when the stored values
/// already match. Returns `true` when a row changed.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the link does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn apply_label_components(
    pool: &PgPool,
    link_id: Uuid,
    depth: Option<&str>,
    perspective: Option<&str>,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE user_content_links \
         SET depth = $1, perspective = $2 \
         WHERE id = $3 \
           AND (depth IS DISTINCT FROM $1 OR perspective IS DISTINCT FROM $2)",
    )
    .bind(depth)
    .bind(perspective)
    .bind(link_id)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    // Zero rows is ambiguous: unchanged or missing.
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM user_content_links WHERE id = $1)",
    )
    .bind(link_id)
    .fetch_one(pool)
    .await?;
    if exists {
        Ok(false)
    } else {
        Err(DbError::NotFound)
    }
}

/// Fetches a user's link, marking it read and stamping `last_viewed_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the link does not exist or belongs to
/// another user, or [`DbError::Sqlx`] if the update fails.
pub async fn view(
    pool: &PgPool,
    user_id: Uuid,
    link_id: Uuid,
) -> Result<UserContentLinkRow, DbError> {
    let row = sqlx::query_as::<_, UserContentLinkRow>(&format!(
        "UPDATE user_content_links \
         SET is_read = TRUE, last_viewed_at = NOW() \
         WHERE id = $1 AND user_id = $2 \
         RETURNING {COLUMNS}",
    ))
    .bind(link_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Confirms the classification for a user's link, optionally replacing the
/// memo.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the link does not exist or belongs to
/// another user, or [`DbError::Sqlx`] if the update fails.
pub async fn confirm(
    pool: &PgPool,
    user_id: Uuid,
    link_id: Uuid,
    memo: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE user_content_links \
         SET memo = COALESCE($1, memo), is_confirmed = TRUE, confirmed_at = NOW() \
         WHERE id = $2 AND user_id = $3",
    )
    .bind(memo)
    .bind(link_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
