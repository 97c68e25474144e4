//! Database operations for the `user_interests` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Categories the user marked with the `now` horizon.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn now_categories(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>, DbError> {
    let categories = sqlx::query_scalar::<_, String>(
        "SELECT category FROM user_interests WHERE user_id = $1 AND horizon = 'now'",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Replaces a user's interest set for one horizon in a single transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn replace_for_horizon(
    pool: &PgPool,
    user_id: Uuid,
    horizon: &str,
    categories: &[String],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM user_interests WHERE user_id = $1 AND horizon = $2")
        .bind(user_id)
        .bind(horizon)
        .execute(&mut *tx)
        .await?;

    for category in categories {
        sqlx::query(
            "INSERT INTO user_interests (user_id, category, horizon) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, category, horizon) DO NOTHING",
        )
        .bind(user_id)
        .bind(category)
        .bind(horizon)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
