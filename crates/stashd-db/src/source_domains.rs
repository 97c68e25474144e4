//! Database operations for the `source_domains` registry.

use crate::DbError;

/// Registers a canonical source-domain name, ignoring duplicates. Two
/// submissions racing on the same new domain both succeed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn ensure(executor: impl sqlx::PgExecutor<'_>, name: &str) -> Result<(), DbError> {
    sqlx::query("INSERT INTO source_domains (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(executor)
        .await?;

    Ok(())
}
