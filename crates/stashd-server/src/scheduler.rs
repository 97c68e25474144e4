//! Background job scheduler.
//!
//! Registers the stuck-item sweep: a cron job that flags content items
//! sitting in `running` past the configured threshold. The sweep only
//! reports; recovery stays an operator decision because a long-running
//! summarization and a crashed worker look identical from the database.

use std::sync::Arc;

use sqlx::PgPool;
use stashd_core::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised or
/// started, or when the configured cron expression is invalid.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_stuck_sweep_job(&scheduler, pool, config).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_stuck_sweep_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let cron = config.stuck_sweep_cron.clone();
    let pool = Arc::new(pool);

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let stuck_after_minutes = config.stuck_after_minutes;

        Box::pin(async move {
            run_stuck_sweep(&pool, stuck_after_minutes).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered stuck-item sweep");
    Ok(())
}

/// Logs every item stuck in `running` longer than the threshold.
async fn run_stuck_sweep(pool: &PgPool, stuck_after_minutes: i64) {
    let threshold = i32::try_from(stuck_after_minutes).unwrap_or(i32::MAX);
    let stuck = match stashd_db::content_items::list_stuck_running(pool, threshold).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: stuck-item sweep query failed");
            return;
        }
    };

    if stuck.is_empty() {
        tracing::debug!("scheduler: stuck-item sweep found nothing");
        return;
    }

    tracing::warn!(count = stuck.len(), "scheduler: found stuck content items");
    for item in &stuck {
        tracing::warn!(
            content_id = %item.id,
            url = %item.url,
            running_since = %item.updated_at,
            "scheduler: content item stuck in running"
        );
    }
}
