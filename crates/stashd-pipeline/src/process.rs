//! Worker body: claim, summarize, finalize, relabel.

use std::time::Instant;

use stashd_core::classify;

use crate::dispatch::ProcessSignal;
use crate::fanout;
use crate::PipelineContext;

/// Drives one content item through `Running` to a terminal state.
///
/// Never returns an error: every failure either lands the item in `Failed`
/// with the cause recorded on the row, or is logged when the store itself is
/// unreachable (the item then stays `Running` until the stuck-item sweep
/// flags it).
pub(crate) async fn run(ctx: &PipelineContext, signal: &ProcessSignal) {
    let content_id = signal.content_id;
    let started = Instant::now();

    let claimed = match ctx.store.claim_for_processing(content_id).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            tracing::debug!(%content_id, "item not claimable, skipping");
            return;
        }
        Err(err) => {
            tracing::error!(%content_id, error = %err, "failed to claim content item");
            return;
        }
    };

    let kind = classify::classify(&signal.url);
    tracing::info!(
        %content_id,
        source_domain = %claimed.source_domain,
        kind = %kind,
        "processing content item"
    );

    // Unknown kinds fail inside the client before any request is sent, so
    // the row carries the same wording either way.
    match ctx
        .summarizer
        .request_summary(kind, &signal.url, signal.memo.as_deref())
        .await
    {
        Ok(outcome) => {
            let completed = outcome.into_completed();
            if let Err(err) = ctx.store.finalize_done(content_id, &completed).await {
                tracing::error!(
                    %content_id,
                    error = %err,
                    "failed to persist completed content, item left running for the sweep"
                );
                return;
            }
            match fanout::relabel_content(
                ctx.store.as_ref(),
                ctx.interests.as_ref(),
                content_id,
                Some(&completed.category),
                completed.consumption_time_min,
            )
            .await
            {
                Ok(updated) => tracing::info!(
                    %content_id,
                    links_updated = updated,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "content item completed"
                ),
                Err(err) => tracing::warn!(
                    %content_id,
                    error = %err,
                    "content completed but label fan-out failed, labels recompute on next view"
                ),
            }
        }
        Err(err) => fail(ctx, content_id, &err.to_string()).await,
    }
}

async fn fail(ctx: &PipelineContext, content_id: uuid::Uuid, message: &str) {
    tracing::warn!(%content_id, error = message, "content item failed");
    if let Err(err) = ctx.store.finalize_failed(content_id, message).await {
        tracing::error!(
            %content_id,
            error = %err,
            "failed to record failure, item left running for the sweep"
        );
    }
}
