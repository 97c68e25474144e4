//! Ingestion gate: URL validation, dedup-aware persistence, and dispatch.

use std::sync::Arc;

use stashd_core::sources;
use stashd_core::{ContentState, NewSubmission};
use url::Url;
use uuid::Uuid;

use crate::dispatch::{DispatcherHandle, ProcessSignal};
use crate::error::IngestError;
use crate::fanout;
use crate::PipelineContext;

/// What the caller gets back from a submission: the fresh link and the
/// content item's state at that moment.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub link_id: Uuid,
    pub content_item_id: Uuid,
    pub state: ContentState,
    /// True when this submission created the content item (first sighting
    /// of the URL).
    pub content_created: bool,
}

/// Front door of the pipeline. Validates, persists, and hands `Pending`
/// items to the dispatcher.
pub struct IngestGate {
    ctx: Arc<PipelineContext>,
    dispatcher: DispatcherHandle,
}

impl IngestGate {
    #[must_use]
    pub fn new(ctx: Arc<PipelineContext>, dispatcher: DispatcherHandle) -> Self {
        Self { ctx, dispatcher }
    }

    /// Accepts one URL submission for a user.
    ///
    /// A known URL never re-runs processing: the submission gets a fresh
    /// link onto the existing content item, and a `Done` item labels that
    /// link inline. A `Failed` item is restarted at `Pending` and dispatched
    /// again. Rejects before any write when the URL does not parse or has
    /// no host.
    pub async fn submit(
        &self,
        user_id: Uuid,
        url: &str,
        memo: Option<String>,
    ) -> Result<SubmitReceipt, IngestError> {
        let trimmed = url.trim();
        let parsed =
            Url::parse(trimmed).map_err(|err| IngestError::InvalidUrl(err.to_string()))?;
        if parsed.host_str().is_none() {
            return Err(IngestError::InvalidUrl("url has no host".to_owned()));
        }

        let source_domain = sources::canonical_source_name(trimmed);
        let outcome = self
            .ctx
            .store
            .record_submission(NewSubmission {
                user_id,
                url: trimmed.to_owned(),
                source_domain,
                memo: memo.clone(),
            })
            .await?;

        let content = &outcome.content;
        tracing::info!(
            %user_id,
            content_id = %content.id,
            state = %content.state,
            created = outcome.content_created,
            restarted = outcome.restarted,
            "submission recorded"
        );

        match content.state {
            ContentState::Pending => {
                self.dispatcher.dispatch(ProcessSignal {
                    content_id: content.id,
                    url: content.url.clone(),
                    memo,
                })?;
            }
            ContentState::Done => {
                // The shared item is already classified; only the fresh
                // link needs its label components.
                fanout::relabel_link(
                    self.ctx.store.as_ref(),
                    self.ctx.interests.as_ref(),
                    &outcome.link,
                    content.category.as_deref(),
                    content.consumption_time_min,
                )
                .await?;
            }
            ContentState::Running | ContentState::Failed => {
                // Running: a worker owns it and will fan out to this link
                // on completion. Failed is unreachable here because the
                // store restarts failed items inside record_submission.
            }
        }

        Ok(SubmitReceipt {
            link_id: outcome.link.id,
            content_item_id: content.id,
            state: content.state,
            content_created: outcome.content_created,
        })
    }
}
