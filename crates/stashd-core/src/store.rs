//! Store ports the pipeline runs against.
//!
//! Two backends implement these traits: the Postgres store in `stashd-db`
//! (production) and the in-memory store in `stashd-pipeline` (tests). Both
//! must uphold the same semantics: atomic submission writes, monotonic state
//! transitions, and a compare-and-set `Pending → Running` claim that doubles
//! as the cross-worker mutual-exclusion gate.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::content::{CompletedContent, ContentItem, ContentState};
use crate::links::{Depth, Perspective, UserContentLink};

/// Everything the ingestion gate persists for one submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    /// Already validated and trimmed by the gate.
    pub url: String,
    /// Canonical source-domain label derived from the URL.
    pub source_domain: String,
    pub memo: Option<String>,
}

/// Result of recording one submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// The freshly created link — always new, even for a known URL.
    pub link: UserContentLink,
    /// The shared content item, post-restart if one happened.
    pub content: ContentItem,
    /// True when this submission created the content item.
    pub content_created: bool,
    /// True when a `Failed` item was reset to `Pending` by this submission.
    pub restarted: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("illegal state transition for content {id}: {from} -> {to}")]
    IllegalTransition {
        id: Uuid,
        from: ContentState,
        to: ContentState,
    },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence port for content items and user links.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Records one submission atomically: get-or-create the source domain,
    /// find the content item by URL or create it at `Pending`, restart a
    /// `Failed` item at `Pending`, and always insert a fresh link for the
    /// submitting user.
    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<SubmissionOutcome, StoreError>;

    async fn content(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    /// Compare-and-set `Pending → Running`.
    ///
    /// Returns the claimed item, or `None` when the item is not `Pending` —
    /// which means another worker already owns it (or it is terminal) and
    /// the caller must not process it.
    async fn claim_for_processing(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    /// Applies a classification result and moves `Running → Done` in one
    /// atomic write.
    async fn finalize_done(
        &self,
        id: Uuid,
        completed: &CompletedContent,
    ) -> Result<(), StoreError>;

    /// Records the failure message and moves `Running → Failed` atomically.
    async fn finalize_failed(&self, id: Uuid, error_message: &str) -> Result<(), StoreError>;

    async fn links_for_content(
        &self,
        content_item_id: Uuid,
    ) -> Result<Vec<UserContentLink>, StoreError>;

    /// Writes both label components on a link. Idempotent: returns `false`
    /// (and touches nothing) when the stored components already match.
    async fn apply_label_components(
        &self,
        link_id: Uuid,
        depth: Option<Depth>,
        perspective: Option<Perspective>,
    ) -> Result<bool, StoreError>;

    /// Fetches a link with its content, marking `is_read`/`last_viewed_at`
    /// as a side effect (read-side concern, not pipeline-owned fields).
    async fn view_link(
        &self,
        user_id: Uuid,
        link_id: Uuid,
    ) -> Result<(UserContentLink, ContentItem), StoreError>;

    /// Confirms the classification for a link, optionally replacing the memo.
    async fn confirm_link(
        &self,
        user_id: Uuid,
        link_id: Uuid,
        memo: Option<String>,
    ) -> Result<(), StoreError>;
}

/// User-preference collaborator: the categories a user currently cares about.
#[async_trait]
pub trait InterestStore: Send + Sync {
    async fn now_categories(&self, user_id: Uuid) -> Result<HashSet<String>, StoreError>;
}
