//! [`PgStore`]: the Postgres implementation of the persistence ports.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use stashd_core::{
    CompletedContent, ContentItem, ContentState, ContentStore, Depth, InterestStore,
    NewSubmission, Perspective, StoreError, SubmissionOutcome, UserContentLink,
};

use crate::{content_items, interests, links, source_domains, DbError};

/// Postgres-backed store shared by the server and the pipeline workers.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Maps a transition refusal into the port's error, looking up the
    /// actual current state for the message.
    async fn illegal_transition(&self, id: Uuid, to: ContentState) -> StoreError {
        match content_items::find_by_id(&self.pool, id).await {
            Ok(Some(row)) => match row.into_domain() {
                Ok(item) => StoreError::IllegalTransition {
                    id,
                    from: item.state,
                    to,
                },
                Err(err) => StoreError::Backend(err.to_string()),
            },
            Ok(None) => StoreError::NotFound,
            Err(err) => StoreError::Backend(err.to_string()),
        }
    }
}

fn map_db_err(err: DbError) -> StoreError {
    match err {
        DbError::NotFound => StoreError::NotFound,
        other => StoreError::Backend(other.to_string()),
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<SubmissionOutcome, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        source_domains::ensure(&mut *tx, &submission.source_domain)
            .await
            .map_err(map_db_err)?;

        // Insert-then-refetch: losing the unique-URL race is normal, the
        // winner's row is authoritative.
        let (mut row, content_created) = match content_items::insert_pending(
            &mut *tx,
            Uuid::new_v4(),
            &submission.source_domain,
            &submission.url,
        )
        .await
        .map_err(map_db_err)?
        {
            Some(row) => (row, true),
            None => {
                let row = content_items::find_by_url(&mut *tx, &submission.url)
                    .await
                    .map_err(map_db_err)?
                    .ok_or(StoreError::NotFound)?;
                (row, false)
            }
        };

        let mut restarted = false;
        if row.state == "failed" {
            restarted = content_items::restart_failed(&mut *tx, row.id)
                .await
                .map_err(map_db_err)?;
            if restarted {
                row = content_items::find_by_id(&mut *tx, row.id)
                    .await
                    .map_err(map_db_err)?
                    .ok_or(StoreError::NotFound)?;
            }
        }

        let link_row = links::insert(
            &mut *tx,
            Uuid::new_v4(),
            submission.user_id,
            row.id,
            submission.memo.as_deref(),
        )
        .await
        .map_err(map_db_err)?;

        tx.commit()
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(SubmissionOutcome {
            link: link_row.into_domain().map_err(map_db_err)?,
            content: row.into_domain().map_err(map_db_err)?,
            content_created,
            restarted,
        })
    }

    async fn content(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        content_items::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)?
            .map(|row| row.into_domain().map_err(map_db_err))
            .transpose()
    }

    async fn claim_for_processing(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        content_items::claim_pending(&self.pool, id)
            .await
            .map_err(map_db_err)?
            .map(|row| row.into_domain().map_err(map_db_err))
            .transpose()
    }

    async fn finalize_done(
        &self,
        id: Uuid,
        completed: &CompletedContent,
    ) -> Result<(), StoreError> {
        match content_items::finalize_done(&self.pool, id, completed).await {
            Ok(()) => Ok(()),
            Err(DbError::InvalidStateTransition { .. }) => {
                Err(self.illegal_transition(id, ContentState::Done).await)
            }
            Err(err) => Err(map_db_err(err)),
        }
    }

    async fn finalize_failed(&self, id: Uuid, error_message: &str) -> Result<(), StoreError> {
        match content_items::finalize_failed(&self.pool, id, error_message).await {
            Ok(()) => Ok(()),
            Err(DbError::InvalidStateTransition { .. }) => {
                Err(self.illegal_transition(id, ContentState::Failed).await)
            }
            Err(err) => Err(map_db_err(err)),
        }
    }

    async fn links_for_content(
        &self,
        content_item_id: Uuid,
    ) -> Result<Vec<UserContentLink>, StoreError> {
        links::list_for_content(&self.pool, content_item_id)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|row| row.into_domain().map_err(map_db_err))
            .collect()
    }

    async fn apply_label_components(
        &self,
        link_id: Uuid,
        depth: Option<Depth>,
        perspective: Option<Perspective>,
    ) -> Result<bool, StoreError> {
        links::apply_label_components(
            &self.pool,
            link_id,
            depth.map(Depth::as_str),
            perspective.map(Perspective::as_str),
        )
        .await
        .map_err(map_db_err)
    }

    async fn view_link(
        &self,
        user_id: Uuid,
        link_id: Uuid,
    ) -> Result<(UserContentLink, ContentItem), StoreError> {
        let link = links::view(&self.pool, user_id, link_id)
            .await
            .map_err(map_db_err)?
            .into_domain()
            .map_err(map_db_err)?;
        let content = content_items::find_by_id(&self.pool, link.content_item_id)
            .await
            .map_err(map_db_err)?
            .ok_or(StoreError::NotFound)?
            .into_domain()
            .map_err(map_db_err)?;
        Ok((link, content))
    }

    async fn confirm_link(
        &self,
        user_id: Uuid,
        link_id: Uuid,
        memo: Option<String>,
    ) -> Result<(), StoreError> {
        links::confirm(&self.pool, user_id, link_id, memo.as_deref())
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl InterestStore for PgStore {
    async fn now_categories(&self, user_id: Uuid) -> Result<HashSet<String>, StoreError> {
        Ok(interests::now_categories(&self.pool, user_id)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .collect())
    }
}
