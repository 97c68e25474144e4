//! In-memory store implementing the persistence ports.
//!
//! Backs the pipeline's integration tests and local experiments; mirrors the
//! Postgres store's semantics, including the compare-and-set claim and the
//! restart-on-resubmission rule.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use stashd_core::{
    CompletedContent, ContentItem, ContentState, ContentStore, Depth, InterestStore,
    NewSubmission, Perspective, StoreError, SubmissionOutcome, UserContentLink,
};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    contents: HashMap<Uuid, ContentItem>,
    content_by_url: HashMap<String, Uuid>,
    links: HashMap<Uuid, UserContentLink>,
    now_categories: HashMap<Uuid, HashSet<String>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the categories a user currently cares about.
    pub fn set_now_categories<I, S>(&self, user_id: Uuid, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = categories.into_iter().map(Into::into).collect();
        self.lock().now_categories.insert(user_id, set);
    }

    #[must_use]
    pub fn content_for_url(&self, url: &str) -> Option<ContentItem> {
        let inner = self.lock();
        let id = inner.content_by_url.get(url)?;
        inner.contents.get(id).cloned()
    }

    #[must_use]
    pub fn link_snapshot(&self, link_id: Uuid) -> Option<UserContentLink> {
        self.lock().links.get(&link_id).cloned()
    }

    #[must_use]
    pub fn content_count(&self) -> usize {
        self.lock().contents.len()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.lock().links.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn record_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<SubmissionOutcome, StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();

        let (content_id, content_created, restarted) =
            if let Some(&id) = inner.content_by_url.get(&submission.url) {
                let item = inner
                    .contents
                    .get_mut(&id)
                    .ok_or(StoreError::NotFound)?;
                let restarted = item.state == ContentState::Failed;
                if restarted {
                    item.state = ContentState::Pending;
                    item.error_message = None;
                    item.updated_at = now;
                }
                (id, false, restarted)
            } else {
                let id = Uuid::new_v4();
                let item = ContentItem {
                    id,
                    source_domain: submission.source_domain.clone(),
                    url: submission.url.clone(),
                    title: None,
                    thumbnail_url: None,
                    category: None,
                    topic: None,
                    small_summary: None,
                    medium_summary: None,
                    summary_blocks: Vec::new(),
                    consumption_time_min: None,
                    state: ContentState::Pending,
                    error_message: None,
                    created_at: now,
                    updated_at: now,
                };
                inner.contents.insert(id, item);
                inner.content_by_url.insert(submission.url.clone(), id);
                (id, true, false)
            };

        let link = UserContentLink {
            id: Uuid::new_v4(),
            user_id: submission.user_id,
            content_item_id: content_id,
            memo: submission.memo,
            is_read: false,
            is_confirmed: false,
            depth: None,
            perspective: None,
            last_viewed_at: None,
            confirmed_at: None,
            created_at: now,
        };
        inner.links.insert(link.id, link.clone());

        let content = inner
            .contents
            .get(&content_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        Ok(SubmissionOutcome {
            link,
            content,
            content_created,
            restarted,
        })
    }

    async fn content(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.lock().contents.get(&id).cloned())
    }

    async fn claim_for_processing(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        let mut inner = self.lock();
        let Some(item) = inner.contents.get_mut(&id) else {
            return Ok(None);
        };
        if item.state != ContentState::Pending {
            return Ok(None);
        }
        item.state = ContentState::Running;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn finalize_done(
        &self,
        id: Uuid,
        completed: &CompletedContent,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let item = inner.contents.get_mut(&id).ok_or(StoreError::NotFound)?;
        if item.state != ContentState::Running {
            return Err(StoreError::IllegalTransition {
                id,
                from: item.state,
                to: ContentState::Done,
            });
        }
        item.title = Some(completed.title.clone());
        item.thumbnail_url = completed.thumbnail_url.clone();
        item.category = Some(completed.category.clone());
        item.topic = Some(completed.topic.clone());
        item.small_summary = completed.small_summary.clone();
        item.medium_summary = completed.medium_summary.clone();
        item.summary_blocks = completed.summary_blocks.clone();
        item.consumption_time_min = completed.consumption_time_min;
        item.error_message = None;
        item.state = ContentState::Done;
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn finalize_failed(&self, id: Uuid, error_message: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let item = inner.contents.get_mut(&id).ok_or(StoreError::NotFound)?;
        if item.state != ContentState::Running {
            return Err(StoreError::IllegalTransition {
                id,
                from: item.state,
                to: ContentState::Failed,
            });
        }
        item.error_message = Some(error_message.to_owned());
        item.state = ContentState::Failed;
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn links_for_content(
        &self,
        content_item_id: Uuid,
    ) -> Result<Vec<UserContentLink>, StoreError> {
        let mut links: Vec<UserContentLink> = self
            .lock()
            .links
            .values()
            .filter(|link| link.content_item_id == content_item_id)
            .cloned()
            .collect();
        links.sort_by_key(|link| link.created_at);
        Ok(links)
    }

    async fn apply_label_components(
        &self,
        link_id: Uuid,
        depth: Option<Depth>,
        perspective: Option<Perspective>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let link = inner.links.get_mut(&link_id).ok_or(StoreError::NotFound)?;
        if link.depth == depth && link.perspective == perspective {
            return Ok(false);
        }
        link.depth = depth;
        link.perspective = perspective;
        Ok(true)
    }

    async fn view_link(
        &self,
        user_id: Uuid,
        link_id: Uuid,
    ) -> Result<(UserContentLink, ContentItem), StoreError> {
        let mut inner = self.lock();
        let link = inner.links.get_mut(&link_id).ok_or(StoreError::NotFound)?;
        if link.user_id != user_id {
            return Err(StoreError::NotFound);
        }
        link.is_read = true;
        link.last_viewed_at = Some(Utc::now());
        let link = link.clone();
        let content = inner
            .contents
            .get(&link.content_item_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        Ok((link, content))
    }

    async fn confirm_link(
        &self,
        user_id: Uuid,
        link_id: Uuid,
        memo: Option<String>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let link = inner.links.get_mut(&link_id).ok_or(StoreError::NotFound)?;
        if link.user_id != user_id {
            return Err(StoreError::NotFound);
        }
        if memo.is_some() {
            link.memo = memo;
        }
        link.is_confirmed = true;
        link.confirmed_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl InterestStore for MemoryStore {
    async fn now_categories(&self, user_id: Uuid) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .lock()
            .now_categories
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(user_id: Uuid, url: &str) -> NewSubmission {
        NewSubmission {
            user_id,
            url: url.to_owned(),
            source_domain: "YouTube".to_owned(),
            memo: None,
        }
    }

    #[tokio::test]
    async fn same_url_shares_one_content_item_with_fresh_links() {
        let store = MemoryStore::new();
        let url = "https://youtube.com/watch?v=abc";
        let first = store
            .record_submission(submission(Uuid::new_v4(), url))
            .await
            .expect("first submission");
        let second = store
            .record_submission(submission(Uuid::new_v4(), url))
            .await
            .expect("second submission");

        assert!(first.content_created);
        assert!(!second.content_created);
        assert_eq!(first.content.id, second.content.id);
        assert_ne!(first.link.id, second.link.id);
        assert_eq!(store.content_count(), 1);
        assert_eq!(store.link_count(), 2);
    }

    #[tokio::test]
    async fn claim_is_single_winner() {
        let store = MemoryStore::new();
        let outcome = store
            .record_submission(submission(Uuid::new_v4(), "https://youtu.be/x"))
            .await
            .expect("submission");
        let id = outcome.content.id;

        let first = store.claim_for_processing(id).await.expect("claim");
        let second = store.claim_for_processing(id).await.expect("claim");
        assert!(first.is_some());
        assert!(second.is_none(), "second claim must lose");
    }

    #[tokio::test]
    async fn failed_item_restarts_on_resubmission() {
        let store = MemoryStore::new();
        let url = "https://youtu.be/x";
        let outcome = store
            .record_submission(submission(Uuid::new_v4(), url))
            .await
            .expect("submission");
        let id = outcome.content.id;

        store.claim_for_processing(id).await.expect("claim");
        store
            .finalize_failed(id, "upstream rejected")
            .await
            .expect("finalize");

        let again = store
            .record_submission(submission(Uuid::new_v4(), url))
            .await
            .expect("resubmission");
        assert!(again.restarted);
        assert_eq!(again.content.state, ContentState::Pending);
        assert_eq!(again.content.error_message, None);
    }

    #[tokio::test]
    async fn finalize_done_requires_running() {
        let store = MemoryStore::new();
        let outcome = store
            .record_submission(submission(Uuid::new_v4(), "https://youtu.be/x"))
            .await
            .expect("submission");
        let completed = CompletedContent {
            title: "t".to_owned(),
            thumbnail_url: None,
            category: "tech".to_owned(),
            topic: "rust".to_owned(),
            small_summary: None,
            medium_summary: None,
            summary_blocks: Vec::new(),
            consumption_time_min: Some(3),
        };

        let err = store
            .finalize_done(outcome.content.id, &completed)
            .await
            .expect_err("pending item must not finalize");
        assert!(matches!(err, StoreError::IllegalTransition { .. }));
    }
}
