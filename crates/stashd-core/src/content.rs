//! The shared content entity and its classification-result transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a [`ContentItem`].
///
/// Transitions are monotonic: `Pending → Running → Done` on success,
/// `Running → Failed` on exhausted retries or a permanent upstream error.
/// The only path back to `Pending` is an explicit restart of a `Failed`
/// item triggered by a fresh submission of the same URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentState {
    Pending,
    Running,
    Done,
    Failed,
}

impl ContentState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentState::Pending => "pending",
            ContentState::Running => "running",
            ContentState::Done => "done",
            ContentState::Failed => "failed",
        }
    }

    /// Parses the lowercase storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ContentState::Pending),
            "running" => Some(ContentState::Running),
            "done" => Some(ContentState::Done),
            "failed" => Some(ContentState::Failed),
            _ => None,
        }
    }

    /// `Done` and `Failed` are terminal; no worker will pick the item up again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ContentState::Done | ContentState::Failed)
    }
}

impl std::fmt::Display for ContentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ordered section of the long-form summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBlock {
    pub title: String,
    pub body: String,
}

/// Canonical record of one external URL's content and derived summary.
///
/// Deduplicated by normalized URL: created once per distinct URL by the
/// ingestion gate, mutated only by the job state machine, never deleted.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub id: Uuid,
    /// Canonical source-domain label, e.g. `YouTube` or a raw host.
    pub source_domain: String,
    pub url: String,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub topic: Option<String>,
    pub small_summary: Option<String>,
    pub medium_summary: Option<String>,
    pub summary_blocks: Vec<SummaryBlock>,
    pub consumption_time_min: Option<i32>,
    pub state: ContentState,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw per-format metrics from the summarization service.
///
/// The upstream payload is two-shaped: a video envelope carries a duration,
/// an article envelope carries a word count. Exactly one shape is present;
/// the client rejects envelopes carrying neither or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMetrics {
    Video {
        title: String,
        thumbnail_url: Option<String>,
        duration_secs: Option<i64>,
    },
    Article {
        title: String,
        thumbnail_url: Option<String>,
        word_count: Option<i64>,
    },
}

/// Transient, fully-decoded result of one summarization call.
///
/// Never persisted verbatim; [`ClassificationOutcome::into_completed`] maps
/// it into the fields applied on the `Done` transition.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub metrics: ContentMetrics,
    pub category: String,
    pub topic: String,
    pub small_summary: Option<String>,
    pub medium_summary: Option<String>,
    pub summary_blocks: Vec<SummaryBlock>,
}

/// The full field set applied atomically on the `Running → Done` transition.
#[derive(Debug, Clone)]
pub struct CompletedContent {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub topic: String,
    pub small_summary: Option<String>,
    pub medium_summary: Option<String>,
    pub summary_blocks: Vec<SummaryBlock>,
    pub consumption_time_min: Option<i32>,
}

/// Words per minute of estimated reading time.
const ARTICLE_WORDS_PER_MIN: i64 = 400;

impl ClassificationOutcome {
    /// Pure transition from a classification result to the next content state.
    ///
    /// Consumption time is derived deterministically: videos round the
    /// duration up to whole minutes, articles assume
    /// [`ARTICLE_WORDS_PER_MIN`] words per minute, also rounded up. An
    /// absent raw value leaves the consumption time unknown rather than zero.
    #[must_use]
    pub fn into_completed(self) -> CompletedContent {
        let (title, thumbnail_url, consumption_time_min) = match self.metrics {
            ContentMetrics::Video {
                title,
                thumbnail_url,
                duration_secs,
            } => {
                let minutes = duration_secs.and_then(ceil_minutes_from_secs);
                (title, thumbnail_url, minutes)
            }
            ContentMetrics::Article {
                title,
                thumbnail_url,
                word_count,
            } => {
                let minutes = word_count.and_then(ceil_minutes_from_words);
                (title, thumbnail_url, minutes)
            }
        };

        CompletedContent {
            title,
            thumbnail_url,
            category: self.category,
            topic: self.topic,
            small_summary: self.small_summary,
            medium_summary: self.medium_summary,
            summary_blocks: self.summary_blocks,
            consumption_time_min,
        }
    }
}

fn ceil_minutes_from_secs(duration_secs: i64) -> Option<i32> {
    let secs = duration_secs.max(0);
    i32::try_from(secs / 60 + i64::from(secs % 60 != 0)).ok()
}

fn ceil_minutes_from_words(word_count: i64) -> Option<i32> {
    let words = word_count.max(0);
    i32::try_from(words / ARTICLE_WORDS_PER_MIN + i64::from(words % ARTICLE_WORDS_PER_MIN != 0))
        .ok()
}
