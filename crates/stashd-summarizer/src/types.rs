//! Wire types for the summarizer response envelope.
//!
//! The upstream payload is two-shaped: a `video_info` envelope for videos, an
//! `article_info` envelope for crawled pages, always alongside an `analysis`
//! block. Decoding maps it into the closed [`ContentMetrics`] sum type so the
//! rest of the system can match exhaustively instead of probing two optional
//! fields ad hoc.

use serde::{Deserialize, Serialize};
use stashd_core::{ClassificationOutcome, ContentMetrics, SummaryBlock};

use crate::error::SummarizerError;

#[derive(Debug, Serialize)]
pub(crate) struct VideoRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ArticleRequest<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryEnvelope {
    #[serde(default)]
    video_info: Option<VideoInfo>,
    #[serde(default)]
    article_info: Option<ArticleInfo>,
    analysis: Analysis,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
    /// Seconds.
    #[serde(default)]
    duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ArticleInfo {
    title: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    word_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Analysis {
    category: String,
    topic: String,
    #[serde(default)]
    small_card_summary: Option<String>,
    #[serde(default)]
    medium_card_summary: Option<String>,
    #[serde(default)]
    summaries: Vec<WireSummaryBlock>,
}

#[derive(Debug, Deserialize)]
struct WireSummaryBlock {
    title: String,
    content: String,
}

impl SummaryEnvelope {
    /// Converts the wire envelope into a [`ClassificationOutcome`].
    ///
    /// Exactly one of `video_info`/`article_info` must be present.
    pub(crate) fn into_outcome(self) -> Result<ClassificationOutcome, SummarizerError> {
        let metrics = match (self.video_info, self.article_info) {
            (Some(video), None) => ContentMetrics::Video {
                title: video.title,
                thumbnail_url: video.thumbnail_url,
                duration_secs: video.duration,
            },
            (None, Some(article)) => ContentMetrics::Article {
                title: article.title,
                thumbnail_url: article.thumbnail_url,
                word_count: article.word_count,
            },
            (Some(_), Some(_)) => {
                return Err(SummarizerError::InvalidEnvelope(
                    "both video_info and article_info present".to_owned(),
                ))
            }
            (None, None) => {
                return Err(SummarizerError::InvalidEnvelope(
                    "neither video_info nor article_info present".to_owned(),
                ))
            }
        };

        let summary_blocks = self
            .analysis
            .summaries
            .into_iter()
            .map(|block| SummaryBlock {
                title: block.title,
                body: block.content,
            })
            .collect();

        Ok(ClassificationOutcome {
            metrics,
            category: self.analysis.category,
            topic: self.analysis.topic,
            small_summary: self.analysis.small_card_summary,
            medium_summary: self.analysis.medium_card_summary,
            summary_blocks,
        })
    }
}
