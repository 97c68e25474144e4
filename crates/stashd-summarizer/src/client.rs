//! The summarizer HTTP client.

use std::time::Duration;

use reqwest::{Client, Url};
use stashd_core::{needs_crawling, AppConfig, ClassificationOutcome, ContentKind};

use crate::error::SummarizerError;
use crate::retry::retry_with_backoff;
use crate::types::{ArticleRequest, SummaryEnvelope, VideoRequest};

const VIDEO_ENDPOINT: &str = "api/v1/summarize/video";
const ARTICLE_ENDPOINT: &str = "api/v1/summarize/article";

/// Client for the summarization/classification service.
///
/// Holds the HTTP client and retry policy. Use [`SummarizerClient::from_config`]
/// in production or [`SummarizerClient::new`] to point at a mock server in
/// tests.
pub struct SummarizerClient {
    client: Client,
    base_url: Url,
    max_attempts: u32,
    backoff_base_ms: u64,
}

impl SummarizerClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError`] if the HTTP client cannot be built or the
    /// base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, SummarizerError> {
        Self::new(
            &config.summarizer_url,
            config.summary_connect_timeout_secs,
            config.summary_response_timeout_secs,
            config.summary_max_attempts,
            config.summary_backoff_base_ms,
        )
    }

    /// Creates a client with explicit settings.
    ///
    /// The connect timeout is kept short; the total response timeout is the
    /// long one, because the upstream LLM call can run for minutes.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SummarizerError::InvalidEnvelope`] if
    /// `base_url` is not a valid URL.
    pub fn new(
        base_url: &str,
        connect_timeout_secs: u64,
        response_timeout_secs: u64,
        max_attempts: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SummarizerError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(response_timeout_secs))
            .user_agent("stashd/0.1 (content-summarization)")
            .build()?;

        // Normalise: the base URL must end with exactly one slash so joined
        // endpoint paths land under it rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            SummarizerError::InvalidEnvelope(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            max_attempts,
            backoff_base_ms,
        })
    }

    /// Requests a summary for `url`, using the endpoint variant selected by
    /// `kind`.
    ///
    /// Transient failures are retried with back-off inside this call; the
    /// returned error is the final one after the attempt budget.
    ///
    /// # Errors
    ///
    /// - [`SummarizerError::UnsupportedKind`] for kinds with no endpoint —
    ///   returned before any network I/O.
    /// - [`SummarizerError::UpstreamRejected`] on 4xx (status/body preserved).
    /// - [`SummarizerError::UpstreamUnavailable`] / [`SummarizerError::Http`]
    ///   once transient retries are exhausted.
    /// - [`SummarizerError::Deserialize`] / [`SummarizerError::InvalidEnvelope`]
    ///   if the response does not match the expected shape.
    pub async fn request_summary(
        &self,
        kind: ContentKind,
        url: &str,
        memo: Option<&str>,
    ) -> Result<ClassificationOutcome, SummarizerError> {
        let endpoint = if kind == ContentKind::Video {
            VIDEO_ENDPOINT
        } else if needs_crawling(kind) {
            ARTICLE_ENDPOINT
        } else {
            return Err(SummarizerError::UnsupportedKind(kind));
        };

        let body = if endpoint == VIDEO_ENDPOINT {
            serde_json::to_value(VideoRequest { url })
        } else {
            serde_json::to_value(ArticleRequest { url, memo })
        }
        .map_err(|e| SummarizerError::Deserialize {
            context: format!("encode request for {endpoint}"),
            source: e,
        })?;

        retry_with_backoff(self.max_attempts, self.backoff_base_ms, || {
            self.call_once(endpoint, &body)
        })
        .await
    }

    /// One POST attempt: send, classify the status, decode the envelope.
    async fn call_once(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<ClassificationOutcome, SummarizerError> {
        let url = self.base_url.join(endpoint).map_err(|e| {
            SummarizerError::InvalidEnvelope(format!("invalid endpoint '{endpoint}': {e}"))
        })?;

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();

        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::UpstreamRejected {
                status: status.as_u16(),
                body,
            });
        }
        if status.is_server_error() {
            return Err(SummarizerError::UpstreamUnavailable {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let envelope: SummaryEnvelope =
            serde_json::from_str(&text).map_err(|e| SummarizerError::Deserialize {
                context: endpoint.to_owned(),
                source: e,
            })?;
        envelope.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SummarizerClient {
        SummarizerClient::new(base_url, 5, 5, 1, 0)
            .expect("client construction should not fail")
    }

    #[test]
    fn base_url_gains_exactly_one_trailing_slash() {
        let client = test_client("http://localhost:8000");
        assert_eq!(client.base_url.as_str(), "http://localhost:8000/");

        let client = test_client("http://localhost:8000///");
        assert_eq!(client.base_url.as_str(), "http://localhost:8000/");
    }

    #[tokio::test]
    async fn unknown_kind_fails_without_any_request() {
        let client = test_client("http://127.0.0.1:9"); // nothing listens here
        let result = client
            .request_summary(ContentKind::Unknown, "https://example.com", None)
            .await;
        assert!(matches!(
            result,
            Err(SummarizerError::UnsupportedKind(ContentKind::Unknown))
        ));
    }
}
