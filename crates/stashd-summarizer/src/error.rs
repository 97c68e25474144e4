use stashd_core::ContentKind;
use thiserror::Error;

/// Errors returned by the summarizer client.
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The summarizer returned a 5xx status; transient, retried.
    #[error("summarizer unavailable (HTTP {status})")]
    UpstreamUnavailable { status: u16 },

    /// The summarizer rejected the request with a 4xx status; never retried.
    /// Status and body are preserved verbatim for diagnostics.
    #[error("summarizer rejected request (HTTP {status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but violated the envelope contract (e.g. carried
    /// neither or both of the video/article metric shapes).
    #[error("invalid summarizer envelope: {0}")]
    InvalidEnvelope(String),

    /// The caller asked for a content kind no endpoint exists for. Caller
    /// error — no request is made and nothing is retried.
    #[error("unsupported domain type: {0}")]
    UnsupportedKind(ContentKind),
}
