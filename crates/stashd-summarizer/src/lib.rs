//! HTTP client for the external summarization/classification service.
//!
//! Wraps `reqwest` with the error taxonomy the pipeline relies on: transient
//! failures (network, 5xx) are retried with exponential back-off inside
//! [`SummarizerClient::request_summary`]; 4xx responses fail immediately with
//! the upstream status and body preserved; an unsupported content kind fails
//! before any network call.

mod client;
mod error;
mod retry;
mod types;

pub use client::SummarizerClient;
pub use error::SummarizerError;
