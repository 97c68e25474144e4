//! Domain types and pure logic shared across the stashd workspace.
//!
//! Everything in this crate is free of I/O: content/link entities and their
//! state machine, the URL domain classifier, label math, source-domain
//! normalization, the store ports the pipeline runs against, and the
//! env-driven application configuration.

mod app_config;
pub mod classify;
mod config;
mod content;
pub mod labels;
mod links;
pub mod sources;
mod store;

pub use app_config::{AppConfig, Environment};
pub use classify::{classify, needs_crawling, ContentKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use content::{
    ClassificationOutcome, CompletedContent, ContentItem, ContentMetrics, ContentState,
    SummaryBlock,
};
pub use links::{Depth, Perspective, UserContentLink};
pub use store::{
    ContentStore, InterestStore, NewSubmission, StoreError, SubmissionOutcome,
};

use thiserror::Error;

/// Errors raised while loading [`AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
