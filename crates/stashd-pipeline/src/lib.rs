//! Ingestion gate, bounded dispatcher, and the content-processing state
//! machine that drives submitted URLs from `Pending` to a terminal state.

use std::sync::Arc;

use stashd_core::{ContentStore, InterestStore};
use stashd_summarizer::SummarizerClient;

pub mod dispatch;
pub mod error;
pub mod fanout;
pub mod ingest;
pub mod memory;
mod process;

pub use dispatch::{Dispatcher, DispatcherHandle, ProcessSignal};
pub use error::{DispatchError, IngestError};
pub use ingest::{IngestGate, SubmitReceipt};
pub use memory::MemoryStore;

/// Shared collaborators every pipeline stage runs against.
pub struct PipelineContext {
    pub store: Arc<dyn ContentStore>,
    pub interests: Arc<dyn InterestStore>,
    pub summarizer: SummarizerClient,
}
