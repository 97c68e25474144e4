//! Bounded worker pool with single-flight deduplication.
//!
//! Signals for content already queued or in flight are merged instead of
//! enqueued twice; the store's `Pending → Running` compare-and-set remains
//! the authoritative guard, this set just keeps duplicates out of the queue.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::process;
use crate::PipelineContext;

/// One unit of processing work: everything the worker needs without a
/// read-back of the submission row.
#[derive(Debug, Clone)]
pub struct ProcessSignal {
    pub content_id: Uuid,
    pub url: String,
    /// Submitter's memo, forwarded to article summarization as a hint.
    pub memo: Option<String>,
}

/// Cheap, cloneable enqueue handle.
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<ProcessSignal>,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl DispatcherHandle {
    /// Enqueues a signal without blocking.
    ///
    /// Returns `Ok` immediately when the content item is already queued or
    /// being processed (the duplicate is merged). A full queue is rejected
    /// with [`DispatchError::Busy`].
    pub fn dispatch(&self, signal: ProcessSignal) -> Result<(), DispatchError> {
        let content_id = signal.content_id;
        {
            let mut in_flight = self.in_flight.lock().expect("in-flight set poisoned");
            if !in_flight.insert(content_id) {
                tracing::debug!(%content_id, "merged duplicate process signal");
                return Ok(());
            }
        }

        match self.tx.try_send(signal) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.in_flight
                    .lock()
                    .expect("in-flight set poisoned")
                    .remove(&content_id);
                match err {
                    mpsc::error::TrySendError::Full(_) => {
                        tracing::warn!(%content_id, "process queue full, rejecting signal");
                        Err(DispatchError::Busy)
                    }
                    mpsc::error::TrySendError::Closed(_) => Err(DispatchError::Closed),
                }
            }
        }
    }
}

/// Owns the worker tasks. On [`Dispatcher::shutdown`] workers finish the
/// item they are on and exit; queued-but-unstarted signals are dropped and
/// their items stay `Pending` until resubmitted.
pub struct Dispatcher {
    handle: DispatcherHandle,
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawns `workers` tasks sharing one bounded queue of `queue_capacity`.
    #[must_use]
    pub fn start(ctx: Arc<PipelineContext>, workers: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<ProcessSignal>(queue_capacity.max(1));
        let (shutdown_tx, _) = watch::channel(false);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let in_flight = Arc::new(Mutex::new(HashSet::new()));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let ctx = Arc::clone(&ctx);
                let rx = Arc::clone(&rx);
                let in_flight = Arc::clone(&in_flight);
                let mut shutdown_rx = shutdown_tx.subscribe();
                tokio::spawn(async move {
                    loop {
                        let signal = tokio::select! {
                            signal = async { rx.lock().await.recv().await } => signal,
                            _ = shutdown_rx.changed() => {
                                tracing::debug!(worker, "shutdown requested, worker exiting");
                                break;
                            }
                        };
                        let Some(signal) = signal else {
                            break;
                        };
                        let content_id = signal.content_id;
                        process::run(&ctx, &signal).await;
                        in_flight
                            .lock()
                            .expect("in-flight set poisoned")
                            .remove(&content_id);
                    }
                })
            })
            .collect();

        Self {
            handle: DispatcherHandle { tx, in_flight },
            shutdown_tx,
            workers: handles,
        }
    }

    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Signals the workers to stop and waits for them. The item a worker is
    /// processing runs to completion.
    pub async fn shutdown(self) {
        drop(self.handle);
        let _ = self.shutdown_tx.send(true);
        for worker in self.workers {
            if let Err(err) = worker.await {
                tracing::error!(error = %err, "dispatch worker panicked");
            }
        }
    }
}
