//! Fan-in of change sources into one bounded delivery channel.

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use yadt_core::errors::ExErrorKind;
use yadt_core::{log_op_end, log_op_error, log_op_start, ChangeEvent, ExError};

use crate::source::ChangeSource;

/// Delivery channel capacity used when none is configured
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// How one source ended
#[derive(Debug)]
pub struct SourceExit {
    pub name: String,
    pub result: Result<(), ExError>,
}

/// Handles to the spawned producer tasks
#[derive(Debug)]
pub struct Producers {
    handles: Vec<(String, JoinHandle<Result<(), ExError>>)>,
}

impl Producers {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancel every producer that is still running
    ///
    /// Producers parked on a blocking read are detached rather than
    /// interrupted; they stop at their next delivery attempt.
    pub fn abort_all(&self) {
        for (_, handle) in &self.handles {
            handle.abort();
        }
    }

    /// Wait for every producer and collect how each one ended
    pub async fn join(self) -> Vec<SourceExit> {
        let (names, handles): (Vec<_>, Vec<_>) = self.handles.into_iter().unzip();
        let results = join_all(handles).await;

        names
            .into_iter()
            .zip(results)
            .map(|(name, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    Err(ExError::new(ExErrorKind::Internal)
                        .with_op("join_source")
                        .with_resource(name.as_str())
                        .with_message(e.to_string()))
                });
                SourceExit { name, result }
            })
            .collect()
    }
}

/// Spawn every source as its own task feeding one bounded channel
///
/// The channel closes once all sources have finished. A full channel
/// blocks producers; events are never dropped. Must be called from within
/// a Tokio runtime.
pub fn spawn_sources(
    sources: Vec<Box<dyn ChangeSource>>,
    capacity: usize,
) -> (mpsc::Receiver<ChangeEvent>, Producers) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handles = sources
        .into_iter()
        .map(|source| {
            let name = source.name().to_string();
            let task_name = name.clone();
            let tx = tx.clone();
            let handle = tokio::spawn(async move {
                log_op_start!("run_source", source = %task_name);
                let start = std::time::Instant::now();

                let result = source.run(tx).await;
                let duration_ms = start.elapsed().as_millis() as u64;
                match &result {
                    Ok(()) => {
                        log_op_end!("run_source", duration_ms = duration_ms, source = %task_name);
                    }
                    Err(e) if e.kind() == ExErrorKind::ChannelClosed => {
                        tracing::debug!(
                            source = %task_name,
                            "consumer stopped before source finished"
                        );
                    }
                    Err(e) => {
                        log_op_error!(
                            "run_source",
                            e.clone(),
                            duration_ms = duration_ms,
                            source = %task_name
                        );
                    }
                }
                result
            });
            (name, handle)
        })
        .collect();

    (rx, Producers { handles })
}
