//! The single consumer draining the delivery channel into the engine.

use std::future::Future;
use std::io::Write;

use tokio::sync::mpsc;
use yadt_core::{log_op_end, log_op_start, ChangeEvent, DiffEngine, ExError, Outcome};

/// What to do when an event fails for a reason other than bad input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Report and keep consuming
    #[default]
    Continue,
    /// Stop at the first such failure
    Abort,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// Every producer finished and the channel drained
    #[default]
    SourcesExhausted,
    /// The shutdown future completed
    Shutdown,
    /// An event failed under [`ErrorPolicy::Abort`]
    Aborted,
}

/// Counters for one run of the loop
#[derive(Debug, Default)]
pub struct LoopReport {
    /// Events taken off the channel
    pub received: u64,
    /// Events that wrote a block
    pub rendered: u64,
    /// Events with no visible change
    pub suppressed: u64,
    /// Events dropped because their object could not be normalized
    pub skipped: u64,
    /// Events that failed for any other reason
    pub failed: u64,
    pub stop: StopReason,
    /// The failure that aborted the loop
    pub error: Option<ExError>,
}

impl LoopReport {
    fn record(&mut self, outcome: &Outcome) {
        if outcome.rendered() {
            self.rendered += 1;
        } else {
            self.suppressed += 1;
        }
    }
}

/// Drain `rx` into `engine` until the sources are exhausted, `shutdown`
/// completes, or a failure aborts the loop under `policy`.
///
/// Events are processed strictly one at a time. Shutdown is checked before
/// each event is taken, so no event starts after it fires while the one in
/// flight always completes. Malformed objects are skipped regardless of
/// policy. The receiver is closed on return so blocked producers wake up.
pub async fn run_loop<W, F>(
    engine: &mut DiffEngine<W>,
    mut rx: mpsc::Receiver<ChangeEvent>,
    shutdown: F,
    policy: ErrorPolicy,
) -> LoopReport
where
    W: Write,
    F: Future<Output = ()>,
{
    log_op_start!("consume", policy = ?policy);
    let start = std::time::Instant::now();
    let mut report = LoopReport::default();
    tokio::pin!(shutdown);

    loop {
        let event = tokio::select! {
            biased;
            _ = &mut shutdown => {
                report.stop = StopReason::Shutdown;
                break;
            }
            event = rx.recv() => match event {
                Some(event) => event,
                None => {
                    report.stop = StopReason::SourcesExhausted;
                    break;
                }
            },
        };

        report.received += 1;
        match engine.process(event) {
            Ok(outcome) => report.record(&outcome),
            Err(e) if e.kind().is_input_error() => {
                report.skipped += 1;
                tracing::warn!(error = %e, "skipping malformed event");
            }
            Err(e) => {
                report.failed += 1;
                if policy == ErrorPolicy::Abort {
                    report.stop = StopReason::Aborted;
                    report.error = Some(e);
                    break;
                }
            }
        }
    }

    rx.close();
    log_op_end!(
        "consume",
        duration_ms = start.elapsed().as_millis() as u64,
        stop = ?report.stop,
        received = report.received,
        rendered = report.rendered,
        suppressed = report.suppressed,
        skipped = report.skipped,
        failed = report.failed
    );
    report
}
