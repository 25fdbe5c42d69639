//! Change sources: producers of full-state change events.

pub mod channel;
pub mod reader;

use async_trait::async_trait;
use tokio::sync::mpsc;
use yadt_core::{ChangeEvent, ExError};

pub use channel::{ChannelSource, StaticSource};
pub use reader::ReaderSource;

/// A producer of change events
///
/// Implementations deliver one full current-state object per change and
/// never deltas. Per-identity order must be preserved; order across
/// identities is free. A full channel blocks the source.
#[async_trait]
pub trait ChangeSource: Send {
    /// Label used in logs and event contexts
    fn name(&self) -> &str;

    /// Deliver events until exhausted
    ///
    /// # Errors
    ///
    /// `ChannelClosed` if the consumer went away first; source specific
    /// errors otherwise.
    async fn run(self: Box<Self>, tx: mpsc::Sender<ChangeEvent>) -> Result<(), ExError>;
}
