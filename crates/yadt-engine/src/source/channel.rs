use async_trait::async_trait;
use tokio::sync::mpsc;
use yadt_core::errors::ExErrorKind;
use yadt_core::{ChangeEvent, ExError};

use super::ChangeSource;

fn channel_closed(source: &str) -> ExError {
    ExError::new(ExErrorKind::ChannelClosed)
        .with_op("deliver_event")
        .with_resource(source)
        .with_message("delivery channel closed")
}

/// Source fed programmatically through an mpsc sender
///
/// Ends when every sender handle is dropped.
#[derive(Debug)]
pub struct ChannelSource {
    name: String,
    rx: mpsc::Receiver<ChangeEvent>,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Sender<ChangeEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                name: name.into(),
                rx,
            },
            tx,
        )
    }
}

#[async_trait]
impl ChangeSource for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(mut self: Box<Self>, tx: mpsc::Sender<ChangeEvent>) -> Result<(), ExError> {
        while let Some(event) = self.rx.recv().await {
            tx.send(event)
                .await
                .map_err(|_| channel_closed(&self.name))?;
        }
        Ok(())
    }
}

/// Source that delivers a fixed list of events in order
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    events: Vec<ChangeEvent>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, events: Vec<ChangeEvent>) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }
}

#[async_trait]
impl ChangeSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(self: Box<Self>, tx: mpsc::Sender<ChangeEvent>) -> Result<(), ExError> {
        let StaticSource { name, events } = *self;
        for event in events {
            let context = event.context.clone().with_source(name.as_str());
            let event = event.with_context(context);
            tx.send(event).await.map_err(|_| channel_closed(&name))?;
        }
        Ok(())
    }
}
