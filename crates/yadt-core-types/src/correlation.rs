//! Correlation types for event tracking and tracing
//!
//! Every snapshot delivered by a change source carries an [`EventContext`]
//! so that log lines emitted while the event is diffed and rendered can be
//! tied back to the delivery that produced them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single delivered change event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Generate a new random EventId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried by one delivered event for correlation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub event_id: EventId,
    /// Name of the change source that produced the event
    pub source: Option<String>,
}

impl EventContext {
    /// Create a new context with a fresh EventId
    pub fn new() -> Self {
        Self {
            event_id: EventId::new(),
            source: None,
        }
    }

    /// Record which source delivered the event
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::new()
    }
}
