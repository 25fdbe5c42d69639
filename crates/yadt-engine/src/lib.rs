//! Async delivery plumbing around the diff engine
//!
//! Change sources run as independent producers and are merged into one
//! bounded channel; a single consumer drains it into a
//! [`yadt_core::DiffEngine`]. See [`consumer::run_loop`].

pub mod consumer;
pub mod pipeline;
pub mod source;

pub use consumer::{run_loop, ErrorPolicy, LoopReport, StopReason};
pub use pipeline::{spawn_sources, Producers, SourceExit, DEFAULT_CHANNEL_CAPACITY};
pub use source::{ChangeSource, ChannelSource, ReaderSource, StaticSource};
