//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_EVENT_ID: &str = "event_id";

// Resource identifiers
pub const FIELD_RESOURCE: &str = "resource";
pub const FIELD_SOURCE: &str = "source";

// Diff results
pub const FIELD_OUTCOME: &str = "outcome";
pub const FIELD_NODE_COUNT: &str = "node_count";
pub const FIELD_CACHE_LEN: &str = "cache_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
