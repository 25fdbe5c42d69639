//! Text rendering of structural diffs.
//!
//! Each rendered block is a header naming the resource, a rule line, one or
//! more marker-prefixed body lines and a trailing blank line. A block is
//! assembled in memory and handed to the sink with a single write, so a
//! failing or interrupted sink never sees half a block.

pub mod clock;
pub mod diff_render;
pub mod pretty;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};
pub use diff_render::DiffRenderer;

/// Width of the rule line under each header
pub const DEFAULT_RULE_WIDTH: usize = 80;

/// How a scalar replacement is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStyle {
    /// A `-` line with the old value followed by a `+` line with the new one
    #[default]
    Paired,
    /// One `~ path: old -> new` line; shape changes still print paired
    Combined,
}

/// Renderer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Emit ANSI colors
    pub color: bool,
    /// Prefix headers with a coalesced `HH:MM:SS` timestamp
    pub show_timestamp: bool,
    pub change_style: ChangeStyle,
    pub rule_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: false,
            show_timestamp: true,
            change_style: ChangeStyle::Paired,
            rule_width: DEFAULT_RULE_WIDTH,
        }
    }
}
