use std::io::Write;

use chrono::{DateTime, Local};
use colored::{Color, Colorize};

use crate::diff::{diff_mappings, Change, DiffNode, Path};
use crate::errors::Result;
use crate::model::{Document, Mapping, ResourceIdentity};
use crate::render::clock::{Clock, SystemClock};
use crate::render::pretty::block_lines;
use crate::render::{ChangeStyle, RenderOptions};

const TIMESTAMP_FORMAT: &str = "%H:%M:%S ";

/// Headers within this window of the last stamped header carry no timestamp
const TIMESTAMP_COALESCE_MS: i64 = 1000;

#[derive(Debug, Clone, Copy)]
enum Marker {
    Added,
    Removed,
    Modified,
}

impl Marker {
    fn symbol(self) -> char {
        match self {
            Marker::Added => '+',
            Marker::Removed => '-',
            Marker::Modified => '~',
        }
    }

    fn color(self) -> Color {
        match self {
            Marker::Added => Color::Green,
            Marker::Removed => Color::Red,
            Marker::Modified => Color::Yellow,
        }
    }
}

/// Turns diff nodes into annotated text blocks
pub struct DiffRenderer {
    options: RenderOptions,
    clock: Box<dyn Clock>,
    last_timestamp: Option<DateTime<Local>>,
}

impl std::fmt::Debug for DiffRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffRenderer")
            .field("options", &self.options)
            .field("last_timestamp", &self.last_timestamp)
            .finish_non_exhaustive()
    }
}

impl DiffRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self::with_clock(options, SystemClock)
    }

    /// Build a renderer reading header time from `clock`
    pub fn with_clock(options: RenderOptions, clock: impl Clock + 'static) -> Self {
        Self {
            options,
            clock: Box::new(clock),
            last_timestamp: None,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a block for a list of changes. An empty list renders nothing.
    ///
    /// # Errors
    ///
    /// `Output` if the sink rejects the write, `Serialization` if a value
    /// cannot be formatted.
    pub fn render_changes<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        identity: &ResourceIdentity,
        nodes: &[DiffNode],
    ) -> Result<()> {
        if nodes.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        self.push_header(&mut buf, identity);
        for node in nodes {
            self.push_node(&mut buf, node)?;
        }
        buf.push('\n');

        write_block(out, &buf)
    }

    /// Render a deletion block: a marker line followed by the removal of
    /// every section of the last known working copy.
    ///
    /// # Errors
    ///
    /// `Output` if the sink rejects the write.
    pub fn render_removed<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        identity: &ResourceIdentity,
        last: &Mapping,
    ) -> Result<()> {
        let mut buf = String::new();
        self.push_header(&mut buf, identity);
        self.push_line(&mut buf, Marker::Removed, "resource deleted");
        for node in diff_mappings(last, &Mapping::new()) {
            self.push_node(&mut buf, &node)?;
        }
        buf.push('\n');

        write_block(out, &buf)
    }

    fn push_header(&mut self, buf: &mut String, identity: &ResourceIdentity) {
        if let Some(stamp) = self.next_timestamp() {
            buf.push_str(&stamp);
        }

        let title = format!(
            "diff {} {}",
            identity.header_resource(),
            identity.qualified_name()
        );
        buf.push_str(&self.paint(&title, Color::Cyan));
        buf.push('\n');

        let rule = "-".repeat(self.options.rule_width);
        buf.push_str(&self.paint(&rule, Color::Cyan));
        buf.push('\n');
    }

    fn next_timestamp(&mut self) -> Option<String> {
        if !self.options.show_timestamp {
            return None;
        }

        let now = self.clock.now();
        if let Some(last) = self.last_timestamp {
            if now.signed_duration_since(last).num_milliseconds() <= TIMESTAMP_COALESCE_MS {
                return None;
            }
        }
        self.last_timestamp = Some(now);
        Some(now.format(TIMESTAMP_FORMAT).to_string())
    }

    fn push_node(&self, buf: &mut String, node: &DiffNode) -> Result<()> {
        match &node.change {
            Change::Added(value) => self.push_value(buf, Marker::Added, &node.path, value),
            Change::Removed(value) => self.push_value(buf, Marker::Removed, &node.path, value),
            Change::Replaced { old, new } => match (self.options.change_style, old, new) {
                (ChangeStyle::Combined, Document::Scalar(a), Document::Scalar(b)) => {
                    let text = format!("{}: {} -> {}", node.path, a, b);
                    self.push_line(buf, Marker::Modified, &text);
                    Ok(())
                }
                _ => {
                    self.push_value(buf, Marker::Removed, &node.path, old)?;
                    self.push_value(buf, Marker::Added, &node.path, new)
                }
            },
        }
    }

    fn push_value(
        &self,
        buf: &mut String,
        marker: Marker,
        path: &Path,
        value: &Document,
    ) -> Result<()> {
        match value {
            Document::Scalar(scalar) if path.is_root() => {
                self.push_line(buf, marker, &scalar.to_string());
            }
            Document::Scalar(scalar) => {
                self.push_line(buf, marker, &format!("{}: {}", path, scalar));
            }
            container => {
                if !path.is_root() {
                    self.push_line(buf, marker, &format!("{}:", path));
                }
                for line in block_lines(container)? {
                    self.push_line(buf, marker, &line);
                }
            }
        }
        Ok(())
    }

    /// Every line of `text` gets the marker, including lines inside
    /// multi-line string values.
    fn push_line(&self, buf: &mut String, marker: Marker, text: &str) {
        for piece in text.split('\n') {
            let line = format!("{} {}", marker.symbol(), piece);
            buf.push_str(&self.paint(&line, marker.color()));
            buf.push('\n');
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.options.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

fn write_block<W: Write + ?Sized>(out: &mut W, block: &str) -> Result<()> {
    out.write_all(block.as_bytes())?;
    out.flush()?;
    Ok(())
}
