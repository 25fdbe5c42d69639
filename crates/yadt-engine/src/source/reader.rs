use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use yadt_core::core_types::EventContext;
use yadt_core::errors::{io_error, ExErrorKind};
use yadt_core::{ChangeEvent, ExError};

use super::ChangeSource;

/// Source reading a stream of JSON values from a byte reader
///
/// Values may be concatenated or newline separated. Each value is one of:
/// - a watch event `{"type": "ADDED" | "MODIFIED" | "DELETED", "object": {..}}`
/// - a `*List` object whose `items` are delivered one by one
/// - a bare object, delivered as applied
///
/// `BOOKMARK` watch events are skipped and `ERROR` watch events are logged.
/// Malformed JSON is logged and skipped. Reading happens on a blocking
/// thread; a full channel blocks it.
pub struct ReaderSource {
    name: String,
    reader: Box<dyn Read + Send>,
}

impl fmt::Debug for ReaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ReaderSource {
    pub fn new(name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// Read from standard input
    pub fn stdin() -> Self {
        Self::new("stdin", std::io::stdin())
    }

    /// Read from a file
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ExError> {
        let file = std::fs::File::open(path)
            .map_err(|e| io_error("open_source", e).with_resource(path.display().to_string()))?;
        Ok(Self::new(path.display().to_string(), file))
    }
}

#[async_trait]
impl ChangeSource for ReaderSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(self: Box<Self>, tx: mpsc::Sender<ChangeEvent>) -> Result<(), ExError> {
        let ReaderSource { name, reader } = *self;
        let task_name = name.clone();

        let stats = tokio::task::spawn_blocking(move || read_events(&task_name, reader, &tx))
            .await
            .map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("read_source")
                    .with_resource(name.as_str())
                    .with_message(e.to_string())
            })??;

        tracing::debug!(
            source = %name,
            delivered = stats.delivered,
            skipped = stats.skipped,
            "reader source exhausted"
        );
        Ok(())
    }
}

/// Parse values off `reader` and push the resulting events into `tx`
///
/// Input is consumed line by line. A value may span several lines; a
/// syntax error discards the broken text and parsing resumes at the most
/// recent line, so one bad value never costs the values after it.
fn read_events<R: Read>(
    source: &str,
    reader: R,
    tx: &mpsc::Sender<ChangeEvent>,
) -> Result<ReadStats, ExError> {
    let mut stats = ReadStats::default();
    let mut pending = String::new();

    for line in BufReader::new(reader).split(b'\n') {
        let line = line.map_err(|e| io_error("read_source", e).with_resource(source))?;
        let Ok(line) = String::from_utf8(line) else {
            tracing::warn!(source, "skipping line that is not valid UTF-8");
            stats.skipped += 1;
            continue;
        };

        let last_line = pending.len();
        pending.push_str(&line);
        pending.push('\n');
        drain_values(source, &mut pending, last_line, &mut stats, |value| {
            deliver(source, value, tx)
        })?;
    }

    if !pending.trim().is_empty() {
        tracing::warn!(source, "skipping truncated value at end of input");
        stats.skipped += 1;
    }
    Ok(stats)
}

/// What one reader source produced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ReadStats {
    delivered: u64,
    skipped: u64,
}

/// Decode every complete value at the front of `pending`
///
/// An incomplete value at the end is left in place for the next line.
/// `last_line` is the offset where the newest line starts.
fn drain_values<F>(
    source: &str,
    pending: &mut String,
    mut last_line: usize,
    stats: &mut ReadStats,
    mut deliver: F,
) -> Result<(), ExError>
where
    F: FnMut(Value) -> Result<u64, ExError>,
{
    loop {
        let mut values = serde_json::Deserializer::from_str(pending.as_str()).into_iter::<Value>();
        let mut failure = None;
        for value in values.by_ref() {
            match value {
                Ok(value) => stats.delivered += deliver(value)?,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        let consumed = values.byte_offset();

        match failure {
            None => {
                pending.clear();
                return Ok(());
            }
            Some(e) if e.is_eof() => {
                pending.drain(..consumed);
                return Ok(());
            }
            Some(e) => {
                tracing::warn!(source, error = %e, "skipping malformed JSON");
                stats.skipped += 1;
                pending.drain(..consumed);
                last_line = last_line.saturating_sub(consumed);
                if last_line == 0 {
                    pending.clear();
                    return Ok(());
                }
                pending.drain(..last_line);
                last_line = 0;
            }
        }
    }
}

fn deliver(source: &str, value: Value, tx: &mpsc::Sender<ChangeEvent>) -> Result<u64, ExError> {
    let mut delivered = 0;
    for event in classify(source, value) {
        tx.blocking_send(event).map_err(|_| {
            ExError::new(ExErrorKind::ChannelClosed)
                .with_op("deliver_event")
                .with_resource(source)
                .with_message("delivery channel closed")
        })?;
        delivered += 1;
    }
    Ok(delivered)
}

/// Turn one decoded JSON value into zero or more change events
pub fn classify(source: &str, value: Value) -> Vec<ChangeEvent> {
    let context = || EventContext::new().with_source(source);

    if let Some((kind, object)) = as_watch_event(&value) {
        return match kind {
            "ADDED" | "MODIFIED" => {
                vec![ChangeEvent::applied(object.clone()).with_context(context())]
            }
            "DELETED" => vec![ChangeEvent::deleted(object.clone()).with_context(context())],
            "BOOKMARK" => Vec::new(),
            "ERROR" => {
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                tracing::warn!(source, message, "watch stream reported an error");
                Vec::new()
            }
            other => {
                tracing::warn!(source, event_type = other, "skipping unknown watch event type");
                Vec::new()
            }
        };
    }

    if is_list(&value) {
        let items = match value {
            Value::Object(mut map) => map.remove("items"),
            _ => None,
        };
        return match items {
            Some(Value::Array(items)) => items
                .into_iter()
                .flat_map(|item| classify(source, item))
                .collect(),
            _ => Vec::new(),
        };
    }

    vec![ChangeEvent::applied(value).with_context(context())]
}

fn as_watch_event(value: &Value) -> Option<(&str, &Value)> {
    let kind = value.get("type")?.as_str()?;
    let object = value.get("object").filter(|o| o.is_object())?;
    Some((kind, object))
}

fn is_list(value: &Value) -> bool {
    let is_list_kind = value
        .get("kind")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.ends_with("List"));
    is_list_kind && value.get("items").is_some_and(Value::is_array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yadt_core::ChangeKind;

    fn pod(name: &str) -> Value {
        json!({"apiVersion": "v1", "kind": "Pod", "metadata": {"name": name}})
    }

    #[test]
    fn test_bare_object_is_applied() {
        let events = classify("t", pod("a"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Applied);
        assert_eq!(events[0].context.source.as_deref(), Some("t"));
    }

    #[test]
    fn test_watch_events_map_to_kinds() {
        let added = classify("t", json!({"type": "ADDED", "object": pod("a")}));
        let modified = classify("t", json!({"type": "MODIFIED", "object": pod("a")}));
        let deleted = classify("t", json!({"type": "DELETED", "object": pod("a")}));

        assert_eq!(added[0].kind, ChangeKind::Applied);
        assert_eq!(modified[0].kind, ChangeKind::Applied);
        assert_eq!(deleted[0].kind, ChangeKind::Deleted);
        assert_eq!(deleted[0].object, pod("a"));
    }

    #[test]
    fn test_bookmark_and_error_are_skipped() {
        assert!(classify("t", json!({"type": "BOOKMARK", "object": {"kind": "Pod"}})).is_empty());
        assert!(classify("t", json!({"type": "ERROR", "object": {"message": "gone"}})).is_empty());
    }

    #[test]
    fn test_list_is_expanded_in_order() {
        let list = json!({"apiVersion": "v1", "kind": "PodList", "items": [pod("a"), pod("b")]});
        let names: Vec<String> = classify("t", list)
            .into_iter()
            .map(|e| e.object["metadata"]["name"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_secret_with_type_field_is_not_a_watch_event() {
        let secret = json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "type": "Opaque",
            "metadata": {"name": "s"}
        });
        let events = classify("t", secret.clone());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].object, secret);
    }
}
