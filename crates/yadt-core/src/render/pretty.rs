//! Pretty block formatting for container values.

use crate::errors::{Result, YadtError};
use crate::model::Document;

/// Format a document as an indented JSON-style block with sorted keys.
///
/// For non-empty containers the outer `{`/`}` or `[`/`]` lines are
/// stripped, leaving only the inner lines with their two-space indent.
/// Empty containers and scalars come back as a single line.
///
/// # Errors
///
/// `Serialization` if the value cannot be serialized.
pub fn block_lines(doc: &Document) -> Result<Vec<String>> {
    let text = serde_json::to_string_pretty(&doc.to_json()).map_err(|e| {
        YadtError::Serialization {
            message: e.to_string(),
        }
    })?;

    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    if lines.len() >= 2 && doc.is_container() {
        lines.pop();
        lines.remove(0);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_block_strips_delimiters() {
        let doc = Document::from(json!({"replicas": 1, "paused": false}));
        let lines = block_lines(&doc).unwrap();

        assert_eq!(lines, vec!["  \"paused\": false,", "  \"replicas\": 1"]);
    }

    #[test]
    fn test_nested_delimiters_are_kept() {
        let doc = Document::from(json!({"selector": {"app": "web"}}));
        let lines = block_lines(&doc).unwrap();

        assert_eq!(
            lines,
            vec!["  \"selector\": {", "    \"app\": \"web\"", "  }"]
        );
    }

    #[test]
    fn test_sequence_block() {
        let doc = Document::from(json!(["a", 2]));
        assert_eq!(block_lines(&doc).unwrap(), vec!["  \"a\",", "  2"]);
    }

    #[test]
    fn test_empty_container_is_one_line() {
        assert_eq!(block_lines(&Document::from(json!({}))).unwrap(), vec!["{}"]);
        assert_eq!(block_lines(&Document::from(json!([]))).unwrap(), vec!["[]"]);
    }
}
