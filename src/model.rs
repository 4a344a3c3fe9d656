//! Log record model
//!
//! Typed view of one line of a session log (JSONL, one JSON object per line)
//! and of the content blocks inside a message. Pure data transformation,
//! no I/O. Malformed lines are the caller's problem: deserialization failure
//! means the line gets skipped, never a partial record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text longer than this inside a tool_result block is truncated to bound
/// memory when parsing sessions with huge command outputs.
pub const TOOL_RESULT_TEXT_CAP: usize = 5000;

/// User-visible text injected by local meta-commands starts with this prefix
/// and does not count as real message content.
pub const LOCAL_COMMAND_PREFIX: &str = "<local-command-";

/// Line type discriminator. Anything that is not a user or assistant
/// message (summaries, queue operations, future types) maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    User,
    Assistant,
    #[serde(other)]
    #[default]
    Other,
}

/// One raw line of a session log.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub uuid: Option<String>,
    /// Back-reference into the same session's message set. The structure can
    /// branch (sidechains), so this is a lookup key, never an owned link.
    pub parent_uuid: Option<String>,
    pub timestamp: Option<String>,
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub version: Option<String>,
    pub git_branch: Option<String>,
    pub is_sidechain: bool,
    pub message: Option<RawMessage>,
}

/// The `message` object carried by user/assistant lines. `content` is either
/// a plain string or an array of blocks; kept raw here and decoded by
/// [`parse_content_blocks`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMessage {
    pub role: Option<String>,
    pub model: Option<String>,
    pub content: Option<Value>,
}

/// Closed union of content block types. Unrecognized types are preserved
/// opaquely in `Unknown` so downstream rendering stays lossless.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        text: String,
    },
    ToolUse {
        name: String,
        id: Option<String>,
        input: Value,
    },
    ToolResult {
        tool_use_id: Option<String>,
        text: String,
    },
    Unknown {
        block_type: String,
        raw: Value,
    },
}

/// A normalized user or assistant message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub uuid: Option<String>,
    pub parent_uuid: Option<String>,
    pub role: String,
    pub blocks: Vec<ContentBlock>,
    pub timestamp: Option<String>,
    pub model: Option<String>,
    pub has_content: bool,
    pub is_sidechain: bool,
}

impl Message {
    pub fn from_line(line: &LogLine) -> Self {
        let msg = line.message.clone().unwrap_or_default();
        let role = msg.role.unwrap_or_else(|| match line.kind {
            LineKind::User => "user".to_string(),
            LineKind::Assistant => "assistant".to_string(),
            LineKind::Other => "other".to_string(),
        });
        let blocks = parse_content_blocks(msg.content.as_ref());
        let has_content = blocks.iter().any(|b| match b {
            ContentBlock::Text { text } => {
                !text.trim().is_empty() && !text.starts_with(LOCAL_COMMAND_PREFIX)
            }
            ContentBlock::ToolUse { .. }
            | ContentBlock::ToolResult { .. }
            | ContentBlock::Thinking { .. } => true,
            ContentBlock::Unknown { .. } => false,
        });

        Message {
            uuid: line.uuid.clone(),
            parent_uuid: line.parent_uuid.clone(),
            role,
            blocks,
            timestamp: line.timestamp.clone(),
            model: msg.model,
            has_content,
            is_sidechain: line.is_sidechain,
        }
    }
}

/// Extract the plain text of a `content` value: string passthrough, or all
/// `text` blocks joined with newlines, or empty.
pub fn extract_plain_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
            .map(|b| b.get("text").and_then(|t| t.as_str()).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Decode a raw `content` value into structured blocks. Every input block
/// produces exactly one output block; unrecognized types come back as
/// `Unknown` rather than being dropped.
pub fn parse_content_blocks(content: Option<&Value>) -> Vec<ContentBlock> {
    match content {
        Some(Value::String(s)) => vec![ContentBlock::Text { text: s.clone() }],
        Some(Value::Array(blocks)) => blocks.iter().map(parse_block).collect(),
        _ => vec![],
    }
}

fn parse_block(block: &Value) -> ContentBlock {
    let block_type = block.get("type").and_then(|t| t.as_str()).unwrap_or("");
    match block_type {
        "text" => ContentBlock::Text {
            text: str_field(block, "text"),
        },
        "thinking" => ContentBlock::Thinking {
            text: str_field(block, "thinking"),
        },
        "tool_use" => ContentBlock::ToolUse {
            name: block
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            id: block.get("id").and_then(|v| v.as_str()).map(String::from),
            input: block.get("input").cloned().unwrap_or(Value::Null),
        },
        "tool_result" => ContentBlock::ToolResult {
            tool_use_id: block
                .get("tool_use_id")
                .and_then(|v| v.as_str())
                .map(String::from),
            text: truncate_chars(
                &extract_plain_text(block.get("content")),
                TOOL_RESULT_TEXT_CAP,
            ),
        },
        other => ContentBlock::Unknown {
            block_type: other.to_string(),
            raw: block.clone(),
        },
    }
}

fn str_field(block: &Value, field: &str) -> String {
    block
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Truncate to at most `max` characters at a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_text_string_passthrough() {
        let content = json!("hello world");
        assert_eq!(extract_plain_text(Some(&content)), "hello world");
    }

    #[test]
    fn test_extract_plain_text_joins_text_blocks() {
        let content = json!([
            {"type": "text", "text": "first"},
            {"type": "tool_use", "name": "Bash", "id": "1", "input": {}},
            {"type": "text", "text": "second"}
        ]);
        assert_eq!(extract_plain_text(Some(&content)), "first\nsecond");
    }

    #[test]
    fn test_extract_plain_text_non_content_is_empty() {
        assert_eq!(extract_plain_text(None), "");
        assert_eq!(extract_plain_text(Some(&json!(42))), "");
    }

    #[test]
    fn test_parse_content_blocks_preserves_length() {
        let content = json!([
            {"type": "text", "text": "a"},
            {"type": "thinking", "thinking": "hmm"},
            {"type": "tool_use", "name": "Read", "id": "t1", "input": {"path": "/x"}},
            {"type": "tool_result", "tool_use_id": "t1", "content": "ok"},
            {"type": "image", "source": {"data": "..."}},
            "bare string block"
        ]);
        let blocks = parse_content_blocks(Some(&content));
        assert_eq!(blocks.len(), 6);
        assert!(matches!(&blocks[4], ContentBlock::Unknown { block_type, .. } if block_type == "image"));
        assert!(matches!(&blocks[5], ContentBlock::Unknown { block_type, .. } if block_type.is_empty()));
    }

    #[test]
    fn test_parse_content_blocks_string_becomes_single_text() {
        let content = json!("just text");
        let blocks = parse_content_blocks(Some(&content));
        assert_eq!(blocks, vec![ContentBlock::Text { text: "just text".into() }]);
    }

    #[test]
    fn test_tool_result_text_is_capped() {
        let long = "x".repeat(TOOL_RESULT_TEXT_CAP + 100);
        let content = json!([{"type": "tool_result", "tool_use_id": "t1", "content": long}]);
        let blocks = parse_content_blocks(Some(&content));
        match &blocks[0] {
            ContentBlock::ToolResult { text, .. } => {
                assert_eq!(text.chars().count(), TOOL_RESULT_TEXT_CAP)
            }
            other => panic!("expected tool_result, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_result_nested_text_blocks() {
        let content = json!([{
            "type": "tool_result",
            "tool_use_id": "t2",
            "content": [{"type": "text", "text": "line1"}, {"type": "text", "text": "line2"}]
        }]);
        let blocks = parse_content_blocks(Some(&content));
        match &blocks[0] {
            ContentBlock::ToolResult { text, tool_use_id } => {
                assert_eq!(text, "line1\nline2");
                assert_eq!(tool_use_id.as_deref(), Some("t2"));
            }
            other => panic!("expected tool_result, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }

    #[test]
    fn test_message_role_falls_back_to_line_kind() {
        let line: LogLine = serde_json::from_str(
            r#"{"type":"assistant","uuid":"u1","message":{"content":"hi"}}"#,
        )
        .unwrap();
        let msg = Message::from_line(&line);
        assert_eq!(msg.role, "assistant");
        assert!(msg.has_content);
    }

    #[test]
    fn test_local_command_text_has_no_content() {
        let line: LogLine = serde_json::from_str(
            r#"{"type":"user","message":{"role":"user","content":"<local-command-stdout>ok</local-command-stdout>"}}"#,
        )
        .unwrap();
        assert!(!Message::from_line(&line).has_content);
    }

    #[test]
    fn test_unknown_line_type_maps_to_other() {
        let line: LogLine =
            serde_json::from_str(r#"{"type":"queue-operation","uuid":"q1"}"#).unwrap();
        assert_eq!(line.kind, LineKind::Other);
    }
}
