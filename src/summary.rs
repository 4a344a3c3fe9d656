//! Session summarizer
//!
//! Cheap partial scan of a session log: running aggregates only, no content
//! blocks and no message list. Used by list views where full parsing would be
//! wasted work.

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::model::{extract_plain_text, truncate_chars, LineKind, LogLine};

/// Cap on the captured first user message, in characters.
pub const FIRST_MESSAGE_CAP: usize = 200;

/// Lightweight descriptor of a session, derived on every call and never
/// persisted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub cwd: Option<String>,
    pub version: Option<String>,
    pub git_branch: Option<String>,
    pub first_user_message: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub message_count: u64,
    pub has_assistant: bool,
}

/// Stream a session file and build its summary. Malformed lines are skipped;
/// a read error mid-stream ends the scan and returns what was seen so far
/// (partial data beats no data for a listing). Only opening the file can fail.
pub fn summarize_session(path: &Path) -> Result<SessionSummary> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut summary = SessionSummary::default();

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let record: LogLine = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(_) => continue,
        };

        if summary.cwd.is_none() {
            summary.cwd = record.cwd.clone();
        }
        if summary.version.is_none() {
            summary.version = record.version.clone();
        }
        if summary.git_branch.is_none() {
            summary.git_branch = record.git_branch.clone();
        }
        if let Some(ts) = &record.timestamp {
            // Running min/max: logs are not guaranteed to be time-ordered.
            if summary.start_time.as_deref().map_or(true, |start| ts.as_str() < start) {
                summary.start_time = Some(ts.clone());
            }
            if summary.end_time.as_deref().map_or(true, |end| ts.as_str() > end) {
                summary.end_time = Some(ts.clone());
            }
        }

        match record.kind {
            LineKind::User | LineKind::Assistant => {
                summary.message_count += 1;
                if record.kind == LineKind::Assistant {
                    summary.has_assistant = true;
                }
                if summary.first_user_message.is_none() && record.kind == LineKind::User {
                    let content = record.message.as_ref().and_then(|m| m.content.as_ref());
                    let text = extract_plain_text(content);
                    // Local meta-command output starts with '<' and does not
                    // qualify as the session's opening message.
                    if !text.trim().is_empty() && !text.starts_with('<') {
                        summary.first_user_message =
                            Some(truncate_chars(&text, FIRST_MESSAGE_CAP));
                    }
                }
            }
            LineKind::Other => {}
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn jsonl(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_single_user_line_summary() {
        let file = jsonl(&[
            r#"{"type":"user","message":{"role":"user","content":"fix bug"},"timestamp":"2024-01-01T00:00:00Z"}"#,
        ]);
        let summary = summarize_session(file.path()).unwrap();
        assert_eq!(summary.first_user_message.as_deref(), Some("fix bug"));
        assert_eq!(summary.message_count, 1);
        assert!(!summary.has_assistant);
        assert_eq!(summary.start_time.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(summary.end_time.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_time_bounds_are_running_min_max_not_line_order() {
        let file = jsonl(&[
            r#"{"type":"user","message":{"role":"user","content":"a"},"timestamp":"2024-01-02T00:00:00Z"}"#,
            r#"{"type":"assistant","message":{"role":"assistant","content":"b"},"timestamp":"2024-01-03T00:00:00Z"}"#,
            r#"{"type":"user","message":{"role":"user","content":"c"},"timestamp":"2024-01-01T00:00:00Z"}"#,
        ]);
        let summary = summarize_session(file.path()).unwrap();
        assert_eq!(summary.start_time.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(summary.end_time.as_deref(), Some("2024-01-03T00:00:00Z"));
        assert_eq!(summary.message_count, 3);
        assert!(summary.has_assistant);
    }

    #[test]
    fn test_start_time_is_min_when_first_line_is_newer() {
        let file = jsonl(&[
            r#"{"type":"user","message":{"role":"user","content":"a"},"timestamp":"2024-01-02T00:00:00Z"}"#,
            r#"{"type":"user","message":{"role":"user","content":"b"},"timestamp":"2024-01-01T00:00:00Z"}"#,
        ]);
        let summary = summarize_session(file.path()).unwrap();
        assert_eq!(summary.start_time.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(summary.end_time.as_deref(), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn test_header_fields_from_first_carrier_line() {
        let file = jsonl(&[
            r#"{"type":"summary","summary":"old chat"}"#,
            r#"{"type":"user","cwd":"/home/alice/proj","version":"1.0.44","gitBranch":"main","message":{"role":"user","content":"hello"},"timestamp":"2024-05-01T10:00:00Z"}"#,
            r#"{"type":"user","cwd":"/elsewhere","message":{"role":"user","content":"later"},"timestamp":"2024-05-01T10:05:00Z"}"#,
        ]);
        let summary = summarize_session(file.path()).unwrap();
        assert_eq!(summary.cwd.as_deref(), Some("/home/alice/proj"));
        assert_eq!(summary.version.as_deref(), Some("1.0.44"));
        assert_eq!(summary.git_branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_control_and_empty_messages_do_not_qualify() {
        let file = jsonl(&[
            r#"{"type":"user","message":{"role":"user","content":"<command-name>/clear</command-name>"}}"#,
            r#"{"type":"user","message":{"role":"user","content":"   "}}"#,
            r#"{"type":"user","message":{"role":"user","content":"real question"}}"#,
        ]);
        let summary = summarize_session(file.path()).unwrap();
        assert_eq!(summary.first_user_message.as_deref(), Some("real question"));
        assert_eq!(summary.message_count, 3);
    }

    #[test]
    fn test_first_user_message_is_capped() {
        let long = "y".repeat(500);
        let line = format!(
            r#"{{"type":"user","message":{{"role":"user","content":"{}"}}}}"#,
            long
        );
        let file = jsonl(&[&line]);
        let summary = summarize_session(file.path()).unwrap();
        assert_eq!(
            summary.first_user_message.unwrap().chars().count(),
            FIRST_MESSAGE_CAP
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let file = jsonl(&[
            "{not json",
            r#"{"type":"user","message":{"role":"user","content":"ok"},"timestamp":"2024-01-01T00:00:00Z"}"#,
        ]);
        let summary = summarize_session(file.path()).unwrap();
        assert_eq!(summary.message_count, 1);
    }
}
