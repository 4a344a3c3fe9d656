//! Session parser
//!
//! Full parse of one session log into an ordered message list plus header
//! metadata. The file is streamed line by line; multi-hundred-MB logs are
//! normal, so nothing here buffers the whole file.

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::model::{LineKind, LogLine, Message};

/// Session-level header fields, captured from the first line that carries a
/// session id.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub version: Option<String>,
    pub git_branch: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedSession {
    pub meta: SessionMeta,
    pub messages: Vec<Message>,
}

/// Parse the session `<sessionId>.jsonl` under `<root>/<projectId>/`.
///
/// Returns `Ok(None)` if the file does not exist; a missing session is an
/// outcome, not an error. Messages come back in file-line order, which is the
/// canonical causal order; timestamps are not consulted for ordering. Lines
/// that fail to parse as JSON are skipped silently. Read errors mid-stream
/// propagate as `Error::Io`.
pub fn parse_session(root: &Path, project_id: &str, session_id: &str) -> Result<Option<ParsedSession>> {
    let path = root.join(project_id).join(format!("{}.jsonl", session_id));
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(&path)?;
    let reader = BufReader::new(file);

    let mut meta = SessionMeta::default();
    let mut messages = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: LogLine = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(_) => continue,
        };

        if meta.session_id.is_none() && record.session_id.is_some() {
            meta = SessionMeta {
                session_id: record.session_id.clone(),
                cwd: record.cwd.clone(),
                version: record.version.clone(),
                git_branch: record.git_branch.clone(),
            };
        }

        match record.kind {
            LineKind::User | LineKind::Assistant => {
                messages.push(Message::from_line(&record));
            }
            LineKind::Other => {}
        }
    }

    Ok(Some(ParsedSession { meta, messages }))
}
