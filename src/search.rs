//! Search engine
//!
//! Keyword search with no persistent index: every query is a linear re-scan
//! of the corpus. Bounded by a single user's local log volume, so O(corpus)
//! per query is acceptable.

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::model::{extract_plain_text, LineKind, LogLine};
use crate::scanner::{session_files, to_rfc3339};

/// Characters of context kept on each side of the first match in a line.
const SNIPPET_CONTEXT: usize = 60;

/// Snippets carried per file in global results; `match_count` stays exact.
const SNIPPETS_PER_FILE: usize = 3;

/// Queries shorter than this come back empty without touching the corpus.
const MIN_KEYWORD_LEN: usize = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub role: String,
    pub timestamp: Option<String>,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub project_id: String,
    pub session_id: String,
    pub match_count: usize,
    pub matches: Vec<SearchMatch>,
    pub last_modified: String,
}

/// Optional narrowing of a global search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Restrict to one project directory.
    pub project: Option<String>,
    /// Inclusive `YYYY-MM-DD` lower bound on file modification time.
    pub from: Option<String>,
    /// Inclusive `YYYY-MM-DD` upper bound, treated as end-of-day.
    pub to: Option<String>,
}

/// Scan one session file for a keyword, case-insensitively. One match record
/// per matching line; only the first occurrence in a line gets its context
/// captured (a known limitation, not worth the extra snippets). A read error
/// mid-stream ends the scan with the matches found so far.
pub fn search_in_session(path: &Path, keyword: &str) -> Result<Vec<SearchMatch>> {
    let keyword_lower = keyword.to_lowercase();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut matches = Vec::new();

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
        if record.kind == LineKind::Other {
            continue;
        }

        let text = extract_plain_text(record.message.as_ref().and_then(|m| m.content.as_ref()));
        let lower = text.to_lowercase();
        if let Some(idx) = lower.find(&keyword_lower) {
            let role = record
                .message
                .as_ref()
                .and_then(|m| m.role.clone())
                .unwrap_or_else(|| match record.kind {
                    LineKind::User => "user".to_string(),
                    _ => "assistant".to_string(),
                });
            matches.push(SearchMatch {
                role,
                timestamp: record.timestamp.clone(),
                snippet: snippet_window(&text, idx, keyword_lower.len()),
            });
        }
    }

    Ok(matches)
}

/// Context window around the first match, clamped to char boundaries. The
/// match index comes from the lowercased text; for the rare characters whose
/// lowercase form has a different byte length the window may shift slightly,
/// but it never splits a character.
fn snippet_window(text: &str, idx: usize, keyword_len: usize) -> String {
    let start = floor_boundary(text, idx.saturating_sub(SNIPPET_CONTEXT));
    let end = floor_boundary(
        text,
        (idx.saturating_add(keyword_len + SNIPPET_CONTEXT)).min(text.len()),
    );
    text[start..end].to_string()
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

pub struct SearchEngine {
    root: std::path::PathBuf,
}

impl SearchEngine {
    pub fn new(root: std::path::PathBuf) -> Self {
        Self { root }
    }

    /// Search the whole corpus. Results are ordered by match count
    /// descending; ties keep encounter order, which follows directory
    /// enumeration and is therefore filesystem-dependent.
    pub fn global_search(&self, keyword: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        if keyword.trim().chars().count() < MIN_KEYWORD_LEN {
            return Ok(vec![]);
        }
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut results = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let dir = entry?.path();
            if !dir.is_dir() {
                continue;
            }
            let project_id = match dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            if let Some(filter) = &options.project {
                if &project_id != filter {
                    continue;
                }
            }

            for file in session_files(&dir)? {
                let mtime = match std::fs::metadata(&file).and_then(|m| m.modified()) {
                    Ok(t) => to_rfc3339(t),
                    Err(e) => {
                        debug!(file = %file.display(), error = %e, "stat failed");
                        continue;
                    }
                };

                // Lexical comparison is safe: both sides are zero-padded ISO-8601.
                if let Some(from) = &options.from {
                    if mtime.as_str() < from.as_str() {
                        continue;
                    }
                }
                if let Some(to) = &options.to {
                    if mtime > format!("{}T23:59:59Z", to) {
                        continue;
                    }
                }

                let mut matches = search_in_session(&file, keyword)?;
                if matches.is_empty() {
                    continue;
                }

                let session_id = file
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("")
                    .to_string();
                let match_count = matches.len();
                matches.truncate(SNIPPETS_PER_FILE);

                results.push(SearchResult {
                    project_id: project_id.clone(),
                    session_id,
                    match_count,
                    matches,
                    last_modified: mtime,
                });
            }
        }

        // Stable sort: ties stay in encounter order.
        results.sort_by(|a, b| b.match_count.cmp(&a.match_count));

        Ok(results)
    }
}
