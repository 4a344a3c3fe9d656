//! Directory scanner
//!
//! Enumerates project directories and their session files, attaching
//! summaries. Projects without a single `.jsonl` file are invisible.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::error::Result;
use crate::summary::{summarize_session, SessionSummary};

/// How many session files get sampled per project when computing
/// `last_activity` and the display name. A sampling heuristic: projects with
/// many sessions can under-report recency if older files enumerate first.
const ACTIVITY_SAMPLE_FILES: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Directory name: the session's working directory with path separators
    /// encoded as dashes.
    pub id: String,
    /// Decoded path, preferring the cwd recovered from a session header over
    /// structural decoding of the directory name.
    pub display_name: String,
    pub session_count: usize,
    /// Max mtime across the sampled session files, RFC3339.
    pub last_activity: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub id: String,
    pub project_id: String,
    pub first_user_message: String,
    pub message_count: u64,
    pub start_time: String,
    pub end_time: String,
    pub version: Option<String>,
    pub git_branch: Option<String>,
    pub cwd: Option<String>,
    pub has_assistant: bool,
}

pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// List all projects, sorted by last activity descending. Projects whose
    /// activity is unknown sort last, keeping their encounter order. A missing
    /// logs root yields an empty list, not an error.
    pub fn scan_projects(&self) -> Result<Vec<Project>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut projects = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let dir = entry?.path();
            if !dir.is_dir() {
                continue;
            }
            let project_id = match dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            let files = session_files(&dir)?;
            if files.is_empty() {
                continue;
            }

            let mut display_name = None;
            let mut last_activity: Option<String> = None;

            for file in files.iter().take(ACTIVITY_SAMPLE_FILES) {
                if let Ok(meta) = fs::metadata(file) {
                    if let Ok(modified) = meta.modified() {
                        let mtime = to_rfc3339(modified);
                        if last_activity.as_deref().map_or(true, |cur| mtime.as_str() > cur) {
                            last_activity = Some(mtime);
                        }
                    }
                }

                if display_name.is_none() {
                    match summarize_session(file) {
                        Ok(summary) => display_name = summary.cwd,
                        Err(e) => debug!(file = %file.display(), error = %e, "summary failed"),
                    }
                }
            }

            projects.push(Project {
                display_name: display_name.unwrap_or_else(|| decode_project_id(&project_id)),
                session_count: files.len(),
                last_activity,
                id: project_id,
            });
        }

        // Descending by activity; unknown-activity projects go last. The sort
        // is stable, so ties keep encounter order.
        projects.sort_by(|a, b| match (&a.last_activity, &b.last_activity) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some(_), None) => std::cmp::Ordering::Less,
            (Some(x), Some(y)) => y.cmp(x),
        });

        Ok(projects)
    }

    /// List every session of one project, newest first. Returns `Ok(None)`
    /// when the project directory itself does not exist, distinguishing
    /// "no such project" from "project with zero sessions".
    pub fn scan_sessions(&self, project_id: &str) -> Result<Option<Vec<SessionEntry>>> {
        let dir = self.root.join(project_id);
        if !dir.exists() {
            return Ok(None);
        }

        let mut sessions = Vec::new();

        for file in session_files(&dir)? {
            let session_id = match file.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            let summary = summarize_session(&file).unwrap_or_default();
            sessions.push(session_entry(project_id, session_id, &file, summary));
        }

        // ISO-8601 timestamps are zero-padded and fixed-width, so lexical
        // comparison orders them correctly.
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        Ok(Some(sessions))
    }
}

fn session_entry(
    project_id: &str,
    session_id: String,
    path: &Path,
    summary: SessionSummary,
) -> SessionEntry {
    let meta = fs::metadata(path).ok();
    let created = meta
        .as_ref()
        .and_then(|m| m.created().or_else(|_| m.modified()).ok())
        .map(to_rfc3339);
    let modified = meta.as_ref().and_then(|m| m.modified().ok()).map(to_rfc3339);

    SessionEntry {
        id: session_id,
        project_id: project_id.to_string(),
        first_user_message: summary
            .first_user_message
            .unwrap_or_else(|| "(no user message)".to_string()),
        message_count: summary.message_count,
        start_time: summary.start_time.or(created).unwrap_or_default(),
        end_time: summary.end_time.or(modified).unwrap_or_default(),
        version: summary.version,
        git_branch: summary.git_branch,
        cwd: summary.cwd,
        has_assistant: summary.has_assistant,
    }
}

/// All `.jsonl` files directly under a project directory.
pub fn session_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "jsonl").unwrap_or(false) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Structural decode of a project directory name back into a path:
/// `-home-alice-proj` -> `/home/alice/proj`. Lossy for paths that themselves
/// contain dashes, which is why a cwd recovered from the log wins.
pub fn decode_project_id(id: &str) -> String {
    let stripped = id.strip_prefix('-').map(|rest| format!("/{}", rest));
    stripped.unwrap_or_else(|| id.to_string()).replace('-', "/")
}

pub(crate) fn to_rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_session(root: &Path, project: &str, session: &str, lines: &[&str]) -> PathBuf {
        let dir = root.join(project);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.jsonl", session));
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_decode_project_id() {
        assert_eq!(
            decode_project_id("-mnt-c-Users-shenx-Documents-AIProject"),
            "/mnt/c/Users/shenx/Documents/AIProject"
        );
        assert_eq!(decode_project_id("plain"), "plain");
    }

    #[test]
    fn test_missing_root_yields_empty() {
        let root = TempDir::new().unwrap();
        let scanner = Scanner::new(root.path().join("does-not-exist"));
        assert!(scanner.scan_projects().unwrap().is_empty());
    }

    #[test]
    fn test_projects_without_sessions_excluded() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("-empty-proj")).unwrap();
        write_session(
            root.path(),
            "-home-alice-proj",
            "s1",
            &[r#"{"type":"user","cwd":"/home/alice/proj","message":{"role":"user","content":"hi"},"timestamp":"2024-01-01T00:00:00Z"}"#],
        );

        let scanner = Scanner::new(root.path().to_path_buf());
        let projects = scanner.scan_projects().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "-home-alice-proj");
        assert_eq!(projects[0].display_name, "/home/alice/proj");
        assert_eq!(projects[0].session_count, 1);
        assert!(projects[0].last_activity.is_some());
    }

    #[test]
    fn test_display_name_falls_back_to_decoded_id() {
        let root = TempDir::new().unwrap();
        // No line carries a cwd.
        write_session(
            root.path(),
            "-home-bob-thing",
            "s1",
            &[r#"{"type":"user","message":{"role":"user","content":"hi"}}"#],
        );

        let scanner = Scanner::new(root.path().to_path_buf());
        let projects = scanner.scan_projects().unwrap();
        assert_eq!(projects[0].display_name, "/home/bob/thing");
    }

    #[test]
    fn test_scan_sessions_missing_project_is_none() {
        let root = TempDir::new().unwrap();
        let scanner = Scanner::new(root.path().to_path_buf());
        assert!(scanner.scan_sessions("ghost").unwrap().is_none());
    }

    #[test]
    fn test_scan_sessions_summary_scenario() {
        let root = TempDir::new().unwrap();
        write_session(
            root.path(),
            "-home-alice-proj",
            "s1",
            &[r#"{"type":"user","message":{"role":"user","content":"fix bug"},"timestamp":"2024-01-01T00:00:00Z"}"#],
        );

        let scanner = Scanner::new(root.path().to_path_buf());
        let sessions = scanner.scan_sessions("-home-alice-proj").unwrap().unwrap();
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.id, "s1");
        assert_eq!(s.first_user_message, "fix bug");
        assert_eq!(s.message_count, 1);
        assert!(!s.has_assistant);
        assert_eq!(s.start_time, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_sessions_sorted_by_start_time_descending() {
        let root = TempDir::new().unwrap();
        write_session(
            root.path(),
            "p",
            "older",
            &[r#"{"type":"user","message":{"role":"user","content":"a"},"timestamp":"2024-01-01T00:00:00Z"}"#],
        );
        write_session(
            root.path(),
            "p",
            "newer",
            &[r#"{"type":"user","message":{"role":"user","content":"b"},"timestamp":"2024-06-01T00:00:00Z"}"#],
        );

        let scanner = Scanner::new(root.path().to_path_buf());
        let sessions = scanner.scan_sessions("p").unwrap().unwrap();
        assert_eq!(sessions[0].id, "newer");
        assert_eq!(sessions[1].id, "older");
    }

    #[test]
    fn test_session_without_timestamps_uses_file_times() {
        let root = TempDir::new().unwrap();
        write_session(
            root.path(),
            "p",
            "no-ts",
            &[r#"{"type":"user","message":{"role":"user","content":"hi"}}"#],
        );
        let scanner = Scanner::new(root.path().to_path_buf());
        let sessions = scanner.scan_sessions("p").unwrap().unwrap();
        assert!(!sessions[0].start_time.is_empty());
        assert!(!sessions[0].end_time.is_empty());
    }
}
