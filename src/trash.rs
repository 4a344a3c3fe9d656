//! Trash manager
//!
//! Soft-delete/restore/expire state machine over two directory trees:
//!
//! - Active: `<logsRoot>/<projectId>/<sessionId>.jsonl`
//! - Trashed: `<trashRoot>/<projectId>/<sessionId>.<deletionEpochMillis>.jsonl`
//!
//! A single JSON index at `<trashRoot>/metadata.json` tracks trashed items and
//! their expiry deadlines. The index is read-whole/write-whole; a missing or
//! corrupt file reads as empty. Every read-modify-write cycle runs under one
//! mutex, so concurrent trash mutations in this process cannot lose each
//! other's updates. The per-item file move itself is a single rename and
//! stays atomic.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{validate_id, Error, Result};
use crate::summary::summarize_session;

pub const METADATA_VERSION: &str = "1.0";
const METADATA_FILE: &str = "metadata.json";

/// One trashed session, as stored in the metadata index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashItem {
    pub project_id: String,
    pub session_id: String,
    pub original_path: String,
    pub deleted_at: String,
    pub expires_at: String,
    pub file_name: String,
}

/// The whole metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashMetadata {
    pub version: String,
    pub items: Vec<TrashItem>,
    #[serde(rename = "lastCleanup", skip_serializing_if = "Option::is_none", default)]
    pub last_cleanup: Option<String>,
}

impl Default for TrashMetadata {
    fn default() -> Self {
        Self {
            version: METADATA_VERSION.to_string(),
            items: Vec::new(),
            last_cleanup: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashRecord {
    pub project_id: String,
    pub session_id: String,
    pub deleted_at: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRecord {
    pub project_id: String,
    pub session_id: String,
    pub restored_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyTrashReport {
    pub deleted_count: usize,
    pub error_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted_count: usize,
    pub remaining_count: usize,
}

/// Display record for one trashed session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashListItem {
    pub project_id: String,
    pub session_id: String,
    pub project_name: String,
    pub first_user_message: String,
    pub message_count: u64,
    pub deleted_at: String,
    pub expires_at: String,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashListing {
    pub items: Vec<TrashListItem>,
    pub total: usize,
    pub auto_delete_days: i64,
}

pub struct TrashStore {
    logs_root: PathBuf,
    trash_root: PathBuf,
    retention_days: i64,
    /// Serializes all metadata read-modify-write cycles.
    lock: Mutex<()>,
}

impl TrashStore {
    pub fn new(logs_root: PathBuf, trash_root: PathBuf, retention_days: i64) -> Self {
        Self {
            logs_root,
            trash_root,
            retention_days,
            lock: Mutex::new(()),
        }
    }

    // ============================================
    // METADATA INDEX
    // ============================================

    fn metadata_path(&self) -> PathBuf {
        self.trash_root.join(METADATA_FILE)
    }

    /// Missing or corrupt metadata reads as an empty index.
    fn read_metadata(&self) -> TrashMetadata {
        match fs::read_to_string(self.metadata_path()) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(error = %e, "corrupt trash metadata, starting over empty");
                TrashMetadata::default()
            }),
            Err(_) => TrashMetadata::default(),
        }
    }

    fn write_metadata(&self, metadata: &TrashMetadata) -> Result<()> {
        fs::create_dir_all(&self.trash_root)?;
        let json = serde_json::to_string_pretty(metadata)?;
        fs::write(self.metadata_path(), json)?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the metadata file is still in a readable state.
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ============================================
    // TRANSITIONS
    // ============================================

    /// Active -> Trashed. Moves the live file under the trash root and
    /// records it in the index with an expiry deadline.
    pub fn move_to_trash(&self, project_id: &str, session_id: &str) -> Result<TrashRecord> {
        validate_id("project id", project_id)?;
        validate_id("session id", session_id)?;

        let source = self
            .logs_root
            .join(project_id)
            .join(format!("{}.jsonl", session_id));
        if !source.exists() {
            return Err(Error::NotFound(format!(
                "session {}/{}",
                project_id, session_id
            )));
        }

        let _guard = self.guard();

        let project_trash_dir = self.trash_root.join(project_id);
        fs::create_dir_all(&project_trash_dir)?;

        let now = Utc::now();
        // The epoch-millis suffix keeps repeated delete/restore cycles of the
        // same session id from colliding.
        let file_name = format!("{}.{}.jsonl", session_id, now.timestamp_millis());
        fs::rename(&source, project_trash_dir.join(&file_name))?;

        let deleted_at = rfc3339(now);
        let expires_at = rfc3339(now + Duration::days(self.retention_days));

        let mut metadata = self.read_metadata();
        // A previous interrupted delete may have left a stale record behind.
        metadata
            .items
            .retain(|i| !(i.project_id == project_id && i.session_id == session_id));
        metadata.items.push(TrashItem {
            project_id: project_id.to_string(),
            session_id: session_id.to_string(),
            original_path: source.to_string_lossy().into_owned(),
            deleted_at: deleted_at.clone(),
            expires_at: expires_at.clone(),
            file_name,
        });
        self.write_metadata(&metadata)?;

        Ok(TrashRecord {
            project_id: project_id.to_string(),
            session_id: session_id.to_string(),
            deleted_at,
            expires_at,
        })
    }

    /// Trashed -> Active. An existing file at the live destination is moved
    /// aside with a timestamped backup suffix, never overwritten.
    pub fn restore_from_trash(&self, project_id: &str, session_id: &str) -> Result<RestoreRecord> {
        validate_id("project id", project_id)?;
        validate_id("session id", session_id)?;

        let _guard = self.guard();

        let mut metadata = self.read_metadata();
        let pos = metadata
            .items
            .iter()
            .position(|i| i.project_id == project_id && i.session_id == session_id)
            .ok_or_else(|| {
                Error::NotFound(format!("session {}/{} not in trash", project_id, session_id))
            })?;

        let trash_path = self
            .trash_root
            .join(project_id)
            .join(&metadata.items[pos].file_name);
        if !trash_path.exists() {
            // The file is gone behind our back. Prune the stale entry so the
            // index heals, but the restore itself has failed.
            metadata.items.remove(pos);
            self.write_metadata(&metadata)?;
            return Err(Error::DataLoss(format!(
                "session {}/{}",
                project_id, session_id
            )));
        }

        let project_dir = self.logs_root.join(project_id);
        fs::create_dir_all(&project_dir)?;

        let dest = project_dir.join(format!("{}.jsonl", session_id));
        if dest.exists() {
            let backup = project_dir.join(format!(
                "{}.jsonl.backup.{}",
                session_id,
                Utc::now().timestamp_millis()
            ));
            fs::rename(&dest, &backup)?;
            debug!(backup = %backup.display(), "existing live file moved aside");
        }

        fs::rename(&trash_path, &dest)?;

        metadata.items.remove(pos);
        self.write_metadata(&metadata)?;

        prune_empty_dir(&self.trash_root.join(project_id));

        Ok(RestoreRecord {
            project_id: project_id.to_string(),
            session_id: session_id.to_string(),
            restored_at: rfc3339(Utc::now()),
        })
    }

    /// Trashed -> Gone. Absence of the physical file is tolerated, so the
    /// operation is idempotent at the filesystem level.
    pub fn permanently_delete(&self, project_id: &str, session_id: &str) -> Result<()> {
        validate_id("project id", project_id)?;
        validate_id("session id", session_id)?;

        let _guard = self.guard();

        let mut metadata = self.read_metadata();
        let pos = metadata
            .items
            .iter()
            .position(|i| i.project_id == project_id && i.session_id == session_id)
            .ok_or_else(|| {
                Error::NotFound(format!("session {}/{} not in trash", project_id, session_id))
            })?;

        let trash_path = self
            .trash_root
            .join(project_id)
            .join(&metadata.items[pos].file_name);
        if trash_path.exists() {
            fs::remove_file(&trash_path)?;
        }

        metadata.items.remove(pos);
        self.write_metadata(&metadata)?;

        prune_empty_dir(&self.trash_root.join(project_id));

        Ok(())
    }

    /// Delete every trashed file, best effort. The index is reset to empty
    /// regardless of per-item failures: the files are authoritative, the
    /// bookkeeping is not.
    pub fn empty_trash(&self) -> Result<EmptyTrashReport> {
        let _guard = self.guard();

        let metadata = self.read_metadata();
        let total = metadata.items.len();
        let mut errors = Vec::new();

        for item in &metadata.items {
            let trash_path = self.trash_root.join(&item.project_id).join(&item.file_name);
            if trash_path.exists() {
                if let Err(e) = fs::remove_file(&trash_path) {
                    errors.push(format!("{}/{}: {}", item.project_id, item.session_id, e));
                }
            }
        }

        self.prune_empty_dirs();
        self.write_metadata(&TrashMetadata::default())?;

        Ok(EmptyTrashReport {
            deleted_count: total - errors.len(),
            error_count: errors.len(),
            errors,
        })
    }

    /// Delete items whose deadline has passed and write back the survivors.
    /// Expired items are dropped from the index even when their file could
    /// not be removed; the next manual empty can retry the directory. An
    /// unparseable deadline keeps its item.
    pub fn cleanup_expired(&self) -> Result<CleanupReport> {
        let _guard = self.guard();

        let metadata = self.read_metadata();
        let now = Utc::now();

        let (expired, kept): (Vec<_>, Vec<_>) = metadata
            .items
            .into_iter()
            .partition(|item| is_expired(&item.expires_at, now));

        let mut deleted_count = 0;
        for item in &expired {
            let trash_path = self.trash_root.join(&item.project_id).join(&item.file_name);
            match fs::remove_file(&trash_path) {
                Ok(()) => deleted_count += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => deleted_count += 1,
                Err(e) => {
                    warn!(file = %trash_path.display(), error = %e, "expired file not deleted");
                }
            }
        }

        let remaining_count = kept.len();
        self.write_metadata(&TrashMetadata {
            version: METADATA_VERSION.to_string(),
            items: kept,
            last_cleanup: Some(rfc3339(now)),
        })?;

        self.prune_empty_dirs();

        Ok(CleanupReport {
            deleted_count,
            remaining_count,
        })
    }

    /// Display view of the trash, newest deletion first. Items whose file
    /// has gone missing are skipped silently; restore prunes them for real.
    pub fn list_trash(&self) -> Result<TrashListing> {
        let metadata = self.read_metadata();
        let now = Utc::now();

        let mut items = Vec::new();
        for item in &metadata.items {
            let trash_path = self.trash_root.join(&item.project_id).join(&item.file_name);
            if !trash_path.exists() {
                debug!(file = %trash_path.display(), "trash entry without file, skipping");
                continue;
            }

            let summary = summarize_session(&trash_path).unwrap_or_default();

            items.push(TrashListItem {
                project_id: item.project_id.clone(),
                session_id: item.session_id.clone(),
                project_name: crate::scanner::decode_project_id(&item.project_id),
                first_user_message: summary
                    .first_user_message
                    .unwrap_or_else(|| "(empty session)".to_string()),
                message_count: summary.message_count,
                deleted_at: item.deleted_at.clone(),
                expires_at: item.expires_at.clone(),
                days_remaining: days_remaining(&item.expires_at, now),
            });
        }

        items.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));

        Ok(TrashListing {
            total: items.len(),
            auto_delete_days: self.retention_days,
            items,
        })
    }

    /// Remove empty directories under the trash root, deepest first.
    fn prune_empty_dirs(&self) {
        for entry in WalkDir::new(&self.trash_root)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .flatten()
        {
            if entry.file_type().is_dir() {
                prune_empty_dir(entry.path());
            }
        }
    }
}

fn prune_empty_dir(dir: &Path) {
    let is_empty = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if is_empty {
        if let Err(e) = fs::remove_dir(dir) {
            debug!(dir = %dir.display(), error = %e, "could not prune directory");
        }
    }
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_expired(expires_at: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(deadline) => deadline.with_timezone(&Utc) <= now,
        Err(_) => false,
    }
}

/// Ceiling of the time left to expiry in days, clamped to 0.
fn days_remaining(expires_at: &str, now: DateTime<Utc>) -> i64 {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(deadline) => {
            let secs = deadline.with_timezone(&Utc).signed_duration_since(now).num_seconds();
            if secs <= 0 {
                0
            } else {
                (secs + 86_399) / 86_400
            }
        }
        Err(_) => 0,
    }
}
