//! Error types for the session log core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Project, session, or trash entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Identifier is missing or not safe to use as a path segment.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Metadata referenced a trashed file that no longer exists on disk.
    /// The stale entry has already been pruned when this is returned.
    #[error("trashed file lost: {0}")]
    DataLoss(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject identifiers that could escape their directory segment.
/// Both project and session ids must pass this before any path is built.
pub fn validate_id(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidId(format!("{} is empty", kind)));
    }
    if id.contains("..") || id.contains('/') || id.contains('\\') {
        return Err(Error::InvalidId(format!("{} '{}' is not a valid path segment", kind, id)));
    }
    Ok(())
}
