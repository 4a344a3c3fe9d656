//! Trash command implementations

use anyhow::Result;

use super::ellipsize;
use crate::trash::TrashStore;

pub fn list(store: &TrashStore) -> Result<()> {
    let listing = store.list_trash()?;

    if listing.items.is_empty() {
        println!("Trash is empty.");
        return Ok(());
    }

    println!(
        "{} items, auto-deleted after {} days\n",
        listing.total, listing.auto_delete_days
    );
    println!(
        "{:<18} {:<8} {:<38} {:<30} {}",
        "Deleted", "Expires", "Session", "Project", "First Message"
    );
    println!("{}", "-".repeat(130));

    for item in listing.items {
        println!(
            "{:<18} {:<8} {:<38} {:<30} {}",
            &item.deleted_at[..10.min(item.deleted_at.len())],
            format!("{}d", item.days_remaining),
            item.session_id,
            ellipsize(&item.project_name, 28),
            ellipsize(&item.first_user_message, 40),
        );
    }

    Ok(())
}

pub fn put(store: &TrashStore, project_id: &str, session_id: &str) -> Result<()> {
    let record = store.move_to_trash(project_id, session_id)?;
    println!(
        "Moved {}/{} to trash (expires {}).",
        record.project_id,
        record.session_id,
        &record.expires_at[..10.min(record.expires_at.len())]
    );
    Ok(())
}

pub fn restore(store: &TrashStore, project_id: &str, session_id: &str) -> Result<()> {
    let record = store.restore_from_trash(project_id, session_id)?;
    println!("Restored {}/{}.", record.project_id, record.session_id);
    Ok(())
}

pub fn delete(store: &TrashStore, project_id: &str, session_id: &str) -> Result<()> {
    store.permanently_delete(project_id, session_id)?;
    println!("Permanently deleted {}/{}.", project_id, session_id);
    Ok(())
}

pub fn empty(store: &TrashStore) -> Result<()> {
    let report = store.empty_trash()?;
    println!(
        "Deleted {} items ({} errors).",
        report.deleted_count, report.error_count
    );
    for error in &report.errors {
        println!("  error: {}", error);
    }
    Ok(())
}

pub fn clean(store: &TrashStore) -> Result<()> {
    let report = store.cleanup_expired()?;
    println!(
        "Removed {} expired items, {} remaining.",
        report.deleted_count, report.remaining_count
    );
    Ok(())
}
