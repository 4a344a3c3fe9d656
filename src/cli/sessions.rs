//! Sessions command implementation

use anyhow::Result;

use super::ellipsize;
use crate::scanner::Scanner;

pub fn run(scanner: &Scanner, project_id: &str) -> Result<()> {
    let sessions = match scanner.scan_sessions(project_id)? {
        Some(s) => s,
        None => {
            println!("Project '{}' not found.", project_id);
            return Ok(());
        }
    };

    if sessions.is_empty() {
        println!("Project '{}' has no sessions.", project_id);
        return Ok(());
    }

    println!(
        "{:<18} {:<38} {:<6} {:<10} {}",
        "Started", "Session", "Msgs", "Branch", "First Message"
    );
    println!("{}", "-".repeat(120));

    for s in sessions {
        let started = if s.start_time.len() >= 16 {
            format!("{} {}", &s.start_time[..10], &s.start_time[11..16])
        } else {
            s.start_time.clone()
        };

        println!(
            "{:<18} {:<38} {:<6} {:<10} {}",
            started,
            s.id,
            s.message_count,
            s.git_branch.as_deref().unwrap_or("-"),
            ellipsize(&s.first_user_message, 50),
        );
    }

    Ok(())
}
