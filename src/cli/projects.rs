//! Projects command implementation

use anyhow::Result;

use super::ellipsize;
use crate::scanner::Scanner;

pub fn run(scanner: &Scanner) -> Result<()> {
    let projects = scanner.scan_projects()?;

    if projects.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    println!(
        "{:<18} {:<10} {:<45} {}",
        "Last Activity", "Sessions", "Project", "Directory ID"
    );
    println!("{}", "-".repeat(110));

    for p in projects {
        let activity = p
            .last_activity
            .as_ref()
            .map(|ts| {
                if ts.len() >= 16 {
                    format!("{} {}", &ts[..10], &ts[11..16])
                } else {
                    ts.clone()
                }
            })
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<18} {:<10} {:<45} {}",
            activity,
            p.session_count,
            ellipsize(&p.display_name, 43),
            p.id,
        );
    }

    Ok(())
}
