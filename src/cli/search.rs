//! Search command implementation

use anyhow::Result;

use super::ellipsize;
use crate::search::{SearchEngine, SearchOptions};

pub fn run(
    engine: &SearchEngine,
    keyword: &str,
    project: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    if keyword.trim().chars().count() < 2 {
        println!("Keyword must be at least 2 characters.");
        return Ok(());
    }

    let options = SearchOptions { project, from, to };
    let results = engine.global_search(keyword, &options)?;

    if results.is_empty() {
        println!("No matches for '{}'.", keyword);
        return Ok(());
    }

    println!("{} sessions match '{}':\n", results.len(), keyword);

    for result in results {
        println!(
            "{}/{} ({} matches, modified {})",
            result.project_id,
            result.session_id,
            result.match_count,
            &result.last_modified[..10.min(result.last_modified.len())],
        );
        for m in &result.matches {
            println!(
                "  [{}] {}",
                m.role,
                ellipsize(&m.snippet.replace('\n', " "), 100)
            );
        }
        println!();
    }

    Ok(())
}
