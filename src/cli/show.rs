//! Show command implementation

use anyhow::Result;
use std::path::Path;

use crate::model::ContentBlock;
use crate::parser::parse_session;

pub fn run(logs_root: &Path, project_id: &str, session_id: &str, full: bool) -> Result<()> {
    let parsed = match parse_session(logs_root, project_id, session_id)? {
        Some(p) => p,
        None => {
            println!("Session '{}/{}' not found.", project_id, session_id);
            return Ok(());
        }
    };

    println!("\n{}", "=".repeat(80));
    println!(
        "Session: {}",
        parsed.meta.session_id.as_deref().unwrap_or(session_id)
    );
    if let Some(cwd) = &parsed.meta.cwd {
        println!("Directory: {}", cwd);
    }
    if let Some(branch) = &parsed.meta.git_branch {
        println!("Branch: {}", branch);
    }
    if let Some(version) = &parsed.meta.version {
        println!("Version: {}", version);
    }
    println!("{}", "=".repeat(80));

    if parsed.messages.is_empty() {
        println!("\nNo messages found (this may be an empty session).");
        return Ok(());
    }

    for msg in &parsed.messages {
        if !msg.has_content && !full {
            continue;
        }

        let model_info = msg
            .model
            .as_ref()
            .map(|m| format!(" | {}", m))
            .unwrap_or_default();
        let sidechain = if msg.is_sidechain { " | sidechain" } else { "" };

        println!(
            "\n[{}{}{}] ({})",
            msg.role.to_uppercase(),
            model_info,
            sidechain,
            msg.timestamp.as_deref().unwrap_or("?")
        );

        for block in &msg.blocks {
            print_block(block, full);
        }

        println!("{}", "-".repeat(40));
    }

    Ok(())
}

fn print_block(block: &ContentBlock, full: bool) {
    match block {
        ContentBlock::Text { text } => println!("{}", text),
        ContentBlock::Thinking { text } => {
            if full {
                println!("[Thinking]\n{}", text);
            } else {
                println!("[Thinking omitted, use --full]");
            }
        }
        ContentBlock::ToolUse { name, .. } => println!("[Tool: {}]", name),
        ContentBlock::ToolResult { text, .. } => {
            if full {
                println!("[Tool result]\n{}", text);
            } else {
                println!("[Tool result omitted, use --full]");
            }
        }
        ContentBlock::Unknown { block_type, .. } => println!("[{} block]", block_type),
    }
}
