use std::fs;
use std::path::Path;

use colored::Colorize;
use sl_core::{StoryError, parse_snapshot};

pub fn run(file: &Path) -> Result<(), String> {
    let text =
        fs::read_to_string(file).map_err(|e| format!("cannot read {}: {e}", file.display()))?;

    let graph = match parse_snapshot(&text) {
        Ok(graph) => graph,
        Err(StoryError::Invalid(errors)) => {
            for error in &errors {
                eprintln!("  {} {error}", "✗".red());
            }
            return Err(format!(
                "{} validation error{}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
        }
        Err(e) => return Err(e.to_string()),
    };

    if !graph.has_root() {
        eprintln!(
            "  {} start scene {} does not exist",
            "warning:".yellow(),
            graph.start_scene_id
        );
    }
    for dangling in graph.dangling_references() {
        eprintln!(
            "  {} {} of {} leads to missing scene {}",
            "warning:".yellow(),
            dangling.link,
            dangling.from,
            dangling.target
        );
    }

    println!("  All checks passed for '{}'.", file.display());
    println!(
        "  {} scenes, starting at {}",
        graph.scene_count(),
        graph.start_scene_id
    );

    Ok(())
}
