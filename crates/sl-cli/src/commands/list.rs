use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use sl_core::{Scene, SceneId, StoryGraph};

pub fn run(file: &Path) -> Result<(), String> {
    let graph = super::load_story(file)?;

    if graph.is_empty() {
        println!("  No scenes yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Type", "Text", "Leads to"]);

    for scene in graph.list_scenes() {
        let id = if scene.id == graph.start_scene_id {
            format!("{} (start)", scene.id)
        } else {
            scene.id.to_string()
        };
        table.add_row(vec![
            id,
            scene.kind.to_string(),
            super::excerpt(&scene.text, 50),
            links(&graph, scene),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} scenes", graph.scene_count());

    Ok(())
}

/// One line per outgoing link: `label → target`.
fn links(graph: &StoryGraph, scene: &Scene) -> String {
    let describe = |target: Option<&SceneId>| match target {
        None => "(open)".to_string(),
        Some(id) if graph.contains(id.as_str()) => id.to_string(),
        Some(id) => format!("{id} (missing)"),
    };

    if let Some(puzzle) = scene.active_puzzle() {
        return format!(
            "solved → {}\nfailed → {}",
            describe(puzzle.success_next_scene_id.as_ref()),
            describe(puzzle.fail_next_scene_id.as_ref())
        );
    }

    let lines: Vec<String> = scene
        .active_choices()
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            format!(
                "{}. {} → {}",
                i + 1,
                super::excerpt(&choice.text, 24),
                describe(choice.next_scene_id.as_ref())
            )
        })
        .collect();
    if lines.is_empty() {
        "—".to_string()
    } else {
        lines.join("\n")
    }
}
