use std::path::Path;

use sl_author::NarrativeService;

pub fn run(file: &Path, scene: &str, choice: usize, args: &super::SceneArgs) -> Result<(), String> {
    let mut editor = super::load_editor(file)?;
    let index = super::choice_index(choice)?;

    editor
        .expand_branch(scene, index)
        .map_err(|e| e.to_string())?;
    *editor.draft_mut() = args.draft()?;

    if args.generate {
        let ticket = editor.request_narrative().map_err(|e| e.to_string())?;
        let result = super::block_on(super::generator().generate_narrative(&ticket.request))?;
        super::report_assist(&editor.apply_narrative(&ticket, result));
    }

    let before = editor.graph().scene_count();
    let id = editor.save_draft().map_err(|e| e.to_string())?;
    super::save_story(file, editor.graph())?;

    println!("  Created {id} behind choice {choice} of {scene}");
    let placeholders = editor.graph().scene_count() - before - 1;
    if placeholders > 0 {
        println!("  Added {placeholders} placeholder ending(s) for the puzzle");
    }

    Ok(())
}
