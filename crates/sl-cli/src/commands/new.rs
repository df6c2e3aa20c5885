use std::path::Path;

use sl_author::{GameForm, NarrativeService, StoryEditor};

pub fn run(
    file: &Path,
    title: Option<&str>,
    force: bool,
    args: &super::SceneArgs,
) -> Result<(), String> {
    if file.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            file.display()
        ));
    }

    let mut editor = StoryEditor::default();
    if let Some(title) = title {
        editor.set_title(title);
    }
    *editor.draft_mut() = args.draft()?;

    if args.generate {
        let form = GameForm::titled(title.unwrap_or_default());
        let ticket = editor.request_intro(&form).map_err(|e| e.to_string())?;
        let result = super::block_on(super::generator().generate_game(&ticket.request))?;
        super::report_assist(&editor.apply_intro(&ticket, result));
    }

    let id = editor.save_draft().map_err(|e| e.to_string())?;
    super::save_story(file, editor.graph())?;

    println!("  Created story '{}' starting at {id}", file.display());
    if editor.graph().scene_count() > 1 {
        println!(
            "  Added {} placeholder ending(s) for the puzzle",
            editor.graph().scene_count() - 1
        );
    }

    Ok(())
}
