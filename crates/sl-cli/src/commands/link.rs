use std::path::Path;

pub fn run(file: &Path, scene: &str, choice: usize, target: &str) -> Result<(), String> {
    let mut editor = super::load_editor(file)?;
    let index = super::choice_index(choice)?;

    editor
        .link_choice_to_existing(scene, index, target)
        .map_err(|e| e.to_string())?;
    super::save_story(file, editor.graph())?;

    println!("  Choice {choice} of {scene} now leads to {target}");

    Ok(())
}
