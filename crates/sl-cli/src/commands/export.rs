use std::fs;
use std::path::Path;

use sl_core::export_file_name;

pub fn run(file: &Path, out: &Path) -> Result<(), String> {
    let graph = super::load_story(file)?;

    fs::create_dir_all(out).map_err(|e| format!("cannot create {}: {e}", out.display()))?;
    let target = out.join(export_file_name(&graph));
    super::save_story(&target, &graph)?;

    println!("  Exported {} scenes to {}", graph.scene_count(), target.display());

    Ok(())
}
