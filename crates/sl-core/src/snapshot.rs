//! JSON snapshot import and export.
//!
//! The snapshot is the single unit of file export, import, and autosave:
//! `{ startSceneId, title?, scenes: { [id]: Scene } }`.

use serde_json::Value;

use crate::error::{StoryError, StoryResult};
use crate::graph::StoryGraph;
use crate::validate::validate;

/// Parse, validate, and decode a snapshot.
///
/// On failure nothing is returned but the error, so a caller's current graph
/// stays untouched.
pub fn parse_snapshot(text: &str) -> StoryResult<StoryGraph> {
    let value: Value = serde_json::from_str(text).map_err(StoryError::Json)?;
    import_value(value)
}

/// Validate and decode an already parsed snapshot value.
pub fn import_value(value: Value) -> StoryResult<StoryGraph> {
    let report = validate(&value);
    if !report.is_ok() {
        return Err(StoryError::Invalid(report.into_errors()));
    }
    serde_json::from_value(value).map_err(StoryError::Decode)
}

/// Serialize a graph as pretty-printed snapshot JSON.
pub fn to_snapshot_string(graph: &StoryGraph) -> StoryResult<String> {
    serde_json::to_string_pretty(graph).map_err(StoryError::Serialize)
}

/// The export file name: `"{title or 'story'}-story.json"`.
pub fn export_file_name(graph: &StoryGraph) -> String {
    let title = graph
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("story");
    format!("{title}-story.json")
}
