//! Structural validation of untrusted snapshot values.
//!
//! Checks the shape a snapshot must have before it is decoded into a
//! [`StoryGraph`](crate::StoryGraph). Every violation is collected so the
//! caller can show the full list at once. Referential integrity of
//! `nextSceneId` links and the contents of puzzle objects are not checked
//! here; dangling links are tolerated at play time.

use std::fmt;

use serde_json::Value;

/// The outcome of validating a candidate snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    /// True when no violations were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The violations, in the order they were found.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consume the report, returning the violations.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn push(&mut self, message: String) {
        self.errors.push(message);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "ok");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Validate a candidate snapshot value.
pub fn validate(candidate: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(root) = candidate.as_object() else {
        report.push("File is not a JSON object.".to_string());
        return report;
    };

    match root.get("startSceneId") {
        Some(Value::String(id)) if !id.is_empty() => {}
        _ => report.push("Missing or invalid startSceneId (must be a string).".to_string()),
    }

    let Some(scenes) = root.get("scenes").and_then(Value::as_object) else {
        report.push("Missing or invalid scenes object.".to_string());
        return report;
    };

    for (id, scene) in scenes {
        let Some(scene) = scene.as_object() else {
            report.push(format!("Scene \"{id}\" is not an object."));
            continue;
        };
        if scene.get("id").and_then(Value::as_str) != Some(id.as_str()) {
            report.push(format!("Scene \"{id}\" must have matching id property."));
        }
        if !scene.get("text").is_some_and(Value::is_string) {
            report.push(format!("Scene \"{id}\" text must be a string."));
        }
        if !scene.get("choices").is_some_and(Value::is_array) {
            report.push(format!("Scene \"{id}\" choices must be an array."));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_story() {
        let candidate = json!({
            "startSceneId": "scene-1",
            "scenes": {
                "scene-1": {"id": "scene-1", "text": "Once upon a time.", "choices": []}
            }
        });
        let report = validate(&candidate);
        assert!(report.is_ok(), "{report}");
    }

    #[test]
    fn rejects_non_objects_with_single_error() {
        for candidate in [json!(null), json!([1, 2]), json!("story"), json!(4)] {
            let report = validate(&candidate);
            assert_eq!(report.errors(), ["File is not a JSON object."]);
        }
    }

    #[test]
    fn missing_start_and_scenes_both_reported() {
        let report = validate(&json!({}));
        assert_eq!(
            report.errors(),
            [
                "Missing or invalid startSceneId (must be a string).",
                "Missing or invalid scenes object.",
            ]
        );
    }

    #[test]
    fn non_string_start_scene_id() {
        let report = validate(&json!({"startSceneId": 1, "scenes": {}}));
        assert_eq!(report.errors().len(), 1);
        assert!(report.errors()[0].contains("startSceneId"));
    }

    #[test]
    fn scenes_must_be_object_shaped() {
        let report = validate(&json!({"startSceneId": "scene-1", "scenes": []}));
        assert_eq!(report.errors(), ["Missing or invalid scenes object."]);
    }

    #[test]
    fn every_scene_violation_is_reported() {
        let candidate = json!({
            "startSceneId": "scene-1",
            "scenes": {
                "scene-1": {"id": "scene-2", "text": "ok", "choices": []},
                "scene-2": {"id": "scene-2", "text": 7, "choices": []},
                "scene-3": {"id": "scene-3", "text": "ok", "choices": {}},
                "scene-4": "not a scene",
                "scene-5": {"text": null}
            }
        });
        let report = validate(&candidate);
        assert_eq!(
            report.errors(),
            [
                "Scene \"scene-1\" must have matching id property.",
                "Scene \"scene-2\" text must be a string.",
                "Scene \"scene-3\" choices must be an array.",
                "Scene \"scene-4\" is not an object.",
                "Scene \"scene-5\" must have matching id property.",
                "Scene \"scene-5\" text must be a string.",
                "Scene \"scene-5\" choices must be an array.",
            ]
        );
        assert!(!report.is_ok());
    }

    #[test]
    fn dangling_links_and_puzzles_are_not_checked() {
        let candidate = json!({
            "startSceneId": "scene-1",
            "scenes": {
                "scene-1": {
                    "id": "scene-1",
                    "text": "A locked door.",
                    "type": "puzzle",
                    "choices": [{"text": "Leave", "outcome": "", "nextSceneId": "nowhere"}],
                    "puzzle": {"solution": "garbage"}
                }
            }
        });
        assert!(validate(&candidate).is_ok());
    }
}
