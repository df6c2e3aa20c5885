//! Configuration for the story editor.

use std::time::Duration;

/// Configuration for a [`StoryEditor`](crate::StoryEditor) and its autosave.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Quiet period after the last change before autosave writes.
    pub autosave_delay: Duration,
    /// Text of the scene auto-created behind an unwired puzzle success.
    pub success_placeholder: String,
    /// Text of the scene auto-created behind an unwired puzzle failure.
    pub fail_placeholder: String,
    /// Name of the autosave slot.
    pub slot_name: String,
    /// Blank choice slots in a fresh draft.
    pub initial_choice_slots: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay: Duration::from_millis(300),
            success_placeholder: "You succeeded. The story ends here.".to_string(),
            fail_placeholder: "You failed. The story ends here.".to_string(),
            slot_name: "storyloom_story_v1".to_string(),
            initial_choice_slots: 2,
        }
    }
}

impl EditorConfig {
    /// Set the autosave debounce delay.
    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    /// Set the texts of auto-created puzzle outcome scenes.
    pub fn with_placeholders(
        mut self,
        success: impl Into<String>,
        fail: impl Into<String>,
    ) -> Self {
        self.success_placeholder = success.into();
        self.fail_placeholder = fail.into();
        self
    }

    /// Set the autosave slot name.
    pub fn with_slot_name(mut self, name: impl Into<String>) -> Self {
        self.slot_name = name.into();
        self
    }

    /// Set the number of blank choice slots in a fresh draft (at least 1).
    pub fn with_initial_choice_slots(mut self, slots: usize) -> Self {
        self.initial_choice_slots = slots.max(1);
        self
    }
}
