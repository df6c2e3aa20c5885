//! The in-progress editing buffer.

use sl_core::{Choice, Puzzle, Scene, SceneId, SceneKind};

use crate::error::{AuthorError, AuthorResult};

/// A scene being written, before it is saved into the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Narrative body.
    pub text: String,
    /// Scene kind.
    pub kind: SceneKind,
    /// Choice slots. Ignored when saving a puzzle.
    pub choices: Vec<Choice>,
    /// The riddle. Required for puzzles, dropped otherwise.
    pub puzzle: Option<Puzzle>,
}

impl Draft {
    /// A narrative draft with `slots` blank choices.
    pub fn with_slots(slots: usize) -> Self {
        Self {
            choices: vec![Choice::default(); slots],
            ..Self::default()
        }
    }

    /// A draft holding a copy of an existing scene.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            text: scene.text.clone(),
            kind: scene.kind,
            choices: scene.choices.clone(),
            puzzle: scene.puzzle.clone(),
        }
    }

    /// A narrative draft with the given text and choice labels.
    pub fn narrative<I, S>(text: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            kind: SceneKind::Narrative,
            choices: choices.into_iter().map(Choice::new).collect(),
            puzzle: None,
        }
    }

    /// A puzzle draft.
    pub fn puzzle(text: impl Into<String>, puzzle: Puzzle) -> Self {
        Self {
            text: text.into(),
            kind: SceneKind::Puzzle,
            choices: Vec::new(),
            puzzle: Some(puzzle),
        }
    }

    /// Set the kind.
    pub fn with_kind(mut self, kind: SceneKind) -> Self {
        self.kind = kind;
        self
    }

    /// Append a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// The choice labels, in slot order.
    pub fn choice_texts(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.text.clone()).collect()
    }

    /// The save-time guards.
    pub(crate) fn check(&self) -> AuthorResult<()> {
        if self.text.trim().is_empty() {
            return Err(AuthorError::EmptyNarrative);
        }
        if self.kind == SceneKind::Puzzle {
            if self.puzzle.is_none() {
                return Err(AuthorError::MissingPuzzle);
            }
        } else if self.choices.iter().all(Choice::is_blank) {
            return Err(AuthorError::NoChoices);
        }
        Ok(())
    }

    /// Build the stored scene. Puzzles lose their choices, other kinds lose their puzzle.
    pub(crate) fn into_scene(self, id: SceneId) -> Scene {
        let (choices, puzzle) = if self.kind == SceneKind::Puzzle {
            let puzzle = self.puzzle.map(|p| {
                let max_attempts = p.max_attempts;
                p.with_max_attempts(max_attempts)
            });
            (Vec::new(), puzzle)
        } else {
            (self.choices, None)
        };
        Scene {
            id,
            text: self.text,
            kind: self.kind,
            choices,
            puzzle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::Solution;

    #[test]
    fn blank_text_rejected() {
        let draft = Draft::narrative("   ", ["Go"]);
        assert!(matches!(draft.check(), Err(AuthorError::EmptyNarrative)));
    }

    #[test]
    fn all_blank_choices_rejected() {
        let draft = Draft::narrative("A hall.", ["", "  "]);
        assert!(matches!(draft.check(), Err(AuthorError::NoChoices)));
        let draft = Draft::narrative("A hall.", Vec::<String>::new());
        assert!(matches!(draft.check(), Err(AuthorError::NoChoices)));
    }

    #[test]
    fn puzzle_needs_no_choices_but_needs_a_puzzle() {
        let draft = Draft::puzzle("A sphinx.", Puzzle::new("?", Solution::default()));
        assert!(draft.check().is_ok());

        let draft = Draft::narrative("A sphinx.", Vec::<String>::new()).with_kind(SceneKind::Puzzle);
        assert!(matches!(draft.check(), Err(AuthorError::MissingPuzzle)));
    }

    #[test]
    fn into_scene_normalizes_by_kind() {
        let mut draft = Draft::narrative("A hall.", ["Go"]);
        draft.puzzle = Some(Puzzle::new("?", Solution::default()));
        let scene = draft.into_scene(SceneId::numbered(1));
        assert!(scene.puzzle.is_none());
        assert_eq!(scene.choices.len(), 1);

        let mut puzzle = Puzzle::new("?", Solution::default());
        puzzle.max_attempts = 0;
        let draft = Draft::puzzle("A sphinx.", puzzle).with_choice(Choice::new("Flee"));
        let scene = draft.into_scene(SceneId::numbered(2));
        assert!(scene.choices.is_empty());
        assert_eq!(scene.puzzle.unwrap().max_attempts, 1);
    }

    #[test]
    fn with_slots_are_blank() {
        let draft = Draft::with_slots(3);
        assert_eq!(draft.choice_texts(), ["", "", ""]);
    }
}
