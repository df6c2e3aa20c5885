//! Error types for the authoring engine.

use sl_core::{SceneId, StoryError};
use thiserror::Error;

/// Result type for authoring operations.
pub type AuthorResult<T> = Result<T, AuthorError>;

/// Result type for generation calls.
pub type AssistResult<T> = Result<T, AssistError>;

/// Errors that can occur while editing a story. None of them change the graph.
#[derive(Debug, Error)]
pub enum AuthorError {
    /// Scene text is blank.
    #[error("scene text cannot be empty")]
    EmptyNarrative,

    /// A non-puzzle scene has no choice with text.
    #[error("add at least one choice with text")]
    NoChoices,

    /// A puzzle scene was saved without a puzzle.
    #[error("a puzzle scene needs a puzzle")]
    MissingPuzzle,

    /// The scene id is unknown.
    #[error("scene not found: {0}")]
    SceneNotFound(SceneId),

    /// The scene has no choice at this index.
    #[error("scene {scene} has no choice {}", .index + 1)]
    ChoiceOutOfRange {
        /// The scene.
        scene: SceneId,
        /// The requested index.
        index: usize,
    },

    /// The choice already leads somewhere.
    #[error("choice {} of scene {scene} is already linked", .index + 1)]
    ChoiceLinked {
        /// The scene.
        scene: SceneId,
        /// The linked choice.
        index: usize,
    },

    /// Removing the slot would leave the scene without choices.
    #[error("scene {0} must keep at least one choice slot")]
    LastChoiceSlot(SceneId),

    /// Puzzle scenes have no choice slots.
    #[error("scene {0} is a puzzle and has no choices")]
    PuzzleScene(SceneId),

    /// The story already has a root scene.
    #[error("the story already has a root scene")]
    RootExists,

    /// No draft is open for saving.
    #[error("nothing is being edited")]
    NotEditing,

    /// Narrative generation needs a pending branch to write for.
    #[error("no branch is waiting for a scene")]
    NoPendingBranch,

    /// Reading or writing the save slot failed.
    #[error("save slot error: {0}")]
    Slot(#[from] std::io::Error),

    /// Importing a snapshot failed.
    #[error(transparent)]
    Story(#[from] StoryError),
}

/// Failures of the external text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistError {
    /// The request never got a response.
    #[error("generation service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("generation service returned status {0}")]
    Status(u16),

    /// The response body did not have the expected shape.
    #[error("generation service sent a malformed response: {0}")]
    Malformed(String),
}
