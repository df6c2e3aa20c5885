//! Error types for play.

use sl_core::SceneId;
use thiserror::Error;

/// Result type for play operations.
pub type PlayResult<T> = Result<T, PlayError>;

/// Errors that can occur while playing a story.
#[derive(Debug, Error)]
pub enum PlayError {
    /// The story has no scenes to play.
    #[error("no story loaded: the story has no scenes")]
    EmptyStory,

    /// The current scene has no choice at this index.
    #[error("invalid choice: {}", .0 + 1)]
    InvalidChoice(usize),

    /// An answer was submitted on a scene that is not a puzzle.
    #[error("scene {0} is not a puzzle")]
    NotAPuzzle(SceneId),
}
