//! Player-side runtime for Storyloom stories.
//!
//! A [`TraversalSession`] holds the navigation history and visited set for
//! one playthrough. The story graph itself is never modified during play; it
//! is passed by reference into every transition. Puzzle scenes are answered
//! through the [`puzzle`] evaluator, which counts attempts and reveals hints.

/// Error types for play.
pub mod error;
/// Puzzle answer matching and the attempt state machine.
pub mod puzzle;
/// The traversal state machine.
pub mod session;

pub use error::{PlayError, PlayResult};
pub use puzzle::{PuzzleAttempts, PuzzleOutcome, evaluate};
pub use session::{HistoryEntry, TraversalSession, VisibleChoice};
