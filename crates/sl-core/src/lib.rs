//! Core types for Storyloom: scenes, choices, puzzles, and the story graph.
//!
//! This crate defines the data model that the editor writes and the player
//! reads. It is independent of both: you can build a [`StoryGraph`]
//! programmatically or import one from a JSON snapshot, which is checked by
//! [`validate`] before it is trusted.

/// Error types used throughout the crate.
pub mod error;
/// The story graph aggregate and its read-only accessors.
pub mod graph;
/// Scene, choice, and puzzle types.
pub mod scene;
/// JSON snapshot import and export.
pub mod snapshot;
/// Structural validation of untrusted snapshot values.
pub mod validate;

/// Re-export error types.
pub use error::{StoryError, StoryResult};
/// Re-export graph types.
pub use graph::{DanglingReference, Link, StoryGraph, Transition};
/// Re-export scene types.
pub use scene::{Choice, Puzzle, Scene, SceneId, SceneKind, Solution};
/// Re-export snapshot helpers.
pub use snapshot::{export_file_name, parse_snapshot, to_snapshot_string};
/// Re-export the validation engine.
pub use validate::{ValidationReport, validate};
