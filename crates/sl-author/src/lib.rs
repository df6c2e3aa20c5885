//! Authoring engine for Storyloom.
//!
//! [`StoryEditor`] is the only place a story graph is changed. Every
//! operation either applies completely or leaves the graph as it was. The
//! editor keeps an in-progress [`Draft`] and knows what the draft will be
//! saved as: the root scene, a new scene behind a dangling choice, or an
//! existing scene.
//!
//! Text generation is delegated to a [`NarrativeService`]. Requests carry the
//! editing context they were issued for, so a reply that arrives after the
//! author moved on is recognised and dropped. [`Autosaver`] batches changes
//! into debounced, best-effort writes to a [`SaveSlot`].

pub mod assist;
pub mod autosave;
pub mod config;
pub mod draft;
pub mod editor;
pub mod error;

pub use assist::{AssistOutcome, AssistTicket, GameForm, HttpGenerator, NarrativeService};
pub use autosave::{Autosaver, FileSlot, MemorySlot, SaveSlot};
pub use config::EditorConfig;
pub use draft::Draft;
pub use editor::{DraftTarget, StoryEditor};
pub use error::{AssistError, AssistResult, AuthorError, AuthorResult};
