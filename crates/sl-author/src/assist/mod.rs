//! Text generation assist.
//!
//! The editor issues a request as an [`AssistTicket`], which pairs the
//! request body with the editing context it was made for. The caller runs
//! the request against a [`NarrativeService`] however it likes and hands the
//! result back to the editor together with the ticket:
//!
//! ```no_run
//! # async fn demo(editor: &mut sl_author::StoryEditor, service: &sl_author::assist::HttpGenerator)
//! # -> sl_author::AuthorResult<()> {
//! use sl_author::NarrativeService;
//!
//! let ticket = editor.request_narrative()?;
//! let result = service.generate_narrative(&ticket.request).await;
//! editor.apply_narrative(&ticket, result);
//! # Ok(())
//! # }
//! ```
//!
//! If the author switched to another scene or branch in the meantime the
//! ticket no longer matches and the result is discarded. A call that never
//! resolves simply never gets applied.

mod http;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::editor::DraftTarget;
use crate::error::{AssistError, AssistResult};

pub use http::HttpGenerator;

/// Game metadata sent to `generate-game` to write the opening scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameForm {
    /// Story title. Becomes the graph title when the intro is applied.
    pub game_title: String,
    /// Genre, e.g. "Fantasy".
    pub genre: String,
    /// Where the story takes place.
    pub setting: String,
    /// Tone, e.g. "Serious".
    pub tone: String,
    /// The protagonist.
    pub main_character: String,
    /// What the protagonist wants.
    pub goal: String,
    /// Whether the author plans to use puzzle scenes.
    pub puzzles_enabled: bool,
    /// Whether the author plans to use dialogue scenes.
    pub npc_enabled: bool,
}

impl GameForm {
    /// A form with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            game_title: title.into(),
            ..Self::default()
        }
    }
}

/// Body of `generate-narrative`: write the scene behind a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    /// Text of the scene the choice belongs to.
    pub parent_text: String,
    /// The choice label.
    pub choice_text: String,
    /// The choice's authoring outcome.
    pub outcome_text: String,
}

/// Body of `generate-outcomes`: suggest an outcome for each choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomesRequest {
    /// Scene text.
    pub scene: String,
    /// Choice labels, in slot order.
    pub choices: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IntroResponse {
    pub(crate) intro: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NarrativeResponse {
    pub(crate) narrative: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutcomesResponse {
    #[serde(default)]
    pub(crate) outcomes: Vec<Option<String>>,
}

/// The external text-generation collaborator.
///
/// Implementations are untrusted: any error or odd response is reported as
/// an [`AssistError`] and never reaches the graph.
pub trait NarrativeService {
    /// Write an opening scene from game metadata.
    fn generate_game(&self, form: &GameForm) -> impl Future<Output = AssistResult<String>> + Send;

    /// Write the scene that follows a choice.
    fn generate_narrative(
        &self,
        request: &NarrativeRequest,
    ) -> impl Future<Output = AssistResult<String>> + Send;

    /// Suggest outcomes, positionally aligned with the request's choices.
    /// `None` entries leave the existing outcome alone.
    fn generate_outcomes(
        &self,
        request: &OutcomesRequest,
    ) -> impl Future<Output = AssistResult<Vec<Option<String>>>> + Send;
}

/// The editing context a request was issued for.
///
/// Works as a cancellation token: once the editor's context moves on, old
/// contexts never match again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistContext {
    pub(crate) epoch: u64,
    pub(crate) target: Option<DraftTarget>,
}

impl AssistContext {
    /// What the draft was going to be saved as when the request was made.
    pub fn target(&self) -> Option<&DraftTarget> {
        self.target.as_ref()
    }
}

/// A generation request tied to the context it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistTicket<R> {
    /// The context stamp.
    pub context: AssistContext,
    /// The request body.
    pub request: R,
}

/// What happened to a generation result handed back to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistOutcome {
    /// The result was written into the draft.
    Applied,
    /// The author moved on; the result was dropped.
    Stale,
    /// The call failed; nothing changed and the author may retry.
    Failed(AssistError),
}

impl AssistOutcome {
    /// Whether the draft changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
