//! The story editor: the single place a story graph is mutated.
//!
//! Every operation checks all of its preconditions before touching the
//! graph, so a failed call leaves the graph exactly as it was.

use sl_core::{Choice, Scene, SceneId, SceneKind, StoryGraph, parse_snapshot};

use crate::assist::{
    AssistContext, AssistOutcome, AssistTicket, GameForm, NarrativeRequest, OutcomesRequest,
};
use crate::config::EditorConfig;
use crate::draft::Draft;
use crate::error::{AssistResult, AuthorError, AuthorResult};

/// What the open draft will be saved as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTarget {
    /// The story's first scene.
    Root,
    /// A new scene behind an unlinked choice.
    Child {
        /// Scene owning the choice.
        parent: SceneId,
        /// Index of the choice.
        choice: usize,
    },
    /// An existing scene, replaced in place.
    Existing(SceneId),
}

/// Authoring session over a story graph.
#[derive(Debug, Clone)]
pub struct StoryEditor {
    graph: StoryGraph,
    config: EditorConfig,
    draft: Draft,
    target: Option<DraftTarget>,
    epoch: u64,
}

impl Default for StoryEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl StoryEditor {
    /// An editor over an empty story, ready to write the root scene.
    pub fn new(config: EditorConfig) -> Self {
        Self::from_graph(StoryGraph::new(), config)
    }

    /// An editor over an existing story.
    pub fn from_graph(graph: StoryGraph, config: EditorConfig) -> Self {
        let draft = Draft::with_slots(config.initial_choice_slots);
        let target = (!graph.has_root()).then_some(DraftTarget::Root);
        Self {
            graph,
            config,
            draft,
            target,
            epoch: 0,
        }
    }

    /// The story being edited.
    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    /// Take the story out of the editor.
    pub fn into_graph(self) -> StoryGraph {
        self.graph
    }

    /// The editor configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The open draft.
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Mutable access to the open draft.
    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// What [`save_draft`](Self::save_draft) would save to, if anything.
    pub fn target(&self) -> Option<&DraftTarget> {
        self.target.as_ref()
    }

    /// The current editing context, for stamping generation requests.
    pub fn context(&self) -> AssistContext {
        AssistContext {
            epoch: self.epoch,
            target: self.target.clone(),
        }
    }

    /// Whether a context stamped earlier still matches.
    pub fn is_current(&self, context: &AssistContext) -> bool {
        context.epoch == self.epoch && context.target == self.target
    }

    /// Set the story title. A blank title clears it.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.graph.title = (!title.trim().is_empty()).then_some(title);
    }

    // -----------------------------------------------------------------------
    // Scene creation and editing
    // -----------------------------------------------------------------------

    /// Create the first scene and make it the start.
    pub fn create_root_scene(&mut self, draft: Draft) -> AuthorResult<SceneId> {
        if self.graph.has_root() {
            return Err(AuthorError::RootExists);
        }
        draft.check()?;

        let id = self.graph.next_scene_id();
        self.store(id.clone(), draft);
        self.graph.start_scene_id = id.clone();
        tracing::info!(scene = %id, "created root scene");

        if self.target == Some(DraftTarget::Root) {
            self.close_draft();
        }
        Ok(id)
    }

    /// Open a draft for the scene behind an unlinked choice.
    ///
    /// The graph is not changed until the draft is saved.
    pub fn expand_branch(&mut self, parent: &str, choice: usize) -> AuthorResult<()> {
        let scene = self.scene(parent)?;
        let linked = scene
            .active_choices()
            .get(choice)
            .ok_or_else(|| AuthorError::ChoiceOutOfRange {
                scene: scene.id.clone(),
                index: choice,
            })?
            .next_scene_id
            .is_some();
        if linked {
            return Err(AuthorError::ChoiceLinked {
                scene: scene.id.clone(),
                index: choice,
            });
        }

        let target = DraftTarget::Child {
            parent: scene.id.clone(),
            choice,
        };
        tracing::debug!(draft_target = ?target, "expanding branch");
        let draft = self.fresh_draft();
        self.open_draft(target, draft);
        Ok(())
    }

    /// Load an existing scene into the draft.
    pub fn begin_edit(&mut self, id: &str) -> AuthorResult<()> {
        let scene = self.scene(id)?;
        let target = DraftTarget::Existing(scene.id.clone());
        let draft = Draft::from_scene(scene);
        tracing::debug!(draft_target = ?target, "editing scene");
        self.open_draft(target, draft);
        Ok(())
    }

    /// Drop the open draft.
    pub fn cancel(&mut self) {
        tracing::debug!(draft_target = ?self.target, "draft cancelled");
        self.close_draft();
    }

    /// Save the open draft to its target and close it.
    pub fn save_draft(&mut self) -> AuthorResult<SceneId> {
        let draft = self.draft.clone();
        let id = match self.target.clone() {
            None => return Err(AuthorError::NotEditing),
            Some(DraftTarget::Root) => return self.create_root_scene(draft),
            Some(DraftTarget::Child { parent, choice }) => {
                self.commit_child(&parent, choice, draft)?
            }
            Some(DraftTarget::Existing(id)) => {
                self.edit_scene(id.as_str(), draft)?;
                id
            }
        };
        self.close_draft();
        Ok(id)
    }

    fn commit_child(&mut self, parent: &SceneId, choice: usize, draft: Draft) -> AuthorResult<SceneId> {
        // The parent may have changed since the branch was opened.
        let scene = self.scene(parent.as_str())?;
        match scene.active_choices().get(choice) {
            None => {
                return Err(AuthorError::ChoiceOutOfRange {
                    scene: parent.clone(),
                    index: choice,
                });
            }
            Some(c) if c.next_scene_id.is_some() => {
                return Err(AuthorError::ChoiceLinked {
                    scene: parent.clone(),
                    index: choice,
                });
            }
            Some(_) => {}
        }
        draft.check()?;

        let id = self.graph.next_scene_id();
        self.store(id.clone(), draft);
        if let Some(slot) = self
            .graph
            .scene_mut(parent.as_str())
            .and_then(|s| s.choices.get_mut(choice))
        {
            slot.next_scene_id = Some(id.clone());
        }
        tracing::info!(scene = %id, %parent, choice, "created branch scene");
        Ok(id)
    }

    /// Replace text, kind, choices and puzzle of an existing scene.
    ///
    /// The id stays the same and links pointing at the scene are untouched.
    pub fn edit_scene(&mut self, id: &str, draft: Draft) -> AuthorResult<()> {
        let id = self.scene(id)?.id.clone();
        draft.check()?;
        self.store(id.clone(), draft);
        tracing::info!(scene = %id, "edited scene");
        Ok(())
    }

    /// Point a choice at a scene that already exists.
    pub fn link_choice_to_existing(
        &mut self,
        scene_id: &str,
        choice: usize,
        target: &str,
    ) -> AuthorResult<()> {
        let target = self.scene(target)?.id.clone();
        let scene = self.scene(scene_id)?;
        let id = scene.id.clone();
        if choice >= scene.active_choices().len() {
            return Err(AuthorError::ChoiceOutOfRange { scene: id, index: choice });
        }

        if let Some(slot) = self
            .graph
            .scene_mut(id.as_str())
            .and_then(|s| s.choices.get_mut(choice))
        {
            slot.next_scene_id = Some(target.clone());
        }
        if let Some(slot) = self
            .draft_of(&id)
            .and_then(|d| d.choices.get_mut(choice))
        {
            slot.next_scene_id = Some(target.clone());
        }
        // A pending branch on this choice is now pointless.
        if self.target
            == Some(DraftTarget::Child {
                parent: id.clone(),
                choice,
            })
        {
            self.close_draft();
        }
        tracing::info!(scene = %id, choice, to = %target, "linked choice");
        Ok(())
    }

    /// Append an empty choice slot. Returns its index.
    pub fn add_choice_slot(&mut self, scene_id: &str) -> AuthorResult<usize> {
        let scene = self.scene(scene_id)?;
        if scene.is_puzzle() {
            return Err(AuthorError::PuzzleScene(scene.id.clone()));
        }
        let id = scene.id.clone();

        let mut index = 0;
        if let Some(scene) = self.graph.scene_mut(id.as_str()) {
            scene.choices.push(Choice::default());
            index = scene.choices.len() - 1;
        }
        if let Some(draft) = self.draft_of(&id) {
            draft.choices.push(Choice::default());
        }
        tracing::debug!(scene = %id, index, "added choice slot");
        Ok(index)
    }

    /// Remove an unlinked choice slot, keeping at least one.
    pub fn remove_choice_slot(&mut self, scene_id: &str, choice: usize) -> AuthorResult<()> {
        let scene = self.scene(scene_id)?;
        let id = scene.id.clone();
        if scene.is_puzzle() {
            return Err(AuthorError::PuzzleScene(id));
        }
        let slot = scene
            .choices
            .get(choice)
            .ok_or_else(|| AuthorError::ChoiceOutOfRange {
                scene: id.clone(),
                index: choice,
            })?;
        if slot.next_scene_id.is_some() {
            return Err(AuthorError::ChoiceLinked { scene: id, index: choice });
        }
        if scene.choices.len() <= 1 {
            return Err(AuthorError::LastChoiceSlot(id));
        }

        if let Some(scene) = self.graph.scene_mut(id.as_str()) {
            scene.choices.remove(choice);
        }
        if let Some(draft) = self.draft_of(&id) {
            if choice < draft.choices.len() {
                draft.choices.remove(choice);
            }
            // Outcome tickets address the draft's choices by position.
            self.epoch += 1;
        }
        // Keep a pending branch on this scene pointing at the same slot.
        let mut orphaned = false;
        if let Some(DraftTarget::Child { parent, choice: pending }) = &mut self.target
            && *parent == id
        {
            if *pending == choice {
                orphaned = true;
            } else if *pending > choice {
                *pending -= 1;
            }
        }
        if orphaned {
            self.close_draft();
        }
        tracing::debug!(scene = %id, choice, "removed choice slot");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Whole-story operations
    // -----------------------------------------------------------------------

    /// Start over with an empty story.
    pub fn reset(&mut self) {
        tracing::info!("story reset");
        self.replace_graph(StoryGraph::new());
    }

    /// Swap in another story, dropping any open draft.
    pub fn replace_graph(&mut self, graph: StoryGraph) {
        self.graph = graph;
        self.close_draft();
    }

    /// Import a snapshot. On error the current story is kept.
    pub fn import_snapshot(&mut self, text: &str) -> AuthorResult<()> {
        let graph = parse_snapshot(text)?;
        tracing::info!(scenes = graph.scene_count(), "imported story");
        self.replace_graph(graph);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Generation assist
    // -----------------------------------------------------------------------

    /// Ask for an opening scene. Only valid before the root exists.
    pub fn request_intro(&self, form: &GameForm) -> AuthorResult<AssistTicket<GameForm>> {
        if self.graph.has_root() {
            return Err(AuthorError::RootExists);
        }
        Ok(AssistTicket {
            context: self.context(),
            request: form.clone(),
        })
    }

    /// Ask for the scene behind the pending branch.
    pub fn request_narrative(&self) -> AuthorResult<AssistTicket<NarrativeRequest>> {
        let Some(DraftTarget::Child { parent, choice }) = &self.target else {
            return Err(AuthorError::NoPendingBranch);
        };
        let scene = self.scene(parent.as_str())?;
        let slot = scene
            .choices
            .get(*choice)
            .ok_or_else(|| AuthorError::ChoiceOutOfRange {
                scene: parent.clone(),
                index: *choice,
            })?;
        Ok(AssistTicket {
            context: self.context(),
            request: NarrativeRequest {
                parent_text: scene.text.clone(),
                choice_text: slot.text.clone(),
                outcome_text: slot.outcome.clone(),
            },
        })
    }

    /// Ask for outcome suggestions for the draft's choices.
    pub fn request_outcomes(&self) -> AuthorResult<AssistTicket<OutcomesRequest>> {
        if self.target.is_none() {
            return Err(AuthorError::NotEditing);
        }
        Ok(AssistTicket {
            context: self.context(),
            request: OutcomesRequest {
                scene: self.draft.text.clone(),
                choices: self.draft.choice_texts(),
            },
        })
    }

    /// Put a generated intro into the root draft and take the form's title.
    pub fn apply_intro(
        &mut self,
        ticket: &AssistTicket<GameForm>,
        result: AssistResult<String>,
    ) -> AssistOutcome {
        match self.accept(&ticket.context, result, "intro") {
            Ok(intro) => {
                self.draft.text = intro;
                self.set_title(ticket.request.game_title.clone());
                AssistOutcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    /// Put generated narrative into the draft.
    pub fn apply_narrative(
        &mut self,
        ticket: &AssistTicket<NarrativeRequest>,
        result: AssistResult<String>,
    ) -> AssistOutcome {
        match self.accept(&ticket.context, result, "narrative") {
            Ok(narrative) => {
                self.draft.text = narrative;
                AssistOutcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    /// Fill in outcomes position by position. Missing entries keep the old outcome.
    pub fn apply_outcomes(
        &mut self,
        ticket: &AssistTicket<OutcomesRequest>,
        result: AssistResult<Vec<Option<String>>>,
    ) -> AssistOutcome {
        match self.accept(&ticket.context, result, "outcomes") {
            Ok(outcomes) => {
                for (slot, outcome) in self.draft.choices.iter_mut().zip(outcomes) {
                    if let Some(outcome) = outcome {
                        slot.outcome = outcome;
                    }
                }
                AssistOutcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    fn accept<T>(
        &self,
        context: &AssistContext,
        result: AssistResult<T>,
        what: &str,
    ) -> Result<T, AssistOutcome> {
        if !self.is_current(context) {
            tracing::warn!(what, "discarding stale generation result");
            return Err(AssistOutcome::Stale);
        }
        result.map_err(|err| {
            tracing::warn!(what, %err, "generation failed");
            AssistOutcome::Failed(err)
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn scene(&self, id: &str) -> AuthorResult<&Scene> {
        self.graph
            .get_scene(id)
            .ok_or_else(|| AuthorError::SceneNotFound(SceneId::new(id)))
    }

    fn fresh_draft(&self) -> Draft {
        Draft::with_slots(self.config.initial_choice_slots)
    }

    fn open_draft(&mut self, target: DraftTarget, draft: Draft) {
        self.target = Some(target);
        self.draft = draft;
        self.epoch += 1;
    }

    fn close_draft(&mut self) {
        self.target = (!self.graph.has_root()).then_some(DraftTarget::Root);
        self.draft = self.fresh_draft();
        self.epoch += 1;
    }

    /// The open draft, if it is a copy of scene `id`.
    fn draft_of(&mut self, id: &SceneId) -> Option<&mut Draft> {
        match &self.target {
            Some(DraftTarget::Existing(open)) if open == id => Some(&mut self.draft),
            _ => None,
        }
    }

    /// Write a checked draft under `id`, then wire any open puzzle outcome.
    fn store(&mut self, id: SceneId, draft: Draft) {
        self.graph.put_scene(draft.into_scene(id.clone()));
        self.complete_puzzle(&id);
    }

    fn complete_puzzle(&mut self, id: &SceneId) {
        let Some(puzzle) = self.graph.get_scene(id.as_str()).and_then(Scene::active_puzzle) else {
            return;
        };
        let needs_success = puzzle.success_next_scene_id.is_none();
        let needs_fail = puzzle.fail_next_scene_id.is_none();

        if needs_success {
            let text = self.config.success_placeholder.clone();
            let end = self.add_placeholder(text);
            if let Some(puzzle) = self.graph.scene_mut(id.as_str()).and_then(|s| s.puzzle.as_mut()) {
                puzzle.success_next_scene_id = Some(end);
            }
        }
        if needs_fail {
            let text = self.config.fail_placeholder.clone();
            let end = self.add_placeholder(text);
            if let Some(puzzle) = self.graph.scene_mut(id.as_str()).and_then(|s| s.puzzle.as_mut()) {
                puzzle.fail_next_scene_id = Some(end);
            }
        }
    }

    fn add_placeholder(&mut self, text: String) -> SceneId {
        let id = self.graph.next_scene_id();
        self.graph
            .put_scene(Scene::new(id.clone(), text, SceneKind::Narrative));
        tracing::debug!(scene = %id, "created placeholder ending");
        id
    }
}
