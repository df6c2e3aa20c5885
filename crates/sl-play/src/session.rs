//! The traversal state machine.
//!
//! State is the navigation history plus a visited set. History starts with
//! the start scene and grows by one entry per transition; going back pops
//! it. The visited set only ever grows until a restart, so going back does
//! not "unvisit" a scene.

use std::collections::BTreeSet;

use sl_core::{Scene, SceneId, StoryGraph};

use crate::error::{PlayError, PlayResult};
use crate::puzzle::{PuzzleAttempts, PuzzleOutcome};

/// One step of the navigation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The scene shown at this step.
    pub scene_id: SceneId,
    /// The choice index taken to get here. `None` for the start and puzzle outcomes.
    pub choice: Option<usize>,
}

/// A choice as the player sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleChoice<'g> {
    /// Index into the scene's choices, for [`TraversalSession::choose`].
    pub index: usize,
    /// The label.
    pub text: &'g str,
    /// Whether the target exists. Disabled choices should not be offered.
    pub enabled: bool,
}

impl VisibleChoice<'_> {
    /// Why the choice is disabled, for a tooltip or status line.
    pub fn disabled_reason(&self) -> Option<&'static str> {
        (!self.enabled).then_some("This path has no next scene yet")
    }
}

/// Runtime state for one playthrough of a story.
///
/// The session never touches the graph; every operation that needs it takes
/// the graph by reference.
#[derive(Debug, Clone)]
pub struct TraversalSession {
    start: SceneId,
    history: Vec<HistoryEntry>,
    visited: BTreeSet<SceneId>,
    puzzle: PuzzleAttempts,
}

impl TraversalSession {
    /// Start a playthrough at the graph's start scene.
    pub fn new(graph: &StoryGraph) -> PlayResult<Self> {
        if graph.is_empty() {
            return Err(PlayError::EmptyStory);
        }
        Ok(Self::start_at(graph.start_scene_id.clone()))
    }

    /// Start a playthrough at a specific scene id.
    pub fn start_at(start: SceneId) -> Self {
        let mut session = Self {
            start,
            history: Vec::new(),
            visited: BTreeSet::new(),
            puzzle: PuzzleAttempts::new(),
        };
        session.restart();
        session
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// The id of the scene being shown.
    pub fn current_scene_id(&self) -> &SceneId {
        // History is never empty: it is seeded with the start and never popped below one entry.
        &self.history[self.history.len() - 1].scene_id
    }

    /// The scene being shown, if it exists in the graph.
    pub fn current_scene<'g>(&self, graph: &'g StoryGraph) -> Option<&'g Scene> {
        graph.get_scene(self.current_scene_id().as_str())
    }

    /// The navigation history, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Every scene id shown at least once since the last restart.
    pub fn visited(&self) -> &BTreeSet<SceneId> {
        &self.visited
    }

    /// Whether a scene has been shown since the last restart.
    pub fn has_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Wrong answers on the current puzzle scene.
    pub fn attempts(&self) -> u32 {
        self.puzzle.attempts()
    }

    /// Hints unlocked on the current puzzle scene.
    pub fn revealed_hints<'g>(&self, graph: &'g StoryGraph) -> &'g [String] {
        self.current_scene(graph)
            .and_then(Scene::active_puzzle)
            .map(|puzzle| self.puzzle.revealed_hints(puzzle))
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Take the choice at `index` on the current scene.
    ///
    /// A choice without a target is a self-transition: the same scene is
    /// pushed again, so the click still shows up in history.
    pub fn choose(&mut self, graph: &StoryGraph, index: usize) -> PlayResult<&SceneId> {
        let current = self.current_scene_id().clone();
        let choice = self
            .current_scene(graph)
            .and_then(|scene| scene.active_choices().get(index))
            .ok_or(PlayError::InvalidChoice(index))?;
        let next = choice.next_scene_id.clone().unwrap_or(current);

        tracing::debug!(choice = index, next = %next, "choice taken");
        self.push(HistoryEntry {
            scene_id: next,
            choice: Some(index),
        });
        Ok(self.current_scene_id())
    }

    /// Answer the puzzle on the current scene.
    ///
    /// On success or failure play moves to the wired outcome scene. An
    /// outcome with no target leaves play on the puzzle.
    pub fn submit_answer(&mut self, graph: &StoryGraph, answer: &str) -> PlayResult<PuzzleOutcome> {
        let current = self.current_scene_id().clone();
        let puzzle = self
            .current_scene(graph)
            .and_then(Scene::active_puzzle)
            .ok_or_else(|| PlayError::NotAPuzzle(current.clone()))?;

        let outcome = self.puzzle.submit(puzzle, answer);
        tracing::debug!(scene = %current, ?outcome, "puzzle answer submitted");
        if let Some(next) = outcome.next_scene() {
            self.push(HistoryEntry {
                scene_id: next.clone(),
                choice: None,
            });
        }
        Ok(outcome)
    }

    /// Pop the last history entry. Returns false at the start.
    pub fn go_back(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.history.pop();
        self.puzzle.reset();
        true
    }

    /// Reset history and visited to the start scene.
    pub fn restart(&mut self) {
        self.history.clear();
        self.visited.clear();
        self.puzzle.reset();
        self.push(HistoryEntry {
            scene_id: self.start.clone(),
            choice: None,
        });
    }

    /// Go back until history entry `index` is the current one.
    ///
    /// Returns false, changing nothing, when `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.history.len() {
            return false;
        }
        while self.history.len() > index + 1 {
            self.go_back();
        }
        true
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.visited.insert(entry.scene_id.clone());
        self.puzzle.reset();
        self.history.push(entry);
    }

    // -----------------------------------------------------------------------
    // Derived values
    // -----------------------------------------------------------------------

    /// Share of the story's scenes visited, capped at 1.
    pub fn progress(&self, graph: &StoryGraph) -> f64 {
        let total = graph.scene_count();
        if total == 0 {
            return 0.0;
        }
        (self.visited.len() as f64 / total as f64).min(1.0)
    }

    /// Whether play has reached an ending.
    ///
    /// True when the current scene is missing, or when it is not a puzzle and
    /// none of its choices leads to an existing scene. Puzzle scenes always
    /// resolve to an outcome, so they are never endings.
    pub fn is_ending(&self, graph: &StoryGraph) -> bool {
        let Some(scene) = self.current_scene(graph) else {
            return true;
        };
        if scene.is_puzzle() {
            return false;
        }
        !scene.choices.iter().any(|choice| {
            choice
                .next_scene_id
                .as_ref()
                .is_some_and(|id| graph.contains(id.as_str()))
        })
    }

    /// The current scene's labelled choices with their enabled state.
    pub fn visible_choices<'g>(&self, graph: &'g StoryGraph) -> Vec<VisibleChoice<'g>> {
        let Some(scene) = self.current_scene(graph) else {
            return Vec::new();
        };
        scene
            .active_choices()
            .iter()
            .enumerate()
            .filter(|(_, choice)| !choice.is_blank())
            .map(|(index, choice)| VisibleChoice {
                index,
                text: choice.text.as_str(),
                enabled: choice
                    .next_scene_id
                    .as_ref()
                    .is_some_and(|id| graph.contains(id.as_str())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sl_core::{Choice, Puzzle, SceneKind, Solution};

    fn fork_graph() -> StoryGraph {
        let mut graph = StoryGraph::new();
        graph.put_scene(
            Scene::new("scene-1", "A fork in the road.", SceneKind::Narrative)
                .with_choice(Choice::new("Go left").with_next("scene-2"))
                .with_choice(Choice::new("Go right")),
        );
        graph.put_scene(
            Scene::new("scene-2", "A meadow.", SceneKind::Narrative)
                .with_choice(Choice::new("Return").with_next("scene-1"))
                .with_choice(Choice::new("Rest").with_next("scene-2")),
        );
        graph
    }

    fn vault_graph() -> StoryGraph {
        let mut graph = StoryGraph::new();
        graph.put_scene(
            Scene::new("scene-1", "A vault.", SceneKind::Puzzle).with_puzzle(
                Puzzle::new(
                    "What opens it?",
                    Solution::Keywords {
                        keywords: vec!["gold".to_string(), "key".to_string()],
                    },
                )
                .with_max_attempts(3)
                .with_hint("It shines.")
                .with_success("scene-2")
                .with_fail("scene-3"),
            ),
        );
        graph.put_scene(Scene::new("scene-2", "Riches!", SceneKind::Narrative));
        graph.put_scene(Scene::new("scene-3", "Alarms!", SceneKind::Narrative));
        graph
    }

    #[test]
    fn initial_state() {
        let graph = fork_graph();
        let session = TraversalSession::new(&graph).unwrap();
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.current_scene_id().as_str(), "scene-1");
        assert_eq!(session.visited().len(), 1);
        assert!(session.has_visited("scene-1"));
    }

    #[test]
    fn empty_story_cannot_be_played() {
        let err = TraversalSession::new(&StoryGraph::new()).unwrap_err();
        assert!(matches!(err, PlayError::EmptyStory));
    }

    #[test]
    fn choose_resolved_choice_moves() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        let next = session.choose(&graph, 0).unwrap();
        assert_eq!(next.as_str(), "scene-2");
        assert_eq!(
            session.history()[1],
            HistoryEntry {
                scene_id: SceneId::from("scene-2"),
                choice: Some(0),
            }
        );
    }

    #[test]
    fn choose_unresolved_choice_stays() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        session.choose(&graph, 1).unwrap();
        assert_eq!(session.current_scene_id().as_str(), "scene-1");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.visited().len(), 1);
        // "Go left" is still valid
        assert!(!session.is_ending(&graph));
    }

    #[test]
    fn only_unresolved_choices_is_an_ending() {
        let mut graph = StoryGraph::new();
        graph.put_scene(
            Scene::new("scene-1", "A cliff.", SceneKind::Narrative)
                .with_choice(Choice::new("Jump"))
                .with_choice(Choice::new("Fly").with_next("scene-404")),
        );
        let mut session = TraversalSession::new(&graph).unwrap();
        assert!(session.is_ending(&graph));
        session.choose(&graph, 0).unwrap();
        assert!(session.is_ending(&graph));
    }

    #[test]
    fn dangling_choice_leads_to_missing_scene_ending() {
        let mut graph = StoryGraph::new();
        graph.put_scene(
            Scene::new("scene-1", "A cliff.", SceneKind::Narrative)
                .with_choice(Choice::new("Fly").with_next("scene-404")),
        );
        let mut session = TraversalSession::new(&graph).unwrap();
        session.choose(&graph, 0).unwrap();
        assert!(session.current_scene(&graph).is_none());
        assert!(session.is_ending(&graph));

        let choices = session.visible_choices(&graph);
        assert!(choices.is_empty());
    }

    #[test]
    fn invalid_choice_changes_nothing() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        let err = session.choose(&graph, 5).unwrap_err();
        assert!(matches!(err, PlayError::InvalidChoice(5)));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn go_back_on_start_is_noop() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        assert!(!session.go_back());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn go_back_keeps_visited() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        session.choose(&graph, 0).unwrap();
        assert!(session.go_back());
        assert_eq!(session.current_scene_id().as_str(), "scene-1");
        assert!(session.has_visited("scene-2"));
    }

    #[test]
    fn revisiting_does_not_duplicate() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        session.choose(&graph, 0).unwrap();
        session.choose(&graph, 0).unwrap();
        session.choose(&graph, 0).unwrap();
        assert_eq!(session.history().len(), 4);
        assert_eq!(session.visited().len(), 2);
        assert_eq!(session.progress(&graph), 1.0);
    }

    #[test]
    fn restart_resets_everything() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        session.choose(&graph, 0).unwrap();
        session.choose(&graph, 1).unwrap();
        session.restart();
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.visited().len(), 1);
        assert_eq!(session.current_scene_id().as_str(), "scene-1");
    }

    #[test]
    fn jump_to_truncates_history() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        session.choose(&graph, 0).unwrap();
        session.choose(&graph, 1).unwrap();
        session.choose(&graph, 0).unwrap();
        assert_eq!(session.history().len(), 4);

        assert!(session.jump_to(1));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.current_scene_id().as_str(), "scene-2");

        assert!(!session.jump_to(7));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn progress_counts_visited_share() {
        let graph = vault_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        assert!((session.progress(&graph) - 1.0 / 3.0).abs() < f64::EPSILON);
        session.submit_answer(&graph, "golden key").unwrap();
        assert!((session.progress(&graph) - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn puzzle_scene_is_never_an_ending() {
        let graph = vault_graph();
        let session = TraversalSession::new(&graph).unwrap();
        assert!(!session.is_ending(&graph));
        assert!(session.visible_choices(&graph).is_empty());
    }

    #[test]
    fn puzzle_success_moves_to_success_scene() {
        let graph = vault_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        let outcome = session.submit_answer(&graph, "the Golden Key").unwrap();
        assert!(matches!(outcome, PuzzleOutcome::Solved { .. }));
        assert_eq!(session.current_scene_id().as_str(), "scene-2");
        assert_eq!(session.history()[1].choice, None);
    }

    #[test]
    fn puzzle_failure_after_max_attempts() {
        let graph = vault_graph();
        let mut session = TraversalSession::new(&graph).unwrap();

        session.submit_answer(&graph, "silver key").unwrap();
        assert_eq!(session.attempts(), 1);
        assert_eq!(session.revealed_hints(&graph), ["It shines."]);
        session.submit_answer(&graph, "silver key").unwrap();
        assert_eq!(session.current_scene_id().as_str(), "scene-1");

        let outcome = session.submit_answer(&graph, "silver key").unwrap();
        assert!(matches!(outcome, PuzzleOutcome::Failed { .. }));
        assert_eq!(session.current_scene_id().as_str(), "scene-3");
        assert_eq!(session.attempts(), 0);
    }

    #[test]
    fn leaving_a_puzzle_resets_attempts() {
        let graph = vault_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        session.submit_answer(&graph, "wrong").unwrap();
        session.restart();
        assert_eq!(session.attempts(), 0);
    }

    #[test]
    fn unwired_puzzle_outcome_stays_put() {
        let mut graph = StoryGraph::new();
        graph.put_scene(Scene::new("scene-1", "Riddle", SceneKind::Puzzle).with_puzzle(
            Puzzle::new("?", Solution::Keywords { keywords: vec!["yes".to_string()] }),
        ));
        let mut session = TraversalSession::new(&graph).unwrap();
        let outcome = session.submit_answer(&graph, "yes").unwrap();
        assert_eq!(outcome, PuzzleOutcome::Solved { next: None });
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn answer_on_narrative_scene_is_rejected() {
        let graph = fork_graph();
        let mut session = TraversalSession::new(&graph).unwrap();
        let err = session.submit_answer(&graph, "hello").unwrap_err();
        assert!(matches!(err, PlayError::NotAPuzzle(_)));
    }

    #[test]
    fn visible_choices_skip_blank_and_flag_missing_targets() {
        let mut graph = fork_graph();
        graph.put_scene(
            Scene::new("scene-3", "A door.", SceneKind::Dialogue)
                .with_choice(Choice::new("Open").with_next("scene-1"))
                .with_choice(Choice::new("   "))
                .with_choice(Choice::new("Knock").with_next("scene-99")),
        );
        let session = TraversalSession::start_at(SceneId::from("scene-3"));
        let choices = session.visible_choices(&graph);
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].index, 0);
        assert!(choices[0].enabled);
        assert_eq!(choices[1].index, 2);
        assert!(!choices[1].enabled);
        assert_eq!(
            choices[1].disabled_reason(),
            Some("This path has no next scene yet")
        );
    }

    #[derive(Debug, Clone)]
    enum Step {
        Choose(usize),
        Back,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![(0usize..3).prop_map(Step::Choose), Just(Step::Back)]
    }

    proptest! {
        #[test]
        fn visited_never_shrinks(steps in proptest::collection::vec(step_strategy(), 0..40)) {
            let graph = fork_graph();
            let mut session = TraversalSession::new(&graph).unwrap();
            let mut seen = session.visited().len();
            for step in steps {
                match step {
                    Step::Choose(index) => {
                        let _ = session.choose(&graph, index);
                    }
                    Step::Back => {
                        session.go_back();
                    }
                }
                prop_assert!(session.visited().len() >= seen);
                prop_assert!(session.has_visited(session.current_scene_id().as_str()));
                prop_assert!(!session.history().is_empty());
                seen = session.visited().len();
            }
        }
    }
}
