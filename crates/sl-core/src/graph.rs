use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scene::{Scene, SceneId};

/// The story aggregate: a start scene and every scene keyed by id.
///
/// The graph may be cyclic and may hold dangling `nextSceneId` references.
/// Readers resolve links through [`StoryGraph::resolve_transition`], which
/// reports a missing target instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryGraph {
    /// Where play begins.
    pub start_scene_id: SceneId,
    /// Optional story title, used for the export file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    scenes: BTreeMap<SceneId, Scene>,
}

impl Default for StoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Which outgoing link of a scene is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// The choice at this index.
    Choice(usize),
    /// The puzzle's success outcome.
    PuzzleSuccess,
    /// The puzzle's failure outcome.
    PuzzleFail,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Choice(index) => write!(f, "choice {}", index + 1),
            Self::PuzzleSuccess => write!(f, "puzzle success"),
            Self::PuzzleFail => write!(f, "puzzle failure"),
        }
    }
}

/// A link whose target id names no scene in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Scene owning the link.
    pub from: SceneId,
    /// The link within that scene.
    pub link: Link,
    /// The missing target.
    pub target: SceneId,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) points to missing scene \"{}\"",
            self.from, self.link, self.target
        )
    }
}

/// Result of following one outgoing link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<'a> {
    /// The link leads to an existing scene.
    To(&'a Scene),
    /// The link names a scene that does not exist.
    Dangling(&'a SceneId),
    /// The link has no target yet.
    Unresolved,
    /// The scene has no link at that index.
    NoSuchLink,
}

impl<'a> Transition<'a> {
    /// The reachable scene, if any.
    pub fn scene(self) -> Option<&'a Scene> {
        match self {
            Self::To(scene) => Some(scene),
            _ => None,
        }
    }
}

impl StoryGraph {
    /// An empty story. The start id is the id the first created scene will get.
    pub fn new() -> Self {
        Self {
            start_scene_id: SceneId::numbered(1),
            title: None,
            scenes: BTreeMap::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Look up a scene by id.
    pub fn get_scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Whether a scene with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    /// The start scene, if it exists.
    pub fn start_scene(&self) -> Option<&Scene> {
        self.get_scene(self.start_scene_id.as_str())
    }

    /// Whether the start scene exists.
    pub fn has_root(&self) -> bool {
        self.start_scene().is_some()
    }

    /// All scenes in creation order (auto-generated ids first, by number).
    pub fn list_scenes(&self) -> Vec<&Scene> {
        let mut scenes: Vec<&Scene> = self.scenes.values().collect();
        scenes.sort_by(|a, b| {
            let key_a = (a.id.ordinal().unwrap_or(usize::MAX), a.id.as_str());
            let key_b = (b.id.ordinal().unwrap_or(usize::MAX), b.id.as_str());
            key_a.cmp(&key_b)
        });
        scenes
    }

    /// Number of scenes.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the story has no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Follow link `index` of `scene`. For puzzle scenes 0 is success and 1 is failure.
    pub fn resolve_transition<'a>(&'a self, scene: &'a Scene, index: usize) -> Transition<'a> {
        let target = if scene.is_puzzle() {
            let Some(puzzle) = scene.puzzle.as_ref() else {
                return Transition::NoSuchLink;
            };
            match index {
                0 => puzzle.success_next_scene_id.as_ref(),
                1 => puzzle.fail_next_scene_id.as_ref(),
                _ => return Transition::NoSuchLink,
            }
        } else {
            match scene.choices.get(index) {
                Some(choice) => choice.next_scene_id.as_ref(),
                None => return Transition::NoSuchLink,
            }
        };

        match target {
            None => Transition::Unresolved,
            Some(id) => match self.scenes.get(id) {
                Some(next) => Transition::To(next),
                None => Transition::Dangling(id),
            },
        }
    }

    /// Every link that names a missing scene. These are tolerated, not rejected.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for scene in self.list_scenes() {
            let links: Vec<(Link, Option<&SceneId>)> = match scene.active_puzzle() {
                Some(puzzle) => vec![
                    (Link::PuzzleSuccess, puzzle.success_next_scene_id.as_ref()),
                    (Link::PuzzleFail, puzzle.fail_next_scene_id.as_ref()),
                ],
                None => scene
                    .active_choices()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (Link::Choice(i), c.next_scene_id.as_ref()))
                    .collect(),
            };
            for (link, target) in links {
                if let Some(target) = target
                    && !self.contains(target.as_str())
                {
                    dangling.push(DanglingReference {
                        from: scene.id.clone(),
                        link,
                        target: target.clone(),
                    });
                }
            }
        }
        dangling
    }

    /// The id the next created scene gets: `scene-{count + 1}`, skipping taken ids.
    pub fn next_scene_id(&self) -> SceneId {
        let mut n = self.scenes.len() + 1;
        loop {
            let id = SceneId::numbered(n);
            if !self.scenes.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Raw storage. Authoring goes through `sl_author::StoryEditor`, which
    // enforces the save-time guards before calling these.
    // -----------------------------------------------------------------------

    /// Store a scene under its own id, replacing any scene with that id.
    pub fn put_scene(&mut self, scene: Scene) {
        self.scenes.insert(scene.id.clone(), scene);
    }

    /// Mutable access to a stored scene.
    pub fn scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }
}
