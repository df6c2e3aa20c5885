use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Identifier of a scene. Stable once assigned, never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    /// Wrap an arbitrary id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The auto-generated id of the `n`-th created scene (1-based).
    pub fn numbered(n: usize) -> Self {
        Self(format!("scene-{n}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric suffix of an auto-generated id, if this is one.
    pub fn ordinal(&self) -> Option<usize> {
        self.0.strip_prefix("scene-")?.parse().ok()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SceneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SceneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The kind of a scene. Only puzzle scenes carry a [`Puzzle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Plain story text followed by choices.
    #[default]
    Narrative,
    /// Spoken lines followed by choices.
    Dialogue,
    /// A riddle the player answers in free text.
    Puzzle,
}

impl SceneKind {
    /// Parse a kind name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "narrative" => Some(Self::Narrative),
            "dialogue" => Some(Self::Dialogue),
            "puzzle" => Some(Self::Puzzle),
            _ => None,
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Narrative => write!(f, "narrative"),
            Self::Dialogue => write!(f, "dialogue"),
            Self::Puzzle => write!(f, "puzzle"),
        }
    }
}

/// A labelled edge from its owning scene to another scene.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Label shown to the player. Blank means an unused slot.
    #[serde(default)]
    pub text: String,
    /// Authoring-only flavor text, never shown during play.
    #[serde(default)]
    pub outcome: String,
    /// Where this choice leads. `None` means unresolved.
    #[serde(default, deserialize_with = "optional_scene_id")]
    pub next_scene_id: Option<SceneId>,
}

impl Choice {
    /// Create an unresolved choice with the given label.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the authoring outcome text.
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = outcome.into();
        self
    }

    /// Point the choice at a scene.
    pub fn with_next(mut self, next: impl Into<SceneId>) -> Self {
        self.next_scene_id = Some(next.into());
        self
    }

    /// Whether the label is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// How a puzzle answer is checked.
///
/// Encoded as `{"mode": "regex", "pattern": ..}` or
/// `{"mode": "keywords", "keywords": [..]}`. Anything else is kept verbatim
/// as [`Solution::Unrecognized`] so saving the story writes it back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// The trimmed answer must match this regular expression.
    Regex {
        /// Pattern source.
        pattern: String,
    },
    /// Every keyword must appear in the answer, ignoring case.
    Keywords {
        /// Required keywords.
        keywords: Vec<String>,
    },
    /// A solution that could not be understood on import, as it was found.
    /// Never matches.
    Unrecognized(Value),
}

impl Solution {
    /// Whether the puzzle has no solution at all.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Unrecognized(Value::Null))
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::Unrecognized(Value::Null)
    }
}

#[derive(Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
enum SolutionRef<'a> {
    Regex { pattern: &'a str },
    Keywords { keywords: &'a [String] },
}

#[derive(Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
enum KnownSolution {
    Regex { pattern: String },
    Keywords { keywords: Vec<String> },
}

impl Serialize for Solution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Regex { pattern } => SolutionRef::Regex { pattern }.serialize(serializer),
            Self::Keywords { keywords } => SolutionRef::Keywords { keywords }.serialize(serializer),
            Self::Unrecognized(raw) => raw.serialize(serializer),
        }
    }
}

/// Malformed solutions decode as [`Solution::Unrecognized`] instead of failing the import.
impl<'de> Deserialize<'de> for Solution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match KnownSolution::deserialize(&raw) {
            Ok(KnownSolution::Regex { pattern }) => Self::Regex { pattern },
            Ok(KnownSolution::Keywords { keywords }) => Self::Keywords { keywords },
            Err(_) => Self::Unrecognized(raw),
        })
    }
}

/// A riddle attached to a puzzle scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    /// Question shown to the player.
    #[serde(default)]
    pub prompt: String,
    /// Matching rule for answers.
    #[serde(default, skip_serializing_if = "Solution::is_missing")]
    pub solution: Solution,
    /// Wrong answers allowed before the puzzle fails.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Hints revealed one per failed attempt, in order.
    #[serde(default)]
    pub hints: Vec<String>,
    /// Scene reached on a correct answer.
    #[serde(default, deserialize_with = "optional_scene_id")]
    pub success_next_scene_id: Option<SceneId>,
    /// Scene reached when attempts run out.
    #[serde(default, deserialize_with = "optional_scene_id")]
    pub fail_next_scene_id: Option<SceneId>,
}

impl Puzzle {
    /// Create a puzzle with three attempts, no hints, and open outcomes.
    pub fn new(prompt: impl Into<String>, solution: Solution) -> Self {
        Self {
            prompt: prompt.into(),
            solution,
            max_attempts: default_max_attempts(),
            hints: Vec::new(),
            success_next_scene_id: None,
            fail_next_scene_id: None,
        }
    }

    /// Set the attempt limit (at least 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Append a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Set the success target.
    pub fn with_success(mut self, next: impl Into<SceneId>) -> Self {
        self.success_next_scene_id = Some(next.into());
        self
    }

    /// Set the failure target.
    pub fn with_fail(mut self, next: impl Into<SceneId>) -> Self {
        self.fail_next_scene_id = Some(next.into());
        self
    }

    /// Both outcomes are wired.
    pub fn is_complete(&self) -> bool {
        self.success_next_scene_id.is_some() && self.fail_next_scene_id.is_some()
    }
}

/// A node in the story graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Unique id, equal to the scene's key in the graph.
    pub id: SceneId,
    /// Narrative body.
    pub text: String,
    /// Scene kind. Missing in older snapshots, which means narrative.
    #[serde(rename = "type", default)]
    pub kind: SceneKind,
    /// Ordered choices. Ignored for puzzle scenes.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// The riddle. Present only for puzzle scenes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<Puzzle>,
}

impl Scene {
    /// Create a scene with no choices.
    pub fn new(id: impl Into<SceneId>, text: impl Into<String>, kind: SceneKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            choices: Vec::new(),
            puzzle: None,
        }
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Attach a puzzle and make this a puzzle scene.
    pub fn with_puzzle(mut self, puzzle: Puzzle) -> Self {
        self.kind = SceneKind::Puzzle;
        self.puzzle = Some(puzzle);
        self
    }

    /// Whether this is a puzzle scene.
    pub fn is_puzzle(&self) -> bool {
        self.kind == SceneKind::Puzzle
    }

    /// The puzzle, if this is a puzzle scene that has one.
    pub fn active_puzzle(&self) -> Option<&Puzzle> {
        if self.is_puzzle() {
            self.puzzle.as_ref()
        } else {
            None
        }
    }

    /// The choices that apply to this scene. Always empty for puzzles.
    pub fn active_choices(&self) -> &[Choice] {
        if self.is_puzzle() { &[] } else { &self.choices }
    }
}

fn default_max_attempts() -> u32 {
    3
}

/// Blank ids mean "no target", same as `null`.
fn optional_scene_id<'de, D>(deserializer: D) -> Result<Option<SceneId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(SceneId))
}
