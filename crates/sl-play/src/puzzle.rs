//! Puzzle answer matching and the attempt state machine.

use regex::RegexBuilder;
use sl_core::{Puzzle, SceneId, Solution};

/// Compiled patterns larger than this are treated as non-matching.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Check an answer against a puzzle's solution.
///
/// The answer is trimmed first. A pattern that fails to compile never
/// matches, and neither does an unrecognized solution.
pub fn evaluate(puzzle: &Puzzle, raw_answer: &str) -> bool {
    let answer = raw_answer.trim();
    match &puzzle.solution {
        Solution::Regex { pattern } => {
            match RegexBuilder::new(pattern)
                .size_limit(PATTERN_SIZE_LIMIT)
                .build()
            {
                Ok(re) => re.is_match(answer),
                Err(err) => {
                    tracing::debug!(%err, "puzzle pattern does not compile, treating as no match");
                    false
                }
            }
        }
        Solution::Keywords { keywords } => {
            let answer = answer.to_lowercase();
            keywords
                .iter()
                .all(|keyword| answer.contains(&keyword.to_lowercase()))
        }
        Solution::Unrecognized(_) => false,
    }
}

/// What happened after an answer was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleOutcome {
    /// Correct answer. Play moves to the success scene, if one is wired.
    Solved {
        /// The success scene.
        next: Option<SceneId>,
    },
    /// Out of attempts. Play moves to the failure scene, if one is wired.
    Failed {
        /// The failure scene.
        next: Option<SceneId>,
    },
    /// Wrong answer with attempts left. Play stays on the puzzle.
    Retry {
        /// Wrong answers so far.
        attempts: u32,
        /// Wrong answers still allowed.
        remaining: u32,
        /// The hint unlocked by this attempt, if the puzzle has one.
        hint: Option<String>,
    },
}

impl PuzzleOutcome {
    /// The scene play should move to, if any.
    pub fn next_scene(&self) -> Option<&SceneId> {
        match self {
            Self::Solved { next } | Self::Failed { next } => next.as_ref(),
            Self::Retry { .. } => None,
        }
    }
}

/// Wrong-answer counter for one visit to a puzzle scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PuzzleAttempts {
    attempts: u32,
}

impl PuzzleAttempts {
    /// A fresh counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrong answers so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Forget all attempts.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Submit an answer and advance the counter.
    pub fn submit(&mut self, puzzle: &Puzzle, raw_answer: &str) -> PuzzleOutcome {
        if evaluate(puzzle, raw_answer) {
            self.reset();
            return PuzzleOutcome::Solved {
                next: puzzle.success_next_scene_id.clone(),
            };
        }

        self.attempts += 1;
        if self.attempts >= puzzle.max_attempts {
            self.reset();
            return PuzzleOutcome::Failed {
                next: puzzle.fail_next_scene_id.clone(),
            };
        }

        PuzzleOutcome::Retry {
            attempts: self.attempts,
            remaining: puzzle.max_attempts - self.attempts,
            hint: puzzle.hints.get(self.attempts as usize - 1).cloned(),
        }
    }

    /// The hints unlocked so far, oldest first.
    pub fn revealed_hints<'a>(&self, puzzle: &'a Puzzle) -> &'a [String] {
        let count = (self.attempts as usize).min(puzzle.hints.len());
        &puzzle.hints[..count]
    }
}
