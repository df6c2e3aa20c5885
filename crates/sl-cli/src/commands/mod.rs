pub mod branch;
pub mod check;
pub mod export;
pub mod link;
pub mod list;
pub mod new;
pub mod play;

use std::fs;
use std::future::Future;
use std::path::Path;

use clap::Args;
use colored::Colorize;

use sl_author::{AssistOutcome, Draft, EditorConfig, HttpGenerator, StoryEditor};
use sl_core::{Puzzle, SceneKind, Solution, StoryGraph, parse_snapshot, to_snapshot_string};

/// Generation backend used when `STORYLOOM_API_URL` is not set.
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Scene content shared by `new` and `branch`.
#[derive(Args, Debug)]
pub struct SceneArgs {
    /// Scene text
    #[arg(short, long)]
    pub text: Option<String>,

    /// Choice label (repeat for more choices)
    #[arg(short, long = "option")]
    pub options: Vec<String>,

    /// Scene type: narrative, dialogue, or puzzle
    #[arg(long = "type", default_value = "narrative")]
    pub kind: String,

    /// Puzzle question; makes this a puzzle scene
    #[arg(long)]
    pub puzzle: Option<String>,

    /// Words that must all appear in the answer (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Regular expression the answer must match
    #[arg(long, conflicts_with = "keywords")]
    pub pattern: Option<String>,

    /// Wrong answers allowed before the puzzle fails
    #[arg(long, default_value_t = 3)]
    pub attempts: u32,

    /// Hint shown after a wrong answer (repeat for more hints)
    #[arg(long = "hint")]
    pub hints: Vec<String>,

    /// Ask the generation service to write the scene text
    #[arg(long)]
    pub generate: bool,
}

impl SceneArgs {
    /// Build the draft these arguments describe.
    pub fn draft(&self) -> Result<Draft, String> {
        let kind = SceneKind::parse(&self.kind)
            .ok_or_else(|| format!("unknown scene type '{}'", self.kind))?;
        let text = self.text.clone().unwrap_or_default();

        let Some(prompt) = &self.puzzle else {
            return Ok(Draft::narrative(text, self.options.iter().cloned()).with_kind(kind));
        };

        // A blank keyword would match every answer.
        let keywords: Vec<String> = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        let solution = match &self.pattern {
            Some(pattern) => Solution::Regex {
                pattern: pattern.clone(),
            },
            None if !keywords.is_empty() => Solution::Keywords { keywords },
            None => return Err("a puzzle needs --keywords or --pattern".into()),
        };
        let puzzle = self
            .hints
            .iter()
            .fold(Puzzle::new(prompt.clone(), solution), |p, hint| {
                p.with_hint(hint.clone())
            })
            .with_max_attempts(self.attempts);
        Ok(Draft::puzzle(text, puzzle))
    }
}

/// Read and validate a story file.
fn load_story(path: &Path) -> Result<StoryGraph, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    parse_snapshot(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Open a story file for editing.
fn load_editor(path: &Path) -> Result<StoryEditor, String> {
    let graph = load_story(path)?;
    Ok(StoryEditor::from_graph(graph, EditorConfig::default()))
}

/// Write a story as pretty-printed snapshot JSON.
fn save_story(path: &Path, graph: &StoryGraph) -> Result<(), String> {
    let mut text = to_snapshot_string(graph).map_err(|e| e.to_string())?;
    text.push('\n');
    fs::write(path, text).map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// Turn a 1-based choice number from the command line into an index.
fn choice_index(number: usize) -> Result<usize, String> {
    number
        .checked_sub(1)
        .ok_or_else(|| "choice numbers start at 1".to_string())
}

/// Shorten text to `max` characters for table cells.
fn excerpt(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else if flat.is_empty() {
        "—".to_string()
    } else {
        flat
    }
}

/// The generation client, pointed at `STORYLOOM_API_URL`.
fn generator() -> HttpGenerator {
    let url = std::env::var("STORYLOOM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    HttpGenerator::new(url)
}

/// Run one generation call to completion.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("cannot start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

/// Tell the user what became of a generation result.
fn report_assist(outcome: &AssistOutcome) {
    match outcome {
        AssistOutcome::Applied => println!("  {} scene text", "Generated".green()),
        AssistOutcome::Stale => eprintln!("  {} generated text arrived too late", "warning:".yellow()),
        AssistOutcome::Failed(e) => eprintln!("  {} {e}", "warning:".yellow()),
    }
}
