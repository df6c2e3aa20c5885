//! Debounced, best-effort autosave to a named slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use sl_core::{StoryGraph, parse_snapshot, to_snapshot_string};

use crate::config::EditorConfig;
use crate::editor::StoryEditor;
use crate::error::AuthorResult;

/// A named place that holds one snapshot.
pub trait SaveSlot {
    /// The slot name.
    fn name(&self) -> &str;

    /// The stored snapshot, or `None` if the slot is empty.
    fn load(&self) -> io::Result<Option<String>>;

    /// Replace the stored snapshot.
    fn store(&mut self, snapshot: &str) -> io::Result<()>;

    /// Empty the slot.
    fn clear(&mut self) -> io::Result<()>;
}

/// A slot backed by `{dir}/{name}.json`.
#[derive(Debug, Clone)]
pub struct FileSlot {
    name: String,
    path: PathBuf,
}

impl FileSlot {
    /// A slot named `name` inside `dir`.
    pub fn new(dir: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = dir.as_ref().join(format!("{name}.json"));
        Self { name, path }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveSlot for FileSlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&mut self, snapshot: &str) -> io::Result<()> {
        fs::write(&self.path, snapshot)
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// An in-process slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    name: String,
    contents: Option<String>,
}

impl MemorySlot {
    /// An empty slot.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: None,
        }
    }

    /// The stored snapshot.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl SaveSlot for MemorySlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn store(&mut self, snapshot: &str) -> io::Result<()> {
        self.contents = Some(snapshot.to_string());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.contents = None;
        Ok(())
    }
}

/// Collects changes and writes the latest snapshot once things go quiet.
///
/// The autosaver does not keep time itself. Call [`schedule`](Self::schedule)
/// after each change and [`tick`](Self::tick) from the event loop; a write
/// happens once `autosave_delay` has passed since the last change. Write
/// failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct Autosaver<S: SaveSlot> {
    slot: S,
    delay: Duration,
    pending: Option<String>,
    due_at: Option<Instant>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl<S: SaveSlot> Autosaver<S> {
    /// An autosaver writing to `slot` with the configured delay.
    pub fn new(slot: S, config: &EditorConfig) -> Self {
        Self {
            slot,
            delay: config.autosave_delay,
            pending: None,
            due_at: None,
            last_saved_at: None,
        }
    }

    /// The underlying slot.
    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// When the last successful write happened.
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Whether a write is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the waiting write is due.
    pub fn due_at(&self) -> Option<Instant> {
        self.due_at
    }

    /// Record a change. Replaces any waiting snapshot and restarts the delay.
    pub fn schedule(&mut self, graph: &StoryGraph, now: Instant) {
        match to_snapshot_string(graph) {
            Ok(snapshot) => {
                self.pending = Some(snapshot);
                self.due_at = Some(now + self.delay);
            }
            Err(err) => tracing::warn!(%err, "could not serialize story for autosave"),
        }
    }

    /// Write if the delay has passed. Returns whether a write succeeded.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.due_at {
            Some(due) if now >= due => self.flush(),
            _ => false,
        }
    }

    /// Write the waiting snapshot now. Returns whether a write succeeded.
    pub fn flush(&mut self) -> bool {
        self.due_at = None;
        let Some(snapshot) = self.pending.take() else {
            return false;
        };
        match self.slot.store(&snapshot) {
            Ok(()) => {
                self.last_saved_at = Some(Utc::now());
                tracing::debug!(slot = self.slot.name(), bytes = snapshot.len(), "autosaved");
                true
            }
            Err(err) => {
                tracing::warn!(slot = self.slot.name(), %err, "autosave failed");
                false
            }
        }
    }

    /// Load the last saved story, if any.
    pub fn restore(&self) -> AuthorResult<Option<StoryGraph>> {
        let Some(text) = self.slot.load()? else {
            return Ok(None);
        };
        let graph = parse_snapshot(&text)?;
        tracing::info!(slot = self.slot.name(), scenes = graph.scene_count(), "restored story");
        Ok(Some(graph))
    }

    /// Empty the slot, drop any waiting write, and reset the editor.
    ///
    /// The editor is reset even if the slot could not be emptied.
    pub fn clear(&mut self, editor: &mut StoryEditor) -> AuthorResult<()> {
        self.pending = None;
        self.due_at = None;
        editor.reset();
        self.slot.clear()?;
        tracing::info!(slot = self.slot.name(), "cleared saved story");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;
    use crate::error::AuthorError;

    struct BrokenSlot;

    impl SaveSlot for BrokenSlot {
        fn name(&self) -> &str {
            "broken"
        }

        fn load(&self) -> io::Result<Option<String>> {
            Err(io::Error::other("disk on fire"))
        }

        fn store(&mut self, _snapshot: &str) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }

        fn clear(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }
    }

    fn sample_editor() -> StoryEditor {
        let mut editor = StoryEditor::default();
        editor
            .create_root_scene(Draft::narrative("A fork.", ["Left", "Right"]))
            .unwrap();
        editor
    }

    fn saver<S: SaveSlot>(slot: S) -> Autosaver<S> {
        Autosaver::new(slot, &EditorConfig::default())
    }

    #[test]
    fn writes_only_after_quiet_period() {
        let editor = sample_editor();
        let mut autosaver = saver(MemorySlot::new("test"));
        let t0 = Instant::now();

        autosaver.schedule(editor.graph(), t0);
        assert!(autosaver.is_pending());
        assert!(!autosaver.tick(t0 + Duration::from_millis(100)));
        assert!(autosaver.slot().contents().is_none());

        assert!(autosaver.tick(t0 + Duration::from_millis(300)));
        assert!(!autosaver.is_pending());
        assert!(autosaver.slot().contents().is_some());
        assert!(autosaver.last_saved_at().is_some());
    }

    #[test]
    fn changes_within_delay_batch_into_one_write() {
        let mut editor = sample_editor();
        let mut autosaver = saver(MemorySlot::new("test"));
        let t0 = Instant::now();

        autosaver.schedule(editor.graph(), t0);
        editor.set_title("Later");
        autosaver.schedule(editor.graph(), t0 + Duration::from_millis(200));

        // The first deadline has passed but the second change pushed it back.
        assert!(!autosaver.tick(t0 + Duration::from_millis(350)));
        assert!(autosaver.tick(t0 + Duration::from_millis(500)));
        assert!(autosaver.slot().contents().unwrap().contains("Later"));
        assert!(!autosaver.tick(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn failed_write_is_not_an_error() {
        let editor = sample_editor();
        let mut autosaver = saver(BrokenSlot);
        autosaver.schedule(editor.graph(), Instant::now());
        assert!(!autosaver.flush());
        assert!(!autosaver.is_pending());
        assert!(autosaver.last_saved_at().is_none());
    }

    #[test]
    fn restore_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let editor = sample_editor();
        let mut autosaver = saver(FileSlot::new(dir.path(), "storyloom_story_v1"));
        assert!(autosaver.restore().unwrap().is_none());

        autosaver.schedule(editor.graph(), Instant::now());
        assert!(autosaver.flush());
        assert!(dir.path().join("storyloom_story_v1.json").exists());
        assert_eq!(autosaver.restore().unwrap().as_ref(), Some(editor.graph()));
    }

    #[test]
    fn restore_rejects_corrupt_slot() {
        let mut slot = MemorySlot::new("test");
        slot.store(r#"{"startSceneId": 1}"#).unwrap();
        let autosaver = saver(slot);
        assert!(matches!(autosaver.restore(), Err(AuthorError::Story(_))));
    }

    #[test]
    fn restore_reports_slot_errors() {
        let autosaver = saver(BrokenSlot);
        assert!(matches!(autosaver.restore(), Err(AuthorError::Slot(_))));
    }

    #[test]
    fn clear_empties_slot_and_resets_editor() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = sample_editor();
        let mut autosaver = saver(FileSlot::new(dir.path(), "slot"));
        autosaver.schedule(editor.graph(), Instant::now());
        autosaver.flush();

        autosaver.clear(&mut editor).unwrap();
        assert!(editor.graph().is_empty());
        assert!(!autosaver.slot().path().exists());
        assert!(autosaver.restore().unwrap().is_none());
        // Clearing an already empty slot is fine.
        autosaver.clear(&mut editor).unwrap();
    }

    #[test]
    fn clear_resets_editor_even_if_slot_fails() {
        let mut editor = sample_editor();
        let mut autosaver = saver(BrokenSlot);
        assert!(autosaver.clear(&mut editor).is_err());
        assert!(editor.graph().is_empty());
    }
}
