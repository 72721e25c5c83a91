//! Document store: current essay text plus a linear snapshot history.
//!
//! History is an ordered list of immutable snapshots with a cursor. Committing
//! while the cursor is behind the tip discards the abandoned future first, so
//! there is never more than one redo path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditSource {
    #[default]
    Initial,
    User,
    Suggestion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub text: String,
    pub source: EditSource,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    fn new(text: String, source: EditSource) -> Self {
        Self {
            text,
            source,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    last_changed: Option<String>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl DocumentStore {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            snapshots: vec![Snapshot::new(initial.into(), EditSource::Initial)],
            cursor: 0,
            last_changed: None,
        }
    }

    /// Commit a user edit. `changed_span` is the text to highlight transiently.
    pub fn set_text(&mut self, new_text: impl Into<String>, changed_span: Option<String>) {
        self.commit(new_text, changed_span, EditSource::User);
    }

    pub fn commit(
        &mut self,
        new_text: impl Into<String>,
        changed_span: Option<String>,
        source: EditSource,
    ) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Snapshot::new(new_text.into(), source));
        self.cursor = self.snapshots.len() - 1;
        self.last_changed = changed_span;
    }

    /// Returns false when already at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.last_changed = None;
        true
    }

    /// Returns false when already at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.snapshots.len() {
            return false;
        }
        self.cursor += 1;
        self.last_changed = None;
        true
    }

    pub fn current(&self) -> &str {
        // cursor always indexes a live snapshot
        &self.snapshots[self.cursor].text
    }

    pub fn current_snapshot(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    pub fn last_changed(&self) -> Option<&str> {
        self.last_changed.as_deref()
    }

    pub fn clear_highlight(&mut self) {
        self.last_changed = None;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Cursor position within the history.
    pub fn revision(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}
