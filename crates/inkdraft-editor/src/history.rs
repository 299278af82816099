//! Undo/Redo snapshot history.
//!
//! Every committed edit stores the full document text. A drag gesture
//! runs many live preview frames but commits exactly one snapshot on
//! release, so undo reverses the whole gesture in a single step.

/// Linear snapshot list with a cursor. The entry at `cursor` is always
/// the current document text.
pub struct History {
    snapshots: Vec<String>,
    cursor: usize,
    /// Maximum number of retained snapshots, oldest trimmed first.
    max_depth: usize,
}

impl History {
    pub fn new(initial: impl Into<String>, max_depth: usize) -> Self {
        Self {
            snapshots: vec![initial.into()],
            cursor: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Commit a new state. Any redo tail beyond the cursor is discarded
    /// first, so redo never resurrects an abandoned branch. Committing
    /// text identical to the current snapshot is a no-op.
    pub fn commit(&mut self, text: &str) -> bool {
        self.snapshots.truncate(self.cursor + 1);
        if self.snapshots.last().map(String::as_str) == Some(text) {
            return false;
        }
        self.snapshots.push(text.to_string());
        if self.snapshots.len() > self.max_depth {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
        true
    }

    /// Step back one snapshot. `None` when already at the oldest state.
    pub fn undo(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward one snapshot. `None` when already at the newest state.
    pub fn redo(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> &str {
        &self.snapshots[self.cursor]
    }

    /// Drop everything and restart from a fresh initial state, as when a
    /// new document is loaded.
    pub fn reset(&mut self, initial: impl Into<String>) {
        self.snapshots = vec![initial.into()];
        self.cursor = 0;
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }
}
