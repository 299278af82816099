//! Single-slot clipboard.
//!
//! Copy serializes the selected subtree to markup and parks it here;
//! paste re-parses it with fresh ids. Holding text rather than live
//! nodes means the slot survives deletes, undo, and document reloads.

/// One parked subtree. `kind` is the root element's tag, kept for UI
/// labels ("Paste rect").
#[derive(Debug, Clone, PartialEq)]
pub struct ClipEntry {
    pub markup: String,
    pub kind: String,
}

#[derive(Debug, Default)]
pub struct Clipboard {
    slot: Option<ClipEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot. There is only ever one entry.
    pub fn store(&mut self, markup: impl Into<String>, kind: impl Into<String>) {
        self.slot = Some(ClipEntry {
            markup: markup.into(),
            kind: kind.into(),
        });
    }

    /// The parked entry, if any. Paste does not consume it, so the same
    /// subtree can be stamped out repeatedly.
    pub fn get(&self) -> Option<&ClipEntry> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_replaces_previous_entry() {
        let mut cb = Clipboard::new();
        assert!(cb.is_empty());

        cb.store("<rect/>", "rect");
        cb.store("<circle/>", "circle");

        let entry = cb.get().unwrap();
        assert_eq!(entry.markup, "<circle/>");
        assert_eq!(entry.kind, "circle");
    }

    #[test]
    fn get_does_not_consume() {
        let mut cb = Clipboard::new();
        cb.store("<rect/>", "rect");
        assert!(cb.get().is_some());
        assert!(cb.get().is_some());
    }
}
