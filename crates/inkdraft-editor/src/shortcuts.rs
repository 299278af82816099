//! Keyboard bindings.
//!
//! One table from key + modifier combos to semantic `EditorAction`s,
//! kept in the engine so every front end resolves the same combos.
//! Zoom keys stay with the UI and have no binding here.

/// Nudge distance for a bare arrow key, in canvas units.
pub const NUDGE_FINE: f32 = 1.0;

/// Nudge distance with Shift held.
pub const NUDGE_COARSE: f32 = 10.0;

/// Everything the keyboard can ask the session to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorAction {
    Undo,
    Redo,
    Delete,
    Duplicate,
    Copy,
    Cut,
    Paste,
    /// Arrow-key move of the selected node by (dx, dy) canvas units.
    Nudge(f32, f32),
    Deselect,
}

/// Translates key events into editor actions. Either `ctrl` or `meta`
/// counts as the command modifier, so one table serves macOS and
/// everything else.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Map one key event. `key` carries the DOM `KeyboardEvent.key`
    /// spelling (`"z"`, `"ArrowLeft"`, `"Delete"`); unbound combos
    /// yield `None`.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<EditorAction> {
        if ctrl || meta {
            return match (key, shift) {
                ("z" | "Z", false) => Some(EditorAction::Undo),
                ("z" | "Z", true) => Some(EditorAction::Redo),
                ("y" | "Y", false) => Some(EditorAction::Redo),
                ("d" | "D", false) => Some(EditorAction::Duplicate),
                ("c" | "C", false) => Some(EditorAction::Copy),
                ("x" | "X", false) => Some(EditorAction::Cut),
                ("v" | "V", false) => Some(EditorAction::Paste),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(EditorAction::Delete),
            "Escape" => Some(EditorAction::Deselect),
            // shift widens the nudge step, nothing else
            _ => arrow_nudge(key, if shift { NUDGE_COARSE } else { NUDGE_FINE }),
        }
    }
}

fn arrow_nudge(key: &str, step: f32) -> Option<EditorAction> {
    match key {
        "ArrowLeft" => Some(EditorAction::Nudge(-step, 0.0)),
        "ArrowRight" => Some(EditorAction::Nudge(step, 0.0)),
        "ArrowUp" => Some(EditorAction::Nudge(0.0, -step)),
        "ArrowDown" => Some(EditorAction::Nudge(0.0, step)),
        _ => None,
    }
}
