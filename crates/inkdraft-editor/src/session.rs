//! The editing session: serialized markup as the single source of truth.
//!
//! Every mutation follows the same path: parse the current text into a
//! fresh scene graph, apply one operation, re-emit, commit the new text
//! to history. Nothing holds a live graph between operations, so derived
//! views (property panels, the layer list) can never drift from the
//! document. Pointer gestures are the one exception to the commit step:
//! their previews replace the text without a history entry, and the
//! release commits exactly once.

use crate::clipboard::Clipboard;
use crate::gesture::{Handle, MoveController, TransformController};
use crate::gradient::{self, GradientKind};
use crate::history::History;
use crate::layers::{self, AlignEdge, AlignOutcome, LayerInfo};
use crate::mutate::{apply_edit, PropertyEdit};
use crate::shapes::{create_shape, ShapeKind};
use crate::shortcuts::{EditorAction, ShortcutMap};
use inkdraft_core::color::Color;
use inkdraft_core::emitter::{emit_document, emit_fragment};
use inkdraft_core::geometry::hit_test;
use inkdraft_core::id::NodeId;
use inkdraft_core::model::{BACKGROUND_ID, NodeKind, SceneGraph, SceneNode};
use inkdraft_core::normalize::{normalize_document, DEFAULT_CANVAS};
use inkdraft_core::parser::parse_document;
use inkdraft_core::style::{Paint, Styled};

/// Snapshots kept before the oldest states start falling off.
const HISTORY_DEPTH: usize = 100;

/// One editing session over one document.
pub struct EditorSession {
    /// Canonical serialized document.
    text: String,

    /// The selected node, shared with the surrounding UI.
    pub selection: Option<NodeId>,

    /// UI zoom factor; move gestures unproject through it.
    pub zoom: f32,

    /// Bumped on every text replacement, including gesture previews.
    /// Front ends compare it to know when to re-render.
    revision: u64,

    history: History,
    clipboard: Clipboard,
    transform: TransformController,
    mover: MoveController,

    /// Why the last text-panel edit was rejected, if it was.
    last_error: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// A blank white canvas at the default size.
    pub fn new() -> Self {
        let mut graph = SceneGraph::new(DEFAULT_CANVAS, DEFAULT_CANVAS);
        let mut bg = SceneNode::with_id(NodeKind::Rect, NodeId::intern(BACKGROUND_ID));
        bg.attrs.set_num("x", 0.0);
        bg.attrs.set_num("y", 0.0);
        bg.attrs.set_num("width", DEFAULT_CANVAS);
        bg.attrs.set_num("height", DEFAULT_CANVAS);
        bg.style.fill = Some(Styled::attr(Paint::Solid(Color::WHITE)));
        let root = graph.root;
        graph.add_child(root, bg);
        Self::from_canonical(emit_document(&graph))
    }

    /// Open an existing document. The text is normalized on the way in;
    /// markup that does not parse is refused outright.
    pub fn open(text: &str) -> Result<Self, String> {
        let normalized = normalize_document(text)?;
        Ok(Self::from_canonical(normalized))
    }

    fn from_canonical(text: String) -> Self {
        Self {
            history: History::new(text.as_str(), HISTORY_DEPTH),
            text,
            selection: None,
            zoom: 1.0,
            revision: 0,
            clipboard: Clipboard::new(),
            transform: TransformController::new(),
            mover: MoveController::new(),
            last_error: None,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn gesture_active(&self) -> bool {
        self.transform.is_dragging() || self.mover.is_dragging()
    }

    /// Top-level layers, topmost first, for the layer panel.
    pub fn layers(&self) -> Vec<LayerInfo> {
        self.graph().map(|g| layers::layer_list(&g)).unwrap_or_default()
    }

    /// A clone of one node for property panels. Recomputed from the text
    /// on every call; panels never hold live references.
    pub fn node_snapshot(&self, id: NodeId) -> Option<SceneNode> {
        let graph = self.graph()?;
        Some(graph.get(graph.index_of(id)?).clone())
    }

    /// Filename for the download action; the payload is `text()` verbatim.
    pub fn export_filename(&self) -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        format!("inkdraft-{secs}.svg")
    }

    // ─── Commit plumbing ─────────────────────────────────────────────────

    fn graph(&self) -> Option<SceneGraph> {
        match parse_document(&self.text) {
            Ok(graph) => Some(graph),
            Err(err) => {
                log::error!("canonical text no longer parses: {err}");
                None
            }
        }
    }

    /// Swap in new canonical text and bump the revision. Every mutation
    /// and every gesture preview funnels through here.
    fn replace_text(&mut self, text: String) {
        self.text = text;
        self.revision += 1;
    }

    /// Run one operation against a fresh parse. `Some` means the graph
    /// changed: the result is re-emitted and committed to history.
    fn mutate<T>(&mut self, op: impl FnOnce(&mut SceneGraph) -> Option<T>) -> Option<T> {
        let mut graph = self.graph()?;
        let out = op(&mut graph)?;
        self.replace_text(emit_document(&graph));
        self.history.commit(&self.text);
        Some(out)
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selection {
            let alive = self.graph().is_some_and(|g| g.index_of(id).is_some());
            if !alive {
                self.selection = None;
            }
        }
    }

    // ─── Document replacement ────────────────────────────────────────────

    /// Replace the whole document from the code panel. Malformed input is
    /// rejected: the last good text stays current and `last_error` carries
    /// the parser's message.
    pub fn set_text(&mut self, input: &str) -> bool {
        match normalize_document(input) {
            Ok(normalized) => {
                self.last_error = None;
                self.replace_text(normalized);
                self.history.commit(&self.text);
                self.prune_selection();
                true
            }
            Err(err) => {
                log::warn!("rejected document edit: {err}");
                self.last_error = Some(err);
                false
            }
        }
    }

    // ─── Property edits ──────────────────────────────────────────────────

    /// Apply one property change to one node. Unknown keys and stale ids
    /// leave the document untouched.
    pub fn apply_property(&mut self, id: NodeId, key: &str, value: &str) -> bool {
        let Some(edit) = PropertyEdit::from_key_value(key, value) else {
            log::debug!("unknown property {key:?}, ignored");
            return false;
        };
        self.mutate(|g| apply_edit(g, id, edit).then_some(())).is_some()
    }

    // ─── Shapes ──────────────────────────────────────────────────────────

    /// Add a new shape at the canvas center and select it.
    pub fn add_shape(&mut self, kind: ShapeKind) -> Option<NodeId> {
        let id = self.mutate(|g| Some(create_shape(g, kind)))?;
        self.selection = Some(id);
        Some(id)
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    pub fn move_up(&mut self, id: NodeId) -> bool {
        self.mutate(|g| layers::move_up(g, id).then_some(())).is_some()
    }

    pub fn move_down(&mut self, id: NodeId) -> bool {
        self.mutate(|g| layers::move_down(g, id).then_some(())).is_some()
    }

    /// Clone a node next to itself; the clone becomes the selection.
    pub fn duplicate(&mut self, id: NodeId) -> Option<NodeId> {
        let copy = self.mutate(|g| layers::duplicate(g, id))?;
        self.selection = Some(copy);
        Some(copy)
    }

    pub fn delete(&mut self, id: NodeId) -> bool {
        let removed = self.mutate(|g| layers::delete(g, id).then_some(())).is_some();
        if removed && self.selection == Some(id) {
            self.selection = None;
        }
        removed
    }

    pub fn toggle_visibility(&mut self, id: NodeId) -> bool {
        self.mutate(|g| layers::toggle_visibility(g, id).then_some(()))
            .is_some()
    }

    pub fn align(&mut self, id: NodeId, edge: AlignEdge) -> AlignOutcome {
        let mut outcome = AlignOutcome::Missing;
        self.mutate(|g| {
            outcome = layers::align(g, id, edge);
            (outcome == AlignOutcome::Applied).then_some(())
        });
        outcome
    }

    // ─── Fills ───────────────────────────────────────────────────────────

    pub fn set_gradient(
        &mut self,
        id: NodeId,
        kind: GradientKind,
        start: Color,
        end: Color,
    ) -> Option<NodeId> {
        self.mutate(|g| gradient::set_gradient(g, id, kind, start, end))
    }

    pub fn set_solid_fill(&mut self, id: NodeId) -> bool {
        self.mutate(|g| gradient::set_solid(g, id).then_some(())).is_some()
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Serialize a subtree into the clipboard slot. Does not touch the
    /// document.
    pub fn copy(&mut self, id: NodeId) -> bool {
        let Some(graph) = self.graph() else {
            return false;
        };
        let Some(idx) = graph.index_of(id) else {
            log::debug!("copy of stale node #{id}, ignored");
            return false;
        };
        let markup = emit_fragment(&graph, idx);
        self.clipboard.store(markup, graph.get(idx).kind.tag());
        true
    }

    pub fn cut(&mut self, id: NodeId) -> bool {
        self.copy(id) && self.delete(id)
    }

    /// Clone the stored subtree back in, offset, topmost, selected. The
    /// slot is read, not cleared, so repeated pastes work.
    pub fn paste(&mut self) -> Option<NodeId> {
        let markup = self.clipboard.get()?.markup.clone();
        let id = self.mutate(|g| layers::insert_fragment(g, &markup))?;
        self.selection = Some(id);
        Some(id)
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().map(str::to_string) else {
            return false;
        };
        self.replace_text(snapshot);
        self.prune_selection();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().map(str::to_string) else {
            return false;
        };
        self.replace_text(snapshot);
        self.prune_selection();
        true
    }

    // ─── Pointer gestures ────────────────────────────────────────────────

    /// Canvas click in canvas coordinates: selects the topmost hit,
    /// clears the selection over the background or empty space.
    pub fn click(&mut self, px: f32, py: f32) -> Option<NodeId> {
        let hit = self.graph().and_then(|g| hit_test(&g, px, py));
        self.selection = hit;
        hit
    }

    pub fn begin_transform(&mut self, id: NodeId, handle: Handle, px: f32, py: f32) -> bool {
        let Some(graph) = self.graph() else {
            return false;
        };
        self.transform.begin(&graph, id, handle, px, py)
    }

    /// Live transform preview: replaces the text, no history entry.
    pub fn update_transform(&mut self, px: f32, py: f32, skew_modifier: bool) -> bool {
        let Some(mut graph) = self.graph() else {
            return false;
        };
        if !self.transform.update(&mut graph, px, py, skew_modifier) {
            return false;
        }
        self.replace_text(emit_document(&graph));
        true
    }

    /// Pointer-up: one commit for the whole gesture.
    pub fn end_transform(&mut self) -> bool {
        if self.transform.finish().is_none() {
            return false;
        }
        self.history.commit(&self.text);
        true
    }

    pub fn begin_move(&mut self, id: NodeId, px: f32, py: f32) -> bool {
        let Some(graph) = self.graph() else {
            return false;
        };
        self.mover.begin(&graph, id, px, py, self.zoom)
    }

    pub fn update_move(&mut self, px: f32, py: f32) -> bool {
        let Some(mut graph) = self.graph() else {
            return false;
        };
        if !self.mover.update(&mut graph, px, py) {
            return false;
        }
        self.replace_text(emit_document(&graph));
        true
    }

    pub fn end_move(&mut self) -> bool {
        if self.mover.finish().is_none() {
            return false;
        }
        self.history.commit(&self.text);
        true
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Route a key event through the shortcut map. Returns whether the
    /// event was consumed.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return false;
        };
        self.perform(action)
    }

    pub fn perform(&mut self, action: EditorAction) -> bool {
        match action {
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
            EditorAction::Paste => self.paste().is_some(),
            EditorAction::Deselect => {
                self.selection = None;
                true
            }
            EditorAction::Delete => match self.selection {
                Some(id) => self.delete(id),
                None => false,
            },
            EditorAction::Duplicate => match self.selection {
                Some(id) => self.duplicate(id).is_some(),
                None => false,
            },
            EditorAction::Copy => match self.selection {
                Some(id) => self.copy(id),
                None => false,
            },
            EditorAction::Cut => match self.selection {
                Some(id) => self.cut(id),
                None => false,
            },
            EditorAction::Nudge(dx, dy) => match self.selection {
                Some(id) => self.nudge(id, dx, dy),
                None => false,
            },
        }
    }

    /// Arrow-key move: position attributes for simple shapes, an appended
    /// translate for everything else.
    pub fn nudge(&mut self, id: NodeId, dx: f32, dy: f32) -> bool {
        self.mutate(|g| {
            let idx = g.index_of(id)?;
            layers::offset_node(g, idx, dx, dy);
            Some(())
        })
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_session() -> EditorSession {
        EditorSession::open(
            "<svg viewBox=\"0 0 100 100\">\
             <rect id=\"background\" x=\"0\" y=\"0\" width=\"100\" height=\"100\" fill=\"#ffffff\"/>\
             <rect id=\"a\" x=\"10\" y=\"10\" width=\"20\" height=\"20\" fill=\"#ff0000\"/>\
             </svg>",
        )
        .unwrap()
    }

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    #[test]
    fn blank_session_is_normalized() {
        let session = EditorSession::new();
        assert!(session.text().contains("viewBox=\"0 0 512 512\""));
        assert!(session.text().contains("id=\"background\""));
        assert!(!session.can_undo());
    }

    #[test]
    fn open_rejects_malformed_markup() {
        assert!(EditorSession::open("<svg><rect</svg>").is_err());
    }

    #[test]
    fn rejected_text_edit_keeps_last_good_state() {
        let mut session = rect_session();
        let before = session.text().to_string();
        assert!(!session.set_text("<svg><g></svg>"));
        assert_eq!(session.text(), before);
        assert!(session.last_error().is_some());

        // a later good edit clears the error
        assert!(session.set_text("<svg viewBox=\"0 0 50 50\"/>"));
        assert!(session.last_error().is_none());
    }

    #[test]
    fn property_edit_commits_and_undoes() {
        let mut session = rect_session();
        assert!(session.apply_property(id("a"), "fill", "#00ff00"));
        assert!(session.text().contains("#00ff00"));
        assert!(session.undo());
        assert!(!session.text().contains("#00ff00"));
        assert!(session.redo());
        assert!(session.text().contains("#00ff00"));
    }

    #[test]
    fn stale_property_edit_is_a_no_op() {
        let mut session = rect_session();
        let before = session.text().to_string();
        assert!(!session.apply_property(id("ghost"), "fill", "#00ff00"));
        assert_eq!(session.text(), before);
        assert!(!session.can_undo());
    }

    #[test]
    fn added_shape_is_selected_and_topmost() {
        let mut session = rect_session();
        let star = session.add_shape(ShapeKind::Star).unwrap();
        assert_eq!(session.selection, Some(star));
        let layers = session.layers();
        assert_eq!(layers[0].id, star);
    }

    #[test]
    fn delete_clears_selection_and_supports_undo() {
        let mut session = rect_session();
        session.selection = Some(id("a"));
        assert!(session.delete(id("a")));
        assert_eq!(session.selection, None);
        assert!(session.undo());
        assert!(session.text().contains("id=\"a\""));
    }

    #[test]
    fn copy_paste_can_repeat() {
        let mut session = rect_session();
        assert!(session.copy(id("a")));
        let first = session.paste().unwrap();
        let second = session.paste().unwrap();
        assert_ne!(first, second);
        assert!(session.text().contains("id=\"a\""));
    }

    #[test]
    fn cut_removes_and_stores() {
        let mut session = rect_session();
        assert!(session.cut(id("a")));
        assert!(!session.text().contains("id=\"a\""));
        let pasted = session.paste().unwrap();
        assert_eq!(session.selection, Some(pasted));
    }

    #[test]
    fn click_selects_topmost_and_background_clears() {
        let mut session = rect_session();
        assert_eq!(session.click(15.0, 15.0), Some(id("a")));
        assert_eq!(session.selection, Some(id("a")));
        // background under (90, 90)
        assert_eq!(session.click(90.0, 90.0), None);
        assert_eq!(session.selection, None);
    }

    #[test]
    fn shortcut_routing_reaches_the_document() {
        let mut session = rect_session();
        session.selection = Some(id("a"));
        // plain arrow nudges by one unit
        assert!(session.handle_key("ArrowRight", false, false, false, false));
        let node = session.node_snapshot(id("a")).unwrap();
        assert_eq!(node.attrs.get_num("x"), Some(11.0));
        // mod+z undoes it
        assert!(session.handle_key("z", true, false, false, false));
        let node = session.node_snapshot(id("a")).unwrap();
        assert_eq!(node.attrs.get_num("x"), Some(10.0));
        // Escape deselects
        assert!(session.handle_key("Escape", false, false, false, false));
        assert_eq!(session.selection, None);
    }

    #[test]
    fn move_gesture_commits_once() {
        let mut session = rect_session();
        assert!(!session.can_undo());
        assert!(session.begin_move(id("a"), 0.0, 0.0));
        assert!(session.update_move(3.0, 0.0));
        assert!(session.update_move(7.0, 0.0));
        assert!(!session.can_undo(), "previews must not commit");
        assert!(session.end_move());
        assert!(session.can_undo());

        let node = session.node_snapshot(id("a")).unwrap();
        assert_eq!(node.attrs.get_num("x"), Some(17.0));

        // one undo returns to the pre-gesture state
        assert!(session.undo());
        let node = session.node_snapshot(id("a")).unwrap();
        assert_eq!(node.attrs.get_num("x"), Some(10.0));
        assert!(!session.can_undo());
    }

    #[test]
    fn transform_gesture_commits_once() {
        let mut session = rect_session();
        assert!(session.begin_transform(id("a"), Handle::South, 20.0, 30.0));
        assert!(session.update_transform(20.0, 40.0, false));
        assert!(session.end_transform());
        assert!(session.text().contains("rotate(0deg) scale(1, 1.5)"));
        assert!(session.undo());
        assert!(!session.text().contains("scale(1, 1.5)"));
    }

    #[test]
    fn revision_tracks_every_replacement() {
        let mut session = rect_session();
        let r0 = session.revision();
        session.apply_property(id("a"), "x", "30");
        assert!(session.revision() > r0);
    }
}
