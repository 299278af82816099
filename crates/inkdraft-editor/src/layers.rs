//! Layer operations: z-order, duplication, visibility, alignment.
//!
//! Sibling order is paint order, so "up" in the layer panel means later
//! in the document. The background rect never appears in listings and
//! acts as the floor for downward moves.

use inkdraft_core::emitter::emit_fragment;
use inkdraft_core::geometry::node_bounds;
use inkdraft_core::id::NodeId;
use inkdraft_core::model::{BACKGROUND_ID, NodeKind, SceneGraph};
use inkdraft_core::parser::parse_fragment;
use inkdraft_core::style::Styled;
use petgraph::stable_graph::NodeIndex;

/// Positional offset applied to duplicates and pasted subtrees so the
/// copy never lands exactly over its source.
pub const PASTE_OFFSET: f32 = 10.0;

// ─── Z-order ─────────────────────────────────────────────────────────────

/// Raise the node one step in paint order. No-op at the top.
pub fn move_up(graph: &mut SceneGraph, id: NodeId) -> bool {
    let Some(idx) = graph.index_of(id) else {
        return false;
    };
    let Some((parent, pos)) = graph.sibling_position(idx) else {
        return false;
    };
    if pos + 1 >= graph.children(parent).len() {
        return false;
    }
    graph.swap_children(parent, pos, pos + 1)
}

/// Lower the node one step in paint order. No-op at the bottom; the
/// background rect counts as the floor, nothing sinks beneath it.
pub fn move_down(graph: &mut SceneGraph, id: NodeId) -> bool {
    let Some(idx) = graph.index_of(id) else {
        return false;
    };
    let Some((parent, pos)) = graph.sibling_position(idx) else {
        return false;
    };
    if pos == 0 {
        return false;
    }
    let below = graph.children(parent)[pos - 1];
    if is_background(graph, below) {
        return false;
    }
    graph.swap_children(parent, pos - 1, pos)
}

fn is_background(graph: &SceneGraph, idx: NodeIndex) -> bool {
    graph.get(idx).id.is_some_and(|id| id.as_str() == BACKGROUND_ID)
}

// ─── Clone machinery ─────────────────────────────────────────────────────

/// Deep-clone the node's subtree, offset it by the paste offset, and
/// insert it immediately after the original. Returns the clone's fresh id.
pub fn duplicate(graph: &mut SceneGraph, id: NodeId) -> Option<NodeId> {
    let idx = graph.index_of(id)?;
    let (parent, pos) = graph.sibling_position(idx)?;

    let markup = emit_fragment(graph, idx);
    let fragment = parse_fragment(&markup).ok()?;
    let src = *fragment.children(fragment.root).first()?;

    let copy = graph.graft(parent, &fragment, src);
    let last = graph.children(parent).len() - 1;
    graph.reposition_child(parent, last, pos + 1);
    graph.ensure_subtree_ids(copy);
    offset_node(graph, copy, PASTE_OFFSET, PASTE_OFFSET);
    graph.get(copy).id
}

/// Re-parse a serialized subtree, append it topmost with fresh ids, and
/// offset it. This is the paste path; `None` when the markup is invalid.
pub fn insert_fragment(graph: &mut SceneGraph, markup: &str) -> Option<NodeId> {
    let fragment = parse_fragment(markup).ok()?;
    let src = *fragment.children(fragment.root).first()?;
    let root = graph.root;
    let copy = graph.graft(root, &fragment, src);
    graph.ensure_subtree_ids(copy);
    offset_node(graph, copy, PASTE_OFFSET, PASTE_OFFSET);
    graph.get(copy).id
}

/// Shift a node: simple shapes through their position attributes,
/// everything else through an appended translate channel.
pub fn offset_node(graph: &mut SceneGraph, idx: NodeIndex, dx: f32, dy: f32) {
    let node = graph.get_mut(idx);
    match node.kind {
        NodeKind::Rect | NodeKind::Image | NodeKind::Text => {
            let x = node.attrs.get_num("x").unwrap_or(0.0);
            let y = node.attrs.get_num("y").unwrap_or(0.0);
            node.attrs.set_num("x", x + dx);
            node.attrs.set_num("y", y + dy);
        }
        NodeKind::Circle | NodeKind::Ellipse => {
            let cx = node.attrs.get_num("cx").unwrap_or(0.0);
            let cy = node.attrs.get_num("cy").unwrap_or(0.0);
            node.attrs.set_num("cx", cx + dx);
            node.attrs.set_num("cy", cy + dy);
        }
        _ => {
            let mut t = node.style.transform_or_default();
            let (tx, ty) = t.translate.unwrap_or((0.0, 0.0));
            t.translate = Some((tx + dx, ty + dy));
            node.style.transform = Some(t);
        }
    }
}

// ─── Delete / visibility ─────────────────────────────────────────────────

/// Remove the node's subtree. The caller clears any selection that
/// referenced it.
pub fn delete(graph: &mut SceneGraph, id: NodeId) -> bool {
    match graph.index_of(id) {
        Some(idx) => graph.remove_subtree(idx),
        None => false,
    }
}

/// Flip the display-suppression attribute.
pub fn toggle_visibility(graph: &mut SceneGraph, id: NodeId) -> bool {
    let Some(idx) = graph.index_of(id) else {
        return false;
    };
    let node = graph.get_mut(idx);
    if node.attrs.get("display") == Some("none") {
        node.attrs.remove("display");
    } else {
        node.attrs.set("display", "none");
    }
    true
}

// ─── Alignment ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignEdge {
    Left,
    HCenter,
    Right,
    Top,
    VCenter,
    Bottom,
}

impl AlignEdge {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "left" => Self::Left,
            "center" => Self::HCenter,
            "right" => Self::Right,
            "top" => Self::Top,
            "middle" => Self::VCenter,
            "bottom" => Self::Bottom,
            _ => return None,
        })
    }

    fn horizontal(self) -> bool {
        matches!(self, Self::Left | Self::HCenter | Self::Right)
    }
}

/// Result of an alignment request. Kinds without editable position
/// attributes (polygons, paths, groups) and non-center text alignment
/// report `Unsupported` rather than pretending to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOutcome {
    Applied,
    Unsupported,
    Missing,
}

/// Align the node's geometry-derived bounding box against the canvas.
pub fn align(graph: &mut SceneGraph, id: NodeId, edge: AlignEdge) -> AlignOutcome {
    let Some(idx) = graph.index_of(id) else {
        return AlignOutcome::Missing;
    };
    if id.as_str() == BACKGROUND_ID {
        return AlignOutcome::Unsupported;
    }
    let [min_x, min_y, cw, ch] = graph.view_box().unwrap_or_else(|| {
        let (w, h) = graph.canvas_size();
        [0.0, 0.0, w, h]
    });

    match graph.get(idx).kind.clone() {
        NodeKind::Rect | NodeKind::Image => {
            let Some(b) = node_bounds(graph, idx) else {
                return AlignOutcome::Unsupported;
            };
            let node = graph.get_mut(idx);
            if edge.horizontal() {
                let x = match edge {
                    AlignEdge::Left => min_x,
                    AlignEdge::HCenter => min_x + (cw - b.width) / 2.0,
                    _ => min_x + cw - b.width,
                };
                node.attrs.set_num("x", x);
            } else {
                let y = match edge {
                    AlignEdge::Top => min_y,
                    AlignEdge::VCenter => min_y + (ch - b.height) / 2.0,
                    _ => min_y + ch - b.height,
                };
                node.attrs.set_num("y", y);
            }
            AlignOutcome::Applied
        }
        kind @ (NodeKind::Circle | NodeKind::Ellipse) => {
            let node = graph.get_mut(idx);
            let (rx, ry) = if matches!(kind, NodeKind::Circle) {
                let r = node.attrs.get_num("r").unwrap_or(0.0);
                (r, r)
            } else {
                (
                    node.attrs.get_num("rx").unwrap_or(0.0),
                    node.attrs.get_num("ry").unwrap_or(0.0),
                )
            };
            if edge.horizontal() {
                let cx = match edge {
                    AlignEdge::Left => min_x + rx,
                    AlignEdge::HCenter => min_x + cw / 2.0,
                    _ => min_x + cw - rx,
                };
                node.attrs.set_num("cx", cx);
            } else {
                let cy = match edge {
                    AlignEdge::Top => min_y + ry,
                    AlignEdge::VCenter => min_y + ch / 2.0,
                    _ => min_y + ch - ry,
                };
                node.attrs.set_num("cy", cy);
            }
            AlignOutcome::Applied
        }
        NodeKind::Text => {
            // Only horizontal centering is meaningful without measuring
            // rendered glyphs.
            if edge != AlignEdge::HCenter {
                return AlignOutcome::Unsupported;
            }
            let node = graph.get_mut(idx);
            node.attrs.set_num("x", min_x + cw / 2.0);
            node.style.text_anchor = Some(Styled::attr("middle".to_string()));
            AlignOutcome::Applied
        }
        _ => AlignOutcome::Unsupported,
    }
}

// ─── Layer listing ───────────────────────────────────────────────────────

/// One entry of the layer panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub id: NodeId,
    pub kind: String,
    pub hidden: bool,
}

/// Top-level layers, topmost first. The background rect and non-paintable
/// machinery (defs, gradients) are excluded.
pub fn layer_list(graph: &SceneGraph) -> Vec<LayerInfo> {
    graph
        .children(graph.root)
        .iter()
        .rev()
        .filter_map(|&idx| {
            let node = graph.get(idx);
            if !node.kind.is_paintable() {
                return None;
            }
            let id = node.id?;
            if id.as_str() == BACKGROUND_ID {
                return None;
            }
            Some(LayerInfo {
                id,
                kind: node.kind.tag().to_string(),
                hidden: node.is_hidden(),
            })
        })
        .collect()
}
