//! Scene-graph data model for editable vector documents.
//!
//! The document is a tree of paintable nodes (shapes, text, images,
//! groups) plus paint definitions, stored as a `StableDiGraph` with
//! parent→child edges. Sibling order is paint order — later siblings
//! render on top — so every parent keeps an explicit child-order list;
//! graph adjacency alone is not trusted for ordering.

use crate::id::NodeId;
use crate::style::StyleState;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Reserved id of the background rectangle. Excluded from layer listings,
/// selection, and alignment.
pub const BACKGROUND_ID: &str = "background";

// ─── Attributes ──────────────────────────────────────────────────────────

/// Ordered attribute list. Attribute order is part of the document's
/// serialized form, so a hash map will not do; attribute counts are tiny
/// and linear scans are fine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrMap(SmallVec<[(String, String); 4]>);

impl AttrMap {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Numeric read with the codec's lenient unit handling.
    pub fn get_num(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(crate::style::num_arg)
    }

    /// Set a value, replacing in place to keep the original position.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn set_num(&mut self, key: &str, value: f32) {
        self.set(key, crate::emitter::format_num(value));
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|(k, _)| k.as_str() != key);
        self.0.len() != before
    }

    /// Remove and return a value.
    pub fn take(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// Element kinds the editor understands. Anything else is carried through
/// as `Other` so foreign markup survives a round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Svg,
    Group,
    Defs,
    Rect,
    Circle,
    Ellipse,
    Polygon,
    Path,
    Text,
    Image,
    LinearGradient,
    RadialGradient,
    Stop,
    Other(String),
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "svg" => Self::Svg,
            "g" => Self::Group,
            "defs" => Self::Defs,
            "rect" => Self::Rect,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "polygon" => Self::Polygon,
            "path" => Self::Path,
            "text" => Self::Text,
            "image" => Self::Image,
            "linearGradient" => Self::LinearGradient,
            "radialGradient" => Self::RadialGradient,
            "stop" => Self::Stop,
            _ => Self::Other(tag.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Svg => "svg",
            Self::Group => "g",
            Self::Defs => "defs",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::Path => "path",
            Self::Text => "text",
            Self::Image => "image",
            Self::LinearGradient => "linearGradient",
            Self::RadialGradient => "radialGradient",
            Self::Stop => "stop",
            Self::Other(tag) => tag,
        }
    }

    /// Paintable kinds receive ids at normalization and appear in layer
    /// listings.
    pub fn is_paintable(&self) -> bool {
        matches!(
            self,
            Self::Group
                | Self::Rect
                | Self::Circle
                | Self::Ellipse
                | Self::Polygon
                | Self::Path
                | Self::Text
                | Self::Image
        )
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self, Self::LinearGradient | Self::RadialGradient)
    }
}

// ─── Scene nodes ─────────────────────────────────────────────────────────

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub kind: NodeKind,

    /// Unique document id. `None` only before normalization assigns one.
    pub id: Option<NodeId>,

    /// Non-style attributes in source order (geometry, href, class, ...).
    pub attrs: AttrMap,

    /// Canonical styled-property state (see `style.rs`).
    pub style: StyleState,

    /// Text payload (text nodes and gradient-stop-free leaves only).
    pub text: Option<String>,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            attrs: AttrMap::new(),
            style: StyleState::default(),
            text: None,
        }
    }

    pub fn with_id(kind: NodeKind, id: NodeId) -> Self {
        let mut node = Self::new(kind);
        node.id = Some(id);
        node
    }

    /// Codec lookup: styled value first, then the plain attribute, then the
    /// supplied default.
    pub fn style_or_attr(&self, key: &str, default: &str) -> String {
        if let Some((value, _)) = self.style.serialized(key) {
            return value;
        }
        match key {
            "transform" => {
                if let Some(decl) = self
                    .style
                    .transform
                    .as_ref()
                    .and_then(crate::transform::TransformState::to_declaration)
                {
                    return decl;
                }
            }
            "filter" => {
                if let Some(decl) = self
                    .style
                    .filter
                    .as_ref()
                    .and_then(crate::filter::FilterChain::to_declaration)
                {
                    return decl;
                }
            }
            _ => {}
        }
        if let Some((_, value)) = self.style.extra.iter().find(|(k, _)| k == key) {
            return value.clone();
        }
        self.attrs
            .get(key)
            .map_or_else(|| default.to_string(), str::to_string)
    }

    /// Whether the display-suppression attribute hides this node.
    pub fn is_hidden(&self) -> bool {
        self.attrs.get("display") == Some("none")
    }
}

// ─── Scene graph ─────────────────────────────────────────────────────────

/// The complete document: an `<svg>` root and its ordered descendants.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// The underlying directed graph; edges go parent → child.
    pub graph: StableDiGraph<SceneNode, ()>,

    /// The root `<svg>` node.
    pub root: NodeIndex,

    /// Index from NodeId → NodeIndex for fast lookup.
    pub id_index: HashMap<NodeId, NodeIndex>,

    /// Explicit paint order per parent. Maintained by every structural
    /// mutation; adjacency iteration order is never trusted.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl SceneGraph {
    /// Create an empty canvas of the given pixel size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        let mut root_node = SceneNode::new(NodeKind::Svg);
        root_node
            .attrs
            .set("xmlns", "http://www.w3.org/2000/svg");
        root_node.attrs.set(
            "viewBox",
            format!(
                "0 0 {} {}",
                crate::emitter::format_num(width),
                crate::emitter::format_num(height)
            ),
        );
        root_node.attrs.set_num("width", width);
        root_node.attrs.set_num("height", height);
        Self::from_root(root_node)
    }

    /// Wrap an already-built root node (the parser's entry point).
    pub fn from_root(root_node: SceneNode) -> Self {
        let root_id = root_node.id;
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(root_node);
        let mut id_index = HashMap::new();
        if let Some(id) = root_id {
            id_index.insert(id, root);
        }
        Self {
            graph,
            root,
            id_index,
            child_order: HashMap::new(),
        }
    }

    // ── Lookup ──

    pub fn get(&self, idx: NodeIndex) -> &SceneNode {
        &self.graph[idx]
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> &mut SceneNode {
        &mut self.graph[idx]
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Look up by raw id string.
    pub fn by_id(&self, id: &str) -> Option<NodeIndex> {
        self.index_of(NodeId::intern(id))
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children in paint order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map_or(&[], Vec::as_slice)
    }

    /// All nodes below the root in document (paint) order.
    pub fn descendants(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.collect_descendants(self.root, &mut out);
        out
    }

    /// The subtree rooted at `idx`, including `idx`, in document order.
    pub fn subtree(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = vec![idx];
        self.collect_descendants(idx, &mut out);
        out
    }

    fn collect_descendants(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        for &child in self.children(idx) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    // ── Structure ──

    /// Append a node as the last (top-most) child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        if let Some(id) = id {
            self.id_index.insert(id, idx);
        }
        self.child_order.entry(parent).or_default().push(idx);
        idx
    }

    /// Insert a node at a specific sibling position under `parent`.
    pub fn insert_child_at(&mut self, parent: NodeIndex, node: SceneNode, pos: usize) -> NodeIndex {
        let idx = self.add_child(parent, node);
        let order = self.child_order.entry(parent).or_default();
        order.pop();
        let pos = pos.min(order.len());
        order.insert(pos, idx);
        idx
    }

    /// Remove the subtree rooted at `idx`. Returns false for the root.
    pub fn remove_subtree(&mut self, idx: NodeIndex) -> bool {
        if idx == self.root {
            return false;
        }
        let Some(parent) = self.parent(idx) else {
            return false;
        };
        for node_idx in self.subtree(idx) {
            if let Some(id) = self.graph[node_idx].id {
                self.id_index.remove(&id);
            }
            self.child_order.remove(&node_idx);
            self.graph.remove_node(node_idx);
        }
        if let Some(order) = self.child_order.get_mut(&parent) {
            order.retain(|&c| c != idx);
        }
        true
    }

    /// Swap two sibling positions under `parent`.
    pub fn swap_children(&mut self, parent: NodeIndex, a: usize, b: usize) -> bool {
        match self.child_order.get_mut(&parent) {
            Some(order) if a < order.len() && b < order.len() => {
                order.swap(a, b);
                true
            }
            _ => false,
        }
    }

    /// Move the child at `from` to sibling position `to`.
    pub fn reposition_child(&mut self, parent: NodeIndex, from: usize, to: usize) -> bool {
        match self.child_order.get_mut(&parent) {
            Some(order) if from < order.len() && to < order.len() => {
                let child = order.remove(from);
                order.insert(to, child);
                true
            }
            _ => false,
        }
    }

    /// Position of `child` under its parent, with the parent index.
    pub fn sibling_position(&self, child: NodeIndex) -> Option<(NodeIndex, usize)> {
        let parent = self.parent(child)?;
        let pos = self.children(parent).iter().position(|&c| c == child)?;
        Some((parent, pos))
    }

    /// Re-key a node's id, keeping the index synchronized. The old entry is
    /// only dropped when it still points at this node; with duplicate ids
    /// another node may own the slot.
    pub fn set_node_id(&mut self, idx: NodeIndex, id: NodeId) {
        if let Some(old) = self.graph[idx].id
            && self.id_index.get(&old) == Some(&idx)
        {
            self.id_index.remove(&old);
        }
        self.graph[idx].id = Some(id);
        self.id_index.insert(id, idx);
    }

    /// Deep-copy the subtree rooted at `src_idx` in `src` under `parent`,
    /// appending last. Ids are stripped — the caller assigns fresh ones —
    /// so the copy can never collide with or steal the original's index
    /// entries.
    pub fn graft(&mut self, parent: NodeIndex, src: &SceneGraph, src_idx: NodeIndex) -> NodeIndex {
        let mut node = src.get(src_idx).clone();
        node.id = None;
        let idx = self.add_child(parent, node);
        for &child in src.children(src_idx) {
            self.graft(idx, src, child);
        }
        idx
    }

    /// Assign synthesized ids to every paintable node in a subtree that
    /// lacks one (freshly grafted copies qualify wholesale).
    pub fn ensure_subtree_ids(&mut self, idx: NodeIndex) {
        for (position, node_idx) in self.subtree(idx).into_iter().enumerate() {
            let node = &self.graph[node_idx];
            if node.id.is_none() && node.kind.is_paintable() {
                let id = NodeId::synthesize(node.kind.tag(), position);
                self.set_node_id(node_idx, id);
            }
        }
    }

    // ── Canvas ──

    /// The `viewBox` as (min-x, min-y, width, height).
    pub fn view_box(&self) -> Option<[f32; 4]> {
        let raw = self.get(self.root).attrs.get("viewBox")?;
        let mut nums = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f32>().ok());
        let mut next = || nums.next().flatten();
        Some([next()?, next()?, next()?, next()?])
    }

    /// Canvas pixel size: viewBox dimensions, else width/height attributes,
    /// else the 512×512 default.
    pub fn canvas_size(&self) -> (f32, f32) {
        if let Some([_, _, w, h]) = self.view_box() {
            return (w, h);
        }
        let root = self.get(self.root);
        match (root.attrs.get_num("width"), root.attrs.get_num("height")) {
            (Some(w), Some(h)) => (w, h),
            _ => (512.0, 512.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(id: &str) -> SceneNode {
        SceneNode::with_id(NodeKind::Rect, NodeId::intern(id))
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut sg = SceneGraph::new(100.0, 100.0);
        let a = sg.add_child(sg.root, rect("a"));
        let b = sg.add_child(sg.root, rect("b"));
        let c = sg.insert_child_at(sg.root, rect("c"), 1);
        assert_eq!(sg.children(sg.root), &[a, c, b]);
    }

    #[test]
    fn remove_subtree_clears_ids_and_order() {
        let mut sg = SceneGraph::new(100.0, 100.0);
        let g = sg.add_child(sg.root, SceneNode::with_id(NodeKind::Group, NodeId::intern("g1")));
        sg.add_child(g, rect("inner"));
        let lone = sg.add_child(sg.root, rect("lone"));

        assert!(sg.remove_subtree(g));
        assert!(sg.by_id("g1").is_none());
        assert!(sg.by_id("inner").is_none());
        assert_eq!(sg.children(sg.root), &[lone]);
    }

    #[test]
    fn graft_strips_ids() {
        let mut src = SceneGraph::new(100.0, 100.0);
        let g = src.add_child(src.root, SceneNode::with_id(NodeKind::Group, NodeId::intern("g2")));
        src.add_child(g, rect("r2"));

        let mut dst = SceneGraph::new(100.0, 100.0);
        let copy = dst.graft(dst.root, &src, g);
        assert!(dst.get(copy).id.is_none());
        assert!(dst.by_id("r2").is_none());
        assert_eq!(dst.children(copy).len(), 1);

        dst.ensure_subtree_ids(copy);
        assert!(dst.get(copy).id.is_some());
    }

    #[test]
    fn canvas_size_prefers_view_box() {
        let mut sg = SceneGraph::new(800.0, 600.0);
        assert_eq!(sg.canvas_size(), (800.0, 600.0));
        sg.get_mut(sg.root).attrs.set("viewBox", "0 0 200 100");
        assert_eq!(sg.canvas_size(), (200.0, 100.0));
        assert_eq!(sg.view_box(), Some([0.0, 0.0, 200.0, 100.0]));
    }

    #[test]
    fn style_or_attr_precedence() {
        let mut node = SceneNode::new(NodeKind::Rect);
        node.attrs.set("data-layer", "raw");
        assert_eq!(node.style_or_attr("data-layer", "x"), "raw");
        assert_eq!(node.style_or_attr("missing", "fallback"), "fallback");
        node.style.fill = Some(crate::style::Styled::style(crate::style::Paint::Solid(
            crate::color::Color::rgb(255, 0, 0),
        )));
        assert_eq!(node.style_or_attr("fill", "#000000"), "#ff0000");
    }
}
