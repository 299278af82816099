//! Gradient definitions and solid/gradient fill switching.
//!
//! Every gradient edit mints a brand-new definition under `<defs>` and
//! repoints the node's fill at it. Definitions orphaned by later edits
//! stay in the document; sessions are short and the markup stays legible.

use inkdraft_core::color::Color;
use inkdraft_core::id::NodeId;
use inkdraft_core::model::{NodeKind, SceneGraph, SceneNode};
use inkdraft_core::style::{Paint, Repr, Styled};
use petgraph::stable_graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
}

impl GradientKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Self::Linear),
            "radial" => Some(Self::Radial),
            _ => None,
        }
    }

    fn node_kind(self) -> NodeKind {
        match self {
            Self::Linear => NodeKind::LinearGradient,
            Self::Radial => NodeKind::RadialGradient,
        }
    }
}

/// Drop any style-string fill override so the plain fill attribute shows
/// through again. Fill carried only by the style string reverts to unset.
pub fn set_solid(graph: &mut SceneGraph, id: NodeId) -> bool {
    let Some(idx) = graph.index_of(id) else {
        log::debug!("solid fill on stale node #{id}, ignored");
        return false;
    };
    let node = graph.get_mut(idx);
    if let Some(styled) = node.style.fill.take() {
        match styled.repr {
            Repr::Attr => node.style.fill = Some(styled),
            Repr::Both => node.style.fill = Some(Styled::attr(styled.value)),
            Repr::Style => {}
        }
    }
    true
}

/// Mint a new two-stop gradient definition and point the node's fill at
/// it. The fill is written as a plain attribute with no style half that
/// could shadow the reference. Returns the new definition's id.
pub fn set_gradient(
    graph: &mut SceneGraph,
    id: NodeId,
    kind: GradientKind,
    start: Color,
    end: Color,
) -> Option<NodeId> {
    let idx = graph.index_of(id)?;
    let defs = ensure_defs(graph);

    let grad_id = NodeId::synthesize(kind.node_kind().tag(), graph.children(defs).len());
    let def = graph.add_child(defs, SceneNode::with_id(kind.node_kind(), grad_id));
    for (offset, color) in [("0%", start), ("100%", end)] {
        let mut stop = SceneNode::new(NodeKind::Stop);
        stop.attrs.set("offset", offset);
        stop.attrs.set("stop-color", color.to_hex());
        graph.add_child(def, stop);
    }

    graph.get_mut(idx).style.fill = Some(Styled::attr(Paint::Reference(grad_id)));
    log::debug!("fill of #{id} now references #{grad_id}");
    Some(grad_id)
}

/// The definitions container, created as the first child when absent so
/// referenced paints parse before anything that uses them.
fn ensure_defs(graph: &mut SceneGraph) -> NodeIndex {
    let root = graph.root;
    let existing = graph
        .children(root)
        .iter()
        .copied()
        .find(|&i| graph.get(i).kind == NodeKind::Defs);
    match existing {
        Some(idx) => idx,
        None => graph.insert_child_at(root, SceneNode::new(NodeKind::Defs), 0),
    }
}

/// Stops of a gradient definition as (offset, color) pairs, for the fill
/// controls to display.
pub fn gradient_stops(graph: &SceneGraph, grad_id: NodeId) -> Vec<(String, Color)> {
    let Some(idx) = graph.index_of(grad_id) else {
        return Vec::new();
    };
    graph
        .children(idx)
        .iter()
        .filter_map(|&i| {
            let stop = graph.get(i);
            if stop.kind != NodeKind::Stop {
                return None;
            }
            let offset = stop.attrs.get("offset")?.to_string();
            let color = Color::parse(stop.attrs.get("stop-color")?)?;
            Some((offset, color))
        })
        .collect()
}
