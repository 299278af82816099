//! Geometry: per-node bounding boxes and point → node hit testing.
//!
//! Bounds are derived from geometry attributes in the node's own
//! coordinate space, before any transform is applied. Polygon and path
//! outlines are approximated by scanning their coordinate lists, which
//! is exact for the shapes this crate generates (absolute commands) and
//! a usable envelope for foreign relative paths.

use crate::id::NodeId;
use crate::model::{BACKGROUND_ID, NodeKind, SceneGraph};
use crate::style::num_arg;
use petgraph::stable_graph::NodeIndex;

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// AABB overlap against a rectangle.
    pub fn intersects_rect(&self, rx: f32, ry: f32, rw: f32, rh: f32) -> bool {
        self.x < rx + rw
            && self.x + self.width > rx
            && self.y < ry + rh
            && self.y + self.height > ry
    }

    fn union(self, other: Bounds) -> Bounds {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        Bounds {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    fn from_points(points: &[f32]) -> Option<Bounds> {
        if points.len() < 2 {
            return None;
        }
        let (mut x0, mut y0) = (f32::MAX, f32::MAX);
        let (mut x1, mut y1) = (f32::MIN, f32::MIN);
        for pair in points.chunks_exact(2) {
            x0 = x0.min(pair[0]);
            y0 = y0.min(pair[1]);
            x1 = x1.max(pair[0]);
            y1 = y1.max(pair[1]);
        }
        Some(Bounds {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

// ─── Per-node bounds ─────────────────────────────────────────────────────

/// Bounding box of a single node, groups spanning their children.
/// `None` for nodes with no renderable extent (defs, gradients, the root).
pub fn node_bounds(graph: &SceneGraph, idx: NodeIndex) -> Option<Bounds> {
    let node = graph.get(idx);
    let num = |key: &str| node.attrs.get_num(key).unwrap_or(0.0);
    match &node.kind {
        NodeKind::Rect | NodeKind::Image => Some(Bounds {
            x: num("x"),
            y: num("y"),
            width: num("width"),
            height: num("height"),
        }),
        NodeKind::Circle => {
            let r = num("r");
            Some(Bounds {
                x: num("cx") - r,
                y: num("cy") - r,
                width: r * 2.0,
                height: r * 2.0,
            })
        }
        NodeKind::Ellipse => {
            let (rx, ry) = (num("rx"), num("ry"));
            Some(Bounds {
                x: num("cx") - rx,
                y: num("cy") - ry,
                width: rx * 2.0,
                height: ry * 2.0,
            })
        }
        NodeKind::Polygon => Bounds::from_points(&scan_numbers(node.attrs.get("points")?)),
        NodeKind::Path => Bounds::from_points(&scan_numbers(node.attrs.get("d")?)),
        NodeKind::Text => Some(text_bounds(graph, idx)),
        NodeKind::Group => {
            let mut acc: Option<Bounds> = None;
            for &child in graph.children(idx) {
                if let Some(b) = node_bounds(graph, child) {
                    acc = Some(match acc {
                        Some(prev) => prev.union(b),
                        None => b,
                    });
                }
            }
            acc
        }
        _ => None,
    }
}

/// Approximate text extent from font size and glyph count. The baseline
/// anchor means the box sits mostly above (x, y); `text-anchor` shifts
/// it horizontally.
fn text_bounds(graph: &SceneGraph, idx: NodeIndex) -> Bounds {
    let node = graph.get(idx);
    let font_size = num_arg(&node.style_or_attr("font-size", "16")).unwrap_or(16.0);
    let glyphs = node.text.as_deref().map_or(0, |t| t.chars().count());
    let width = glyphs as f32 * font_size * 0.6;
    let height = font_size * 1.2;
    let x = node.attrs.get_num("x").unwrap_or(0.0);
    let y = node.attrs.get_num("y").unwrap_or(0.0);
    let shift = match node.style_or_attr("text-anchor", "start").as_str() {
        "middle" => width / 2.0,
        "end" => width,
        _ => 0.0,
    };
    Bounds {
        x: x - shift,
        y: y - font_size,
        width,
        height,
    }
}

/// Lenient numeric scan over polygon point lists and path data. A minus
/// sign starts a new number except directly after an exponent marker.
fn scan_numbers(raw: &str) -> Vec<f32> {
    let mut out = Vec::new();
    let mut token = String::new();
    let mut prev = '\0';
    for c in raw.chars() {
        let extends = c.is_ascii_digit()
            || c == '.'
            || (c == '-' && matches!(prev, 'e' | 'E'))
            || ((c == 'e' || c == 'E') && !token.is_empty());
        if extends {
            token.push(c);
        } else {
            if let Ok(n) = token.parse::<f32>() {
                out.push(n);
            }
            token.clear();
            if c == '-' {
                token.push(c);
            }
        }
        prev = c;
    }
    if let Ok(n) = token.parse::<f32>() {
        out.push(n);
    }
    out
}

// ─── Hit testing ─────────────────────────────────────────────────────────

/// Topmost paintable node at (px, py), walking paint order back to front.
/// The background rect and hidden subtrees never hit; a miss means the
/// caller should clear its selection.
pub fn hit_test(graph: &SceneGraph, px: f32, py: f32) -> Option<NodeId> {
    hit_test_node(graph, graph.root, px, py)
}

fn hit_test_node(graph: &SceneGraph, idx: NodeIndex, px: f32, py: f32) -> Option<NodeId> {
    let node = graph.get(idx);
    if node.is_hidden() || matches!(node.kind, NodeKind::Defs) {
        return None;
    }

    // Later siblings paint on top, so test them first.
    let children = graph.children(idx);
    for &child in children.iter().rev() {
        if let Some(hit) = hit_test_node(graph, child, px, py) {
            return Some(hit);
        }
    }

    if !node.kind.is_paintable() {
        return None;
    }
    let id = node.id?;
    if id.as_str() == BACKGROUND_ID {
        return None;
    }
    if node_bounds(graph, idx).is_some_and(|b| b.contains(px, py)) {
        return Some(id);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn graph_of(src: &str) -> SceneGraph {
        parse_document(src).unwrap()
    }

    #[test]
    fn rect_bounds_from_attrs() {
        let g = graph_of("<svg><rect id=\"r\" x=\"10\" y=\"20\" width=\"30\" height=\"40\"/></svg>");
        let idx = g.by_id("r").unwrap();
        assert_eq!(
            node_bounds(&g, idx),
            Some(Bounds {
                x: 10.0,
                y: 20.0,
                width: 30.0,
                height: 40.0
            })
        );
    }

    #[test]
    fn circle_bounds_centered() {
        let g = graph_of("<svg><circle id=\"c\" cx=\"50\" cy=\"50\" r=\"10\"/></svg>");
        let idx = g.by_id("c").unwrap();
        let b = node_bounds(&g, idx).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (40.0, 40.0, 20.0, 20.0));
        assert_eq!(b.center(), (50.0, 50.0));
    }

    #[test]
    fn polygon_bounds_span_points() {
        let g = graph_of("<svg><polygon id=\"p\" points=\"0,0 10,5 -5,20\"/></svg>");
        let idx = g.by_id("p").unwrap();
        let b = node_bounds(&g, idx).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (-5.0, 0.0, 15.0, 20.0));
    }

    #[test]
    fn path_bounds_scan_coordinates() {
        let g = graph_of("<svg><path id=\"p\" d=\"M 10 10 L 30 10 L 20 25 Z\"/></svg>");
        let idx = g.by_id("p").unwrap();
        let b = node_bounds(&g, idx).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (10.0, 10.0, 20.0, 15.0));
    }

    #[test]
    fn group_bounds_union_children() {
        let g = graph_of(
            "<svg><g id=\"grp\"><rect x=\"0\" y=\"0\" width=\"10\" height=\"10\"/><rect x=\"20\" y=\"20\" width=\"10\" height=\"10\"/></g></svg>",
        );
        let idx = g.by_id("grp").unwrap();
        let b = node_bounds(&g, idx).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let g = graph_of(
            "<svg><rect id=\"below\" x=\"0\" y=\"0\" width=\"100\" height=\"100\"/><rect id=\"above\" x=\"40\" y=\"40\" width=\"100\" height=\"100\"/></svg>",
        );
        assert_eq!(hit_test(&g, 50.0, 50.0).unwrap().as_str(), "above");
        assert_eq!(hit_test(&g, 10.0, 10.0).unwrap().as_str(), "below");
        assert_eq!(hit_test(&g, 300.0, 300.0), None);
    }

    #[test]
    fn hit_test_skips_background_and_hidden() {
        let g = graph_of(
            "<svg><rect id=\"background\" x=\"0\" y=\"0\" width=\"100\" height=\"100\"/><rect id=\"ghost\" x=\"0\" y=\"0\" width=\"50\" height=\"50\" display=\"none\"/></svg>",
        );
        assert_eq!(hit_test(&g, 25.0, 25.0), None);
    }

    #[test]
    fn negative_path_numbers() {
        assert_eq!(scan_numbers("M-5-10L3.5 2e1"), vec![-5.0, -10.0, 3.5, 20.0]);
    }
}
