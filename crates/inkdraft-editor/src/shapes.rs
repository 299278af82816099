//! Shape factory: synthesize new primitive nodes.
//!
//! Every shape is centered on the canvas midpoint and sized to one fifth
//! of the smaller canvas dimension, then appended as the topmost sibling.
//! Stars, triangles, hearts, arrows and speech bubbles are built from
//! polygon points or path templates parameterized by that size.

use inkdraft_core::color::Color;
use inkdraft_core::emitter::format_num;
use inkdraft_core::id::NodeId;
use inkdraft_core::model::{NodeKind, SceneGraph, SceneNode};
use inkdraft_core::style::{Paint, Styled};

/// Fill given to freshly created shapes so they are visible immediately.
const DEFAULT_FILL: Color = Color {
    r: 0x6c,
    g: 0x5c,
    b: 0xe7,
};

const TEXT_PLACEHOLDER: &str = "Edit me";
const IMAGE_PLACEHOLDER: &str = "https://picsum.photos/200";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Star,
    Triangle,
    Heart,
    Arrow,
    SpeechBubble,
    Text,
    Image,
}

impl ShapeKind {
    /// UI name → kind. Unknown names return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "rect" | "rectangle" => Self::Rect,
            "ellipse" | "circle" => Self::Ellipse,
            "star" => Self::Star,
            "triangle" => Self::Triangle,
            "heart" => Self::Heart,
            "arrow" => Self::Arrow,
            "speech-bubble" | "bubble" => Self::SpeechBubble,
            "text" => Self::Text,
            "image" => Self::Image,
            _ => return None,
        })
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Ellipse => "ellipse",
            Self::Star | Self::Triangle => "polygon",
            Self::Heart | Self::Arrow | Self::SpeechBubble => "path",
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// Create a shape and append it topmost. Returns the fresh node id.
pub fn create_shape(graph: &mut SceneGraph, kind: ShapeKind) -> NodeId {
    let [min_x, min_y, w, h] = graph.view_box().unwrap_or_else(|| {
        let (w, h) = graph.canvas_size();
        [0.0, 0.0, w, h]
    });
    let (cx, cy) = (min_x + w / 2.0, min_y + h / 2.0);
    let size = w.min(h) / 5.0;

    let position = graph.children(graph.root).len();
    let id = NodeId::synthesize(kind.tag(), position);
    let mut node = SceneNode::with_id(NodeKind::from_tag(kind.tag()), id);

    match kind {
        ShapeKind::Rect => {
            node.attrs.set_num("x", cx - size / 2.0);
            node.attrs.set_num("y", cy - size / 2.0);
            node.attrs.set_num("width", size);
            node.attrs.set_num("height", size);
        }
        ShapeKind::Ellipse => {
            node.attrs.set_num("cx", cx);
            node.attrs.set_num("cy", cy);
            node.attrs.set_num("rx", size / 2.0);
            node.attrs.set_num("ry", size / 2.0);
        }
        ShapeKind::Star => {
            node.attrs.set("points", star_points(cx, cy, size));
        }
        ShapeKind::Triangle => {
            node.attrs.set("points", triangle_points(cx, cy, size));
        }
        ShapeKind::Heart => {
            node.attrs.set("d", heart_path(cx, cy, size));
        }
        ShapeKind::Arrow => {
            node.attrs.set("d", arrow_path(cx, cy, size));
        }
        ShapeKind::SpeechBubble => {
            node.attrs.set("d", bubble_path(cx, cy, size));
        }
        ShapeKind::Text => {
            node.attrs.set_num("x", cx);
            node.attrs.set_num("y", cy);
            node.style.font_size = Some(Styled::attr(format!("{}px", format_num(size / 3.0))));
            node.style.text_anchor = Some(Styled::attr("middle".to_string()));
            node.text = Some(TEXT_PLACEHOLDER.to_string());
        }
        ShapeKind::Image => {
            node.attrs.set_num("x", cx - size / 2.0);
            node.attrs.set_num("y", cy - size / 2.0);
            node.attrs.set_num("width", size);
            node.attrs.set_num("height", size);
            node.attrs.set("href", IMAGE_PLACEHOLDER);
        }
    }

    // Text renders black by default; images carry their own pixels.
    if !matches!(kind, ShapeKind::Text | ShapeKind::Image) {
        node.style.fill = Some(Styled::attr(Paint::Solid(DEFAULT_FILL)));
    }

    graph.add_child(graph.root, node);
    log::debug!("created {} shape #{id}", kind.tag());
    id
}

/// Five-pointed star: ten vertices alternating outer radius (size/2) and
/// inner radius (size/5), starting straight up and stepping 36° each.
fn star_points(cx: f32, cy: f32, size: f32) -> String {
    let outer = size / 2.0;
    let inner = size / 5.0;
    let mut points = Vec::with_capacity(10);
    for i in 0..10 {
        let radius = if i % 2 == 0 { outer } else { inner };
        let angle = (-90.0 + 36.0 * i as f32).to_radians();
        points.push(format!(
            "{},{}",
            format_num(cx + radius * angle.cos()),
            format_num(cy + radius * angle.sin())
        ));
    }
    points.join(" ")
}

/// Equilateral triangle with the apex up, side length = size.
fn triangle_points(cx: f32, cy: f32, size: f32) -> String {
    let half_h = size * 3f32.sqrt() / 4.0;
    [
        (cx, cy - half_h),
        (cx + size / 2.0, cy + half_h),
        (cx - size / 2.0, cy + half_h),
    ]
    .iter()
    .map(|(x, y)| format!("{},{}", format_num(*x), format_num(*y)))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Two-lobed heart from four cubic segments, top dip to bottom tip.
fn heart_path(cx: f32, cy: f32, size: f32) -> String {
    let n = format_num;
    let s = size;
    format!(
        "M {} {} C {} {}, {} {}, {} {} C {} {}, {} {}, {} {} C {} {}, {} {}, {} {} C {} {}, {} {}, {} {} Z",
        n(cx),
        n(cy - 0.15 * s),
        n(cx - 0.2 * s),
        n(cy - 0.55 * s),
        n(cx - 0.5 * s),
        n(cy - 0.35 * s),
        n(cx - 0.5 * s),
        n(cy - 0.05 * s),
        n(cx - 0.5 * s),
        n(cy + 0.2 * s),
        n(cx - 0.2 * s),
        n(cy + 0.35 * s),
        n(cx),
        n(cy + 0.5 * s),
        n(cx + 0.2 * s),
        n(cy + 0.35 * s),
        n(cx + 0.5 * s),
        n(cy + 0.2 * s),
        n(cx + 0.5 * s),
        n(cy - 0.05 * s),
        n(cx + 0.5 * s),
        n(cy - 0.35 * s),
        n(cx + 0.2 * s),
        n(cy - 0.55 * s),
        n(cx),
        n(cy - 0.15 * s),
    )
}

/// Right-pointing arrow: shaft plus triangular head.
fn arrow_path(cx: f32, cy: f32, size: f32) -> String {
    let n = format_num;
    let s = size;
    format!(
        "M {} {} L {} {} L {} {} L {} {} L {} {} L {} {} L {} {} Z",
        n(cx - 0.5 * s),
        n(cy - 0.125 * s),
        n(cx + 0.1 * s),
        n(cy - 0.125 * s),
        n(cx + 0.1 * s),
        n(cy - 0.3 * s),
        n(cx + 0.5 * s),
        n(cy),
        n(cx + 0.1 * s),
        n(cy + 0.3 * s),
        n(cx + 0.1 * s),
        n(cy + 0.125 * s),
        n(cx - 0.5 * s),
        n(cy + 0.125 * s),
    )
}

/// Rounded speech bubble body with a tail toward the lower left.
fn bubble_path(cx: f32, cy: f32, size: f32) -> String {
    let n = format_num;
    let s = size;
    format!(
        "M {} {} L {} {} L {} {} L {} {} L {} {} L {} {} L {} {} Z",
        n(cx - 0.5 * s),
        n(cy - 0.4 * s),
        n(cx + 0.5 * s),
        n(cy - 0.4 * s),
        n(cx + 0.5 * s),
        n(cy + 0.2 * s),
        n(cx - 0.1 * s),
        n(cy + 0.2 * s),
        n(cx - 0.3 * s),
        n(cy + 0.45 * s),
        n(cx - 0.25 * s),
        n(cy + 0.2 * s),
        n(cx - 0.5 * s),
        n(cy + 0.2 * s),
    )
}
