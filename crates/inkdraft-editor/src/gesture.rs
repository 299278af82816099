//! Pointer-gesture controllers for the transform handles and direct moves.
//!
//! Both controllers are small Idle → Dragging → Idle machines. Pointer-down
//! captures an explicit gesture context (target, start values, pointer
//! origin); every move recomputes from that context and writes the node
//! directly for live preview; pointer-up hands the target back to the
//! caller for exactly one history commit. There is no separate abort path:
//! a lost pointer leaves the last preview in place and it gets committed.

use inkdraft_core::geometry::{node_bounds, Bounds};
use inkdraft_core::id::NodeId;
use inkdraft_core::model::{NodeKind, SceneGraph};
use inkdraft_core::transform::TransformState;

/// A drag spanning the whole box adds one unit of scale.
const SCALE_GAIN: f32 = 1.0;

/// Degrees of skew per pixel of orthogonal drag.
const SKEW_GAIN: f32 = 0.5;

/// The rotation handle floats this far above the box top edge.
pub const ROTATE_HANDLE_OFFSET: f32 = 24.0;

// ─── Handles ─────────────────────────────────────────────────────────────

/// The nine gesture handles: eight on the bounding box, one rotation
/// handle floating above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Rotate,
}

impl Handle {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "n" => Self::North,
            "ne" => Self::NorthEast,
            "e" => Self::East,
            "se" => Self::SouthEast,
            "s" => Self::South,
            "sw" => Self::SouthWest,
            "w" => Self::West,
            "nw" => Self::NorthWest,
            "rotate" => Self::Rotate,
            _ => return None,
        })
    }

    /// Where the handle sits, for the surrounding UI's hit zones.
    pub fn anchor(self, b: Bounds) -> (f32, f32) {
        let (cx, cy) = b.center();
        match self {
            Self::North => (cx, b.y),
            Self::NorthEast => (b.x + b.width, b.y),
            Self::East => (b.x + b.width, cy),
            Self::SouthEast => (b.x + b.width, b.y + b.height),
            Self::South => (cx, b.y + b.height),
            Self::SouthWest => (b.x, b.y + b.height),
            Self::West => (b.x, cy),
            Self::NorthWest => (b.x, b.y),
            Self::Rotate => (cx, b.y - ROTATE_HANDLE_OFFSET),
        }
    }

    /// Handles on the top or bottom edge drive the vertical scale channel.
    fn touches_vertical(self) -> bool {
        matches!(
            self,
            Self::North
                | Self::NorthEast
                | Self::NorthWest
                | Self::South
                | Self::SouthEast
                | Self::SouthWest
        )
    }

    /// Handles on the left or right edge drive the horizontal channel.
    fn touches_horizontal(self) -> bool {
        matches!(
            self,
            Self::East
                | Self::NorthEast
                | Self::SouthEast
                | Self::West
                | Self::NorthWest
                | Self::SouthWest
        )
    }

    /// Outward drag direction along the vertical axis: south grows with
    /// +dy, north grows with -dy.
    fn vertical_sign(self) -> f32 {
        match self {
            Self::South | Self::SouthEast | Self::SouthWest => 1.0,
            _ => -1.0,
        }
    }

    fn horizontal_sign(self) -> f32 {
        match self {
            Self::East | Self::NorthEast | Self::SouthEast => 1.0,
            _ => -1.0,
        }
    }
}

// ─── Transform controller ────────────────────────────────────────────────

/// Start-of-gesture capture for a handle drag.
#[derive(Debug, Clone, Copy)]
struct DragContext {
    target: NodeId,
    handle: Handle,
    bounds: Bounds,
    start: TransformState,
    origin: (f32, f32),
    center: (f32, f32),
}

/// Converts handle drags into rotate/scale/skew updates. Coordinates are
/// canvas units; the caller unprojects pointer events before feeding them
/// in.
#[derive(Debug, Default)]
pub struct TransformController {
    drag: Option<DragContext>,
}

impl TransformController {
    pub fn new() -> Self {
        Self { drag: None }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer-down on a handle. Captures the pre-transform geometry box,
    /// the current transform channels, and the pointer origin. `false`
    /// leaves the controller idle (unknown node, or nothing to measure).
    pub fn begin(
        &mut self,
        graph: &SceneGraph,
        target: NodeId,
        handle: Handle,
        px: f32,
        py: f32,
    ) -> bool {
        let Some(idx) = graph.index_of(target) else {
            log::debug!("transform gesture on stale node #{target}, ignored");
            return false;
        };
        let Some(bounds) = node_bounds(graph, idx) else {
            return false;
        };
        self.drag = Some(DragContext {
            target,
            handle,
            bounds,
            start: graph.get(idx).style.transform_or_default(),
            origin: (px, py),
            center: bounds.center(),
        });
        true
    }

    /// Pointer-move. Recomputes the full transform from the gesture
    /// context and writes it straight onto the node. No history entry.
    /// With `skew_modifier` held, edge handles bend the orthogonal skew
    /// channel instead of scaling.
    pub fn update(
        &mut self,
        graph: &mut SceneGraph,
        px: f32,
        py: f32,
        skew_modifier: bool,
    ) -> bool {
        let Some(ctx) = self.drag else {
            return false;
        };
        let Some(idx) = graph.index_of(ctx.target) else {
            // target deleted mid-gesture
            self.drag = None;
            return false;
        };

        let dx = px - ctx.origin.0;
        let dy = py - ctx.origin.1;
        let mut t = ctx.start;

        match ctx.handle {
            Handle::Rotate => {
                let delta = angle_to(ctx.center, (px, py)) - angle_to(ctx.center, ctx.origin);
                t.rotate = (ctx.start.rotate + delta).rem_euclid(360.0);
            }
            handle if skew_modifier => {
                if handle.touches_vertical() {
                    t.skew_x = ctx.start.skew_x + dx * SKEW_GAIN;
                }
                if handle.touches_horizontal() {
                    t.skew_y = ctx.start.skew_y + dy * SKEW_GAIN;
                }
            }
            handle => {
                if handle.touches_vertical() {
                    let h = ctx.bounds.height.max(1.0);
                    t.scale_y = ctx.start.scale_y + handle.vertical_sign() * dy / h * SCALE_GAIN;
                }
                if handle.touches_horizontal() {
                    let w = ctx.bounds.width.max(1.0);
                    t.scale_x = ctx.start.scale_x + handle.horizontal_sign() * dx / w * SCALE_GAIN;
                }
                // scale magnitudes stay positive; crossing zero flips
                if t.scale_x < 0.0 {
                    t.scale_x = -t.scale_x;
                    t.flip_x = !ctx.start.flip_x;
                }
                if t.scale_y < 0.0 {
                    t.scale_y = -t.scale_y;
                    t.flip_y = !ctx.start.flip_y;
                }
            }
        }

        graph.get_mut(idx).style.transform = Some(t);
        true
    }

    /// Pointer-up. Returns the gesture's target so the caller can commit
    /// the document exactly once.
    pub fn finish(&mut self) -> Option<NodeId> {
        self.drag.take().map(|ctx| ctx.target)
    }
}

fn angle_to(center: (f32, f32), p: (f32, f32)) -> f32 {
    (p.1 - center.1).atan2(p.0 - center.0).to_degrees()
}

// ─── Move controller ─────────────────────────────────────────────────────

/// Which attribute pair carries a node's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// x/y attributes (rect, image, text).
    Corner,
    /// cx/cy attributes (circle, ellipse).
    Center,
}

impl Anchor {
    fn for_kind(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Rect | NodeKind::Image | NodeKind::Text => Some(Self::Corner),
            NodeKind::Circle | NodeKind::Ellipse => Some(Self::Center),
            _ => None,
        }
    }

    fn keys(self) -> (&'static str, &'static str) {
        match self {
            Self::Corner => ("x", "y"),
            Self::Center => ("cx", "cy"),
        }
    }
}

/// Start-of-gesture capture for a body drag.
#[derive(Debug, Clone, Copy)]
struct MoveContext {
    target: NodeId,
    anchor: Anchor,
    start: (f32, f32),
    origin: (f32, f32),
    zoom: f32,
}

/// Drags a node body by rewriting its position attributes. Pointer
/// coordinates are screen pixels; deltas are divided by the zoom factor
/// captured at gesture start. Polygons and paths are not draggable this
/// way — their geometry has no single position attribute to rewrite.
#[derive(Debug, Default)]
pub struct MoveController {
    drag: Option<MoveContext>,
}

impl MoveController {
    pub fn new() -> Self {
        Self { drag: None }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin(
        &mut self,
        graph: &SceneGraph,
        target: NodeId,
        px: f32,
        py: f32,
        zoom: f32,
    ) -> bool {
        let Some(idx) = graph.index_of(target) else {
            log::debug!("move gesture on stale node #{target}, ignored");
            return false;
        };
        let node = graph.get(idx);
        let Some(anchor) = Anchor::for_kind(&node.kind) else {
            return false;
        };
        let (kx, ky) = anchor.keys();
        self.drag = Some(MoveContext {
            target,
            anchor,
            start: (
                node.attrs.get_num(kx).unwrap_or(0.0),
                node.attrs.get_num(ky).unwrap_or(0.0),
            ),
            origin: (px, py),
            zoom: if zoom > 0.0 { zoom } else { 1.0 },
        });
        true
    }

    pub fn update(&mut self, graph: &mut SceneGraph, px: f32, py: f32) -> bool {
        let Some(ctx) = self.drag else {
            return false;
        };
        let Some(idx) = graph.index_of(ctx.target) else {
            self.drag = None;
            return false;
        };
        let dx = (px - ctx.origin.0) / ctx.zoom;
        let dy = (py - ctx.origin.1) / ctx.zoom;
        let (kx, ky) = ctx.anchor.keys();
        let node = graph.get_mut(idx);
        node.attrs.set_num(kx, ctx.start.0 + dx);
        node.attrs.set_num(ky, ctx.start.1 + dy);
        true
    }

    pub fn finish(&mut self) -> Option<NodeId> {
        self.drag.take().map(|ctx| ctx.target)
    }
}
