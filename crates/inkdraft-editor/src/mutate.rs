//! Mutation engine: one property change on one node.
//!
//! Edits dispatch by property category. Geometry lands in plain
//! attributes; paint and typography write the canonical value with a
//! `Both` representation so the attribute and the style string agree;
//! transform and filter are rebuilt wholesale from the node's current
//! channel state so the declaration always comes out in its fixed
//! function order. Targeting a node that no longer exists is a silent
//! no-op — UI state routinely lags the document by one event.

use inkdraft_core::color::Color;
use inkdraft_core::emitter::format_num;
use inkdraft_core::id::NodeId;
use inkdraft_core::model::{NodeKind, SceneGraph};
use inkdraft_core::style::{Paint, Styled, num_arg};

/// One typed property change. Built from the UI's string key/value pairs
/// via [`PropertyEdit::from_key_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    /// Plain geometry attribute (x, y, width, height, cx, cy, r, rx, ry).
    Geometry { key: String, value: f32 },
    /// Rect corner rounding, mirrored to both rx and ry.
    CornerRadius(f32),

    Fill(String),
    Stroke(String),
    FillOpacity(f32),
    StrokeOpacity(f32),
    StrokeWidth(f32),
    Opacity(f32),
    Linecap(String),
    Linejoin(String),
    /// `None` is the sentinel: remove the dash pattern entirely rather
    /// than writing a literal "none".
    Dasharray(Option<String>),
    /// `None` resets to normal, removing the declaration entirely.
    BlendMode(Option<String>),

    FontFamily(String),
    FontSize(f32),
    FontWeight(String),
    TextAnchor(String),
    TextContent(String),

    Rotate(f32),
    /// One magnitude applied to both axes; flips keep their signs.
    Scale(f32),
    SkewX(f32),
    SkewY(f32),
    FlipX,
    FlipY,

    Blur(f32),
    Grayscale(f32),
    Sepia(f32),
    Invert(f32),
    Saturate(f32),
    HueRotate(f32),

    ShadowEnabled(bool),
    ShadowOffsetX(f32),
    ShadowOffsetY(f32),
    ShadowBlur(f32),
    ShadowColor(Color),
    ShadowOpacity(f32),
}

const GEOMETRY_KEYS: [&str; 9] = ["x", "y", "width", "height", "cx", "cy", "r", "rx", "ry"];

impl PropertyEdit {
    /// Map a UI property key and raw value onto a typed edit. Numeric
    /// values parse leniently; a malformed number falls back to the
    /// channel's neutral default instead of failing the edit.
    pub fn from_key_value(key: &str, value: &str) -> Option<Self> {
        let num = |default: f32| num_arg(value).unwrap_or(default);
        let edit = match key {
            _ if GEOMETRY_KEYS.contains(&key) => Self::Geometry {
                key: key.to_string(),
                value: num(0.0),
            },
            "corner-radius" => Self::CornerRadius(num(0.0)),
            "fill" => Self::Fill(value.to_string()),
            "stroke" => Self::Stroke(value.to_string()),
            "fill-opacity" => Self::FillOpacity(num(1.0)),
            "stroke-opacity" => Self::StrokeOpacity(num(1.0)),
            "stroke-width" => Self::StrokeWidth(num(1.0)),
            "opacity" => Self::Opacity(num(1.0)),
            "stroke-linecap" => Self::Linecap(value.to_string()),
            "stroke-linejoin" => Self::Linejoin(value.to_string()),
            "stroke-dasharray" => Self::Dasharray(
                (!value.trim().eq_ignore_ascii_case("none")).then(|| value.to_string()),
            ),
            "mix-blend-mode" | "blend-mode" => Self::BlendMode(
                (!value.trim().eq_ignore_ascii_case("normal")).then(|| value.to_string()),
            ),
            "font-family" => Self::FontFamily(value.to_string()),
            "font-size" => Self::FontSize(num(16.0)),
            "font-weight" => Self::FontWeight(value.to_string()),
            "text-anchor" => Self::TextAnchor(value.to_string()),
            "text" => Self::TextContent(value.to_string()),
            "rotate" => Self::Rotate(num(0.0)),
            "scale" => Self::Scale(num(1.0)),
            "skew-x" => Self::SkewX(num(0.0)),
            "skew-y" => Self::SkewY(num(0.0)),
            "flip-x" => Self::FlipX,
            "flip-y" => Self::FlipY,
            "blur" => Self::Blur(num(0.0)),
            "grayscale" => Self::Grayscale(num(0.0)),
            "sepia" => Self::Sepia(num(0.0)),
            "invert" => Self::Invert(num(0.0)),
            "saturate" => Self::Saturate(num(100.0)),
            "hue-rotate" => Self::HueRotate(num(0.0)),
            "shadow" => Self::ShadowEnabled(matches!(value.trim(), "true" | "on" | "1")),
            "shadow-dx" => Self::ShadowOffsetX(num(0.0)),
            "shadow-dy" => Self::ShadowOffsetY(num(0.0)),
            "shadow-blur" => Self::ShadowBlur(num(0.0)),
            "shadow-color" => Self::ShadowColor(Color::parse(value)?),
            "shadow-opacity" => Self::ShadowOpacity(num(1.0)),
            _ => return None,
        };
        Some(edit)
    }
}

/// Apply one edit to the node with `id`. Returns false when the id is
/// stale (node already deleted); the graph is untouched in that case.
pub fn apply_edit(graph: &mut SceneGraph, id: NodeId, edit: PropertyEdit) -> bool {
    let Some(idx) = graph.index_of(id) else {
        log::debug!("edit on stale node #{id}, ignored");
        return false;
    };
    let node = graph.get_mut(idx);

    match edit {
        PropertyEdit::Geometry { key, value } => {
            node.attrs.set_num(&key, value);
        }
        PropertyEdit::CornerRadius(r) => {
            if matches!(node.kind, NodeKind::Rect) {
                node.attrs.set_num("rx", r);
                node.attrs.set_num("ry", r);
            } else {
                node.attrs.set_num("rx", r);
            }
        }

        PropertyEdit::Fill(raw) => {
            if let Some(paint) = Paint::parse(&raw) {
                node.style.fill = Some(Styled::both(paint));
            }
        }
        PropertyEdit::Stroke(raw) => {
            if raw.trim().eq_ignore_ascii_case("none") {
                node.style.stroke = None;
            } else if let Some(paint) = Paint::parse(&raw) {
                node.style.stroke = Some(Styled::both(paint));
            }
        }
        PropertyEdit::FillOpacity(v) => node.style.fill_opacity = Some(Styled::both(v)),
        PropertyEdit::StrokeOpacity(v) => node.style.stroke_opacity = Some(Styled::both(v)),
        PropertyEdit::StrokeWidth(v) => node.style.stroke_width = Some(Styled::both(v)),
        PropertyEdit::Opacity(v) => node.style.opacity = Some(Styled::both(v)),
        PropertyEdit::Linecap(v) => node.style.stroke_linecap = Some(Styled::both(v)),
        PropertyEdit::Linejoin(v) => node.style.stroke_linejoin = Some(Styled::both(v)),
        PropertyEdit::Dasharray(v) => {
            node.style.stroke_dasharray = v.map(Styled::both);
        }
        PropertyEdit::BlendMode(v) => {
            node.style.blend_mode = v.map(Styled::both);
        }

        PropertyEdit::FontFamily(v) => node.style.font_family = Some(Styled::both(v)),
        PropertyEdit::FontSize(v) => {
            node.style.font_size = Some(Styled::both(format!("{}px", format_num(v))));
        }
        PropertyEdit::FontWeight(v) => node.style.font_weight = Some(Styled::both(v)),
        PropertyEdit::TextAnchor(v) => node.style.text_anchor = Some(Styled::both(v)),
        PropertyEdit::TextContent(v) => {
            node.text = Some(v);
        }

        PropertyEdit::Rotate(deg) => {
            let mut t = node.style.transform_or_default();
            t.rotate = deg;
            node.style.transform = Some(t);
        }
        PropertyEdit::Scale(m) => {
            let mut t = node.style.transform_or_default();
            t.scale_x = m;
            t.scale_y = m;
            node.style.transform = Some(t);
        }
        PropertyEdit::SkewX(deg) => {
            let mut t = node.style.transform_or_default();
            t.skew_x = deg;
            node.style.transform = Some(t);
        }
        PropertyEdit::SkewY(deg) => {
            let mut t = node.style.transform_or_default();
            t.skew_y = deg;
            node.style.transform = Some(t);
        }
        PropertyEdit::FlipX => {
            let mut t = node.style.transform_or_default();
            t.flip_x = !t.flip_x;
            node.style.transform = Some(t);
        }
        PropertyEdit::FlipY => {
            let mut t = node.style.transform_or_default();
            t.flip_y = !t.flip_y;
            node.style.transform = Some(t);
        }

        PropertyEdit::Blur(v) => {
            let mut f = node.style.filter_or_default();
            f.blur = v.max(0.0);
            node.style.filter = Some(f);
        }
        PropertyEdit::Grayscale(v) => {
            let mut f = node.style.filter_or_default();
            f.grayscale = v.clamp(0.0, 100.0);
            node.style.filter = Some(f);
        }
        PropertyEdit::Sepia(v) => {
            let mut f = node.style.filter_or_default();
            f.sepia = v.clamp(0.0, 100.0);
            node.style.filter = Some(f);
        }
        PropertyEdit::Invert(v) => {
            let mut f = node.style.filter_or_default();
            f.invert = v.clamp(0.0, 100.0);
            node.style.filter = Some(f);
        }
        PropertyEdit::Saturate(v) => {
            let mut f = node.style.filter_or_default();
            f.saturate = v.max(0.0);
            node.style.filter = Some(f);
        }
        PropertyEdit::HueRotate(v) => {
            let mut f = node.style.filter_or_default();
            f.hue_rotate = v;
            node.style.filter = Some(f);
        }

        PropertyEdit::ShadowEnabled(on) => {
            let mut f = node.style.filter_or_default();
            f.shadow = on.then(|| f.shadow.unwrap_or_default());
            node.style.filter = Some(f);
        }
        PropertyEdit::ShadowOffsetX(v) => {
            let mut f = node.style.filter_or_default();
            f.shadow.get_or_insert_default().dx = v;
            node.style.filter = Some(f);
        }
        PropertyEdit::ShadowOffsetY(v) => {
            let mut f = node.style.filter_or_default();
            f.shadow.get_or_insert_default().dy = v;
            node.style.filter = Some(f);
        }
        PropertyEdit::ShadowBlur(v) => {
            let mut f = node.style.filter_or_default();
            f.shadow.get_or_insert_default().blur = v.max(0.0);
            node.style.filter = Some(f);
        }
        PropertyEdit::ShadowColor(c) => {
            let mut f = node.style.filter_or_default();
            f.shadow.get_or_insert_default().color = c;
            node.style.filter = Some(f);
        }
        PropertyEdit::ShadowOpacity(v) => {
            let mut f = node.style.filter_or_default();
            f.shadow.get_or_insert_default().opacity = v.clamp(0.0, 1.0);
            node.style.filter = Some(f);
        }
    }
    true
}
