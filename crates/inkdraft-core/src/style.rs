//! Style state: one canonical value per styled property.
//!
//! A node's styling arrives in two representations — plain presentation
//! attributes and the inline `style` string — and the style string always
//! shadows same-named attributes. Parsing folds both into a single
//! `StyleState`; each property keeps a representation tag recording where
//! it materializes again at serialization time. Unmodeled declarations
//! round-trip verbatim through `extra`.

use crate::color::Color;
use crate::filter::FilterChain;
use crate::id::NodeId;
use crate::model::AttrMap;
use crate::transform::TransformState;
use serde::{Deserialize, Serialize};

// ─── Declaration utilities ───────────────────────────────────────────────

/// Split a style string into `(key, value)` declarations, preserving order.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let decl = decl.trim();
            if decl.is_empty() {
                return None;
            }
            let (k, v) = decl.split_once(':')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

/// Scan `name(args)` function groups out of a declaration value.
/// Parentheses nest, so `drop-shadow(... rgba(...))` stays one group.
/// Anything that is not a function group is skipped (best effort).
pub fn split_functions(value: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    while i < len {
        while i < len && (bytes[i].is_ascii_whitespace() || bytes[i] == b',') {
            i += 1;
        }
        let name_start = i;
        while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        if i >= len || bytes[i] != b'(' || i == name_start {
            break;
        }
        let name = &value[name_start..i];
        i += 1;
        let args_start = i;
        let mut depth = 1usize;
        while i < len && depth > 0 {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        let args_end = if depth == 0 { i - 1 } else { i };
        out.push((name, &value[args_start..args_end]));
    }
    out
}

/// A numeric argument with an optional unit suffix (`45deg`, `2px`, `50%`).
/// `None` when no leading number is present.
pub fn num_arg(s: &str) -> Option<f32> {
    let t = s.trim();
    let end = t
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(t.len());
    t[..end].parse().ok()
}

// ─── Paint ───────────────────────────────────────────────────────────────

/// A fill or stroke paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    /// Explicit `none`.
    None,
    Solid(Color),
    /// `url(#id)` reference to a gradient definition.
    Reference(NodeId),
}

impl Paint {
    /// Parse a paint value. `None` (the Option) means the value is outside
    /// the modeled forms and should stay wherever it came from.
    pub fn parse(s: &str) -> Option<Self> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("none") {
            return Some(Paint::None);
        }
        if let Some(rest) = t.strip_prefix("url(") {
            let inner = rest
                .strip_suffix(')')?
                .trim()
                .trim_matches(|c| c == '\'' || c == '"');
            let id = inner.strip_prefix('#')?;
            return Some(Paint::Reference(NodeId::intern(id)));
        }
        Color::parse(t).map(Paint::Solid)
    }

    /// Serialized attribute/declaration value.
    pub fn to_value(&self) -> String {
        match self {
            Paint::None => "none".to_string(),
            Paint::Solid(c) => c.to_hex(),
            Paint::Reference(id) => format!("url(#{})", id.as_str()),
        }
    }

    /// Canonical color for editing controls: black for `none` and references.
    pub fn control_color(&self) -> Color {
        match self {
            Paint::Solid(c) => *c,
            _ => Color::BLACK,
        }
    }
}

// ─── Representation tags ─────────────────────────────────────────────────

/// Where a modeled property materializes at serialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repr {
    /// Plain attribute only.
    Attr,
    /// Style-string entry only.
    Style,
    /// Both; the style entry is the one renderers honor.
    Both,
}

impl Repr {
    pub fn has_attr(self) -> bool {
        matches!(self, Repr::Attr | Repr::Both)
    }

    pub fn has_style(self) -> bool {
        matches!(self, Repr::Style | Repr::Both)
    }
}

/// A property value plus its representation tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Styled<T> {
    pub value: T,
    pub repr: Repr,
}

impl<T> Styled<T> {
    pub fn attr(value: T) -> Self {
        Self {
            value,
            repr: Repr::Attr,
        }
    }

    pub fn style(value: T) -> Self {
        Self {
            value,
            repr: Repr::Style,
        }
    }

    pub fn both(value: T) -> Self {
        Self {
            value,
            repr: Repr::Both,
        }
    }
}

// ─── Style state ─────────────────────────────────────────────────────────

/// The canonical styled-property state of one node.
///
/// Transform and filter live in the style string only; a `transform`
/// *attribute* on foreign input is left untouched in the node's attribute
/// list, where the style-string value shadows it under the rendering
/// convention anyway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleState {
    pub fill: Option<Styled<Paint>>,
    pub fill_opacity: Option<Styled<f32>>,
    pub stroke: Option<Styled<Paint>>,
    pub stroke_width: Option<Styled<f32>>,
    pub stroke_opacity: Option<Styled<f32>>,
    pub stroke_linecap: Option<Styled<String>>,
    pub stroke_linejoin: Option<Styled<String>>,
    pub stroke_dasharray: Option<Styled<String>>,
    pub opacity: Option<Styled<f32>>,
    pub blend_mode: Option<Styled<String>>,
    pub font_family: Option<Styled<String>>,
    pub font_size: Option<Styled<String>>,
    pub font_weight: Option<Styled<String>>,
    pub text_anchor: Option<Styled<String>>,
    pub transform: Option<TransformState>,
    pub filter: Option<FilterChain>,
    /// Unmodeled style declarations, in source order, round-tripped verbatim.
    pub extra: Vec<(String, String)>,
}

/// The presentation attribute keys the state models, in canonical
/// serialization order.
const MODELED_KEYS: [&str; 14] = [
    "fill",
    "fill-opacity",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-dasharray",
    "opacity",
    "mix-blend-mode",
    "font-family",
    "font-size",
    "font-weight",
    "text-anchor",
];

impl StyleState {
    /// Lift the modeled presentation attributes and the `style` attribute
    /// out of a freshly parsed attribute list. Style-string entries shadow
    /// plain attributes: when both carry a key, the style value wins and
    /// the property is tagged as materializing in both places.
    pub fn extract(attrs: &mut AttrMap) -> Self {
        let mut state = Self::default();
        for key in MODELED_KEYS {
            let Some(value) = attrs.get(key).map(str::to_string) else {
                continue;
            };
            if state.absorb(key, &value, Repr::Attr) {
                attrs.remove(key);
            }
        }
        if let Some(style) = attrs.take("style") {
            for (key, value) in parse_declarations(&style) {
                let lower = key.to_ascii_lowercase();
                match lower.as_str() {
                    "transform" => match TransformState::parse(&value) {
                        Some(t) => state.transform = Some(t),
                        None => state.extra.push((key, value)),
                    },
                    "filter" => match FilterChain::parse(&value) {
                        Some(f) => state.filter = Some(f),
                        None => state.extra.push((key, value)),
                    },
                    _ if MODELED_KEYS.contains(&lower.as_str()) => {
                        if !state.absorb(&lower, &value, Repr::Style) {
                            state.extra.push((key, value));
                        }
                    }
                    _ => state.extra.push((key, value)),
                }
            }
        }
        state
    }

    /// Absorb one modeled key. Returns false when the value does not parse,
    /// in which case it stays in its source representation verbatim.
    fn absorb(&mut self, key: &str, value: &str, from: Repr) -> bool {
        match key {
            "fill" => match Paint::parse(value) {
                Some(p) => set_styled(&mut self.fill, p, from),
                None => return false,
            },
            "stroke" => match Paint::parse(value) {
                Some(p) => set_styled(&mut self.stroke, p, from),
                None => return false,
            },
            "fill-opacity" => match num_arg(value) {
                Some(v) => set_styled(&mut self.fill_opacity, v, from),
                None => return false,
            },
            "stroke-width" => match num_arg(value) {
                Some(v) => set_styled(&mut self.stroke_width, v, from),
                None => return false,
            },
            "stroke-opacity" => match num_arg(value) {
                Some(v) => set_styled(&mut self.stroke_opacity, v, from),
                None => return false,
            },
            "opacity" => match num_arg(value) {
                Some(v) => set_styled(&mut self.opacity, v, from),
                None => return false,
            },
            "stroke-linecap" => set_styled(&mut self.stroke_linecap, value.to_string(), from),
            "stroke-linejoin" => set_styled(&mut self.stroke_linejoin, value.to_string(), from),
            "stroke-dasharray" => set_styled(&mut self.stroke_dasharray, value.to_string(), from),
            "mix-blend-mode" => set_styled(&mut self.blend_mode, value.to_string(), from),
            "font-family" => set_styled(&mut self.font_family, value.to_string(), from),
            "font-size" => set_styled(&mut self.font_size, value.to_string(), from),
            "font-weight" => set_styled(&mut self.font_weight, value.to_string(), from),
            "text-anchor" => set_styled(&mut self.text_anchor, value.to_string(), from),
            _ => return false,
        }
        true
    }

    /// Modeled presentation attributes to materialize, in canonical order.
    pub fn attr_entries(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        for key in MODELED_KEYS {
            if let Some((value, repr)) = self.serialized(key)
                && repr.has_attr()
            {
                out.push((key, value));
            }
        }
        out
    }

    /// The `style` attribute value, or `None` when nothing materializes
    /// there. Declarations appear as modeled properties (canonical order),
    /// then filter, then transform, then the verbatim extras.
    pub fn style_value(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        for key in MODELED_KEYS {
            if let Some((value, repr)) = self.serialized(key)
                && repr.has_style()
            {
                parts.push(format!("{key}: {value}"));
            }
        }
        if let Some(decl) = self.filter.as_ref().and_then(FilterChain::to_declaration) {
            parts.push(format!("filter: {decl}"));
        }
        if let Some(decl) = self
            .transform
            .as_ref()
            .and_then(TransformState::to_declaration)
        {
            parts.push(format!("transform: {decl}"));
        }
        for (key, value) in &self.extra {
            parts.push(format!("{key}: {value}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }

    /// Serialized value and representation for one modeled key.
    pub(crate) fn serialized(&self, key: &str) -> Option<(String, Repr)> {
        use crate::emitter::format_num;
        match key {
            "fill" => self.fill.as_ref().map(|s| (s.value.to_value(), s.repr)),
            "fill-opacity" => self
                .fill_opacity
                .as_ref()
                .map(|s| (format_num(s.value), s.repr)),
            "stroke" => self.stroke.as_ref().map(|s| (s.value.to_value(), s.repr)),
            "stroke-width" => self
                .stroke_width
                .as_ref()
                .map(|s| (format_num(s.value), s.repr)),
            "stroke-opacity" => self
                .stroke_opacity
                .as_ref()
                .map(|s| (format_num(s.value), s.repr)),
            "stroke-linecap" => self
                .stroke_linecap
                .as_ref()
                .map(|s| (s.value.clone(), s.repr)),
            "stroke-linejoin" => self
                .stroke_linejoin
                .as_ref()
                .map(|s| (s.value.clone(), s.repr)),
            "stroke-dasharray" => self
                .stroke_dasharray
                .as_ref()
                .map(|s| (s.value.clone(), s.repr)),
            "opacity" => self.opacity.as_ref().map(|s| (format_num(s.value), s.repr)),
            "mix-blend-mode" => self.blend_mode.as_ref().map(|s| (s.value.clone(), s.repr)),
            "font-family" => self.font_family.as_ref().map(|s| (s.value.clone(), s.repr)),
            "font-size" => self.font_size.as_ref().map(|s| (s.value.clone(), s.repr)),
            "font-weight" => self.font_weight.as_ref().map(|s| (s.value.clone(), s.repr)),
            "text-anchor" => self.text_anchor.as_ref().map(|s| (s.value.clone(), s.repr)),
            _ => None,
        }
    }

    /// The transform channels, defaulted when the node has none.
    pub fn transform_or_default(&self) -> TransformState {
        self.transform.unwrap_or_default()
    }

    /// The filter channels, defaulted when the node has none.
    pub fn filter_or_default(&self) -> FilterChain {
        self.filter.unwrap_or_default()
    }

    /// Canonical fill color for editing controls; black for none and
    /// references.
    pub fn fill_color(&self) -> Color {
        self.fill
            .as_ref()
            .map_or(Color::BLACK, |s| s.value.control_color())
    }
}

/// Write a modeled value, combining representations: a style-string value
/// over an existing attribute value upgrades the property to `Both`.
fn set_styled<T>(slot: &mut Option<Styled<T>>, value: T, from: Repr) {
    let repr = match (&slot, from) {
        (Some(prev), Repr::Style) if prev.repr == Repr::Attr => Repr::Both,
        _ => from,
    };
    *slot = Some(Styled { value, repr });
}
