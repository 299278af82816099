//! Filter chain: ordered effect functions plus an optional drop shadow.
//!
//! The chain is never patched in place — every filter edit rebuilds the
//! whole declaration from the current state, emitting each function only
//! when it differs from its neutral default, with the drop shadow always
//! appended last.

use crate::color::Color;
use crate::emitter::format_num;
use crate::style::{num_arg, split_functions};
use serde::{Deserialize, Serialize};

/// A drop shadow: offset, blur radius, and a color/opacity pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub dx: f32,
    pub dy: f32,
    pub blur: f32,
    pub color: Color,
    pub opacity: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            dx: 2.0,
            dy: 2.0,
            blur: 4.0,
            color: Color::BLACK,
            opacity: 0.5,
        }
    }
}

/// The filter effect channels of a node, in their serialization order.
/// Percent channels are stored as percentages (saturate's neutral is 100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterChain {
    pub blur: f32,
    pub grayscale: f32,
    pub sepia: f32,
    pub invert: f32,
    pub saturate: f32,
    pub hue_rotate: f32,
    pub shadow: Option<Shadow>,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self {
            blur: 0.0,
            grayscale: 0.0,
            sepia: 0.0,
            invert: 0.0,
            saturate: 100.0,
            hue_rotate: 0.0,
            shadow: None,
        }
    }
}

impl FilterChain {
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize as a style declaration value, or `None` when every channel
    /// is neutral. Functions appear in the fixed order blur, grayscale,
    /// sepia, invert, saturate, hue-rotate; drop-shadow comes last.
    pub fn to_declaration(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if self.blur != 0.0 {
            parts.push(format!("blur({}px)", format_num(self.blur)));
        }
        if self.grayscale != 0.0 {
            parts.push(format!("grayscale({}%)", format_num(self.grayscale)));
        }
        if self.sepia != 0.0 {
            parts.push(format!("sepia({}%)", format_num(self.sepia)));
        }
        if self.invert != 0.0 {
            parts.push(format!("invert({}%)", format_num(self.invert)));
        }
        if self.saturate != 100.0 {
            parts.push(format!("saturate({}%)", format_num(self.saturate)));
        }
        if self.hue_rotate != 0.0 {
            parts.push(format!("hue-rotate({}deg)", format_num(self.hue_rotate)));
        }
        if let Some(shadow) = &self.shadow {
            let color = if shadow.opacity < 1.0 {
                format!(
                    "rgba({}, {}, {}, {})",
                    shadow.color.r,
                    shadow.color.g,
                    shadow.color.b,
                    format_num(shadow.opacity)
                )
            } else {
                shadow.color.to_hex()
            };
            parts.push(format!(
                "drop-shadow({}px {}px {}px {color})",
                format_num(shadow.dx),
                format_num(shadow.dy),
                format_num(shadow.blur)
            ));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Parse a declaration composed solely of the modeled functions.
    /// `None` when any function falls outside that set — the caller keeps
    /// the raw declaration untouched, like an unmodeled transform.
    pub fn parse(decl: &str) -> Option<Self> {
        let mut chain = Self::default();
        for (name, args) in split_functions(decl) {
            match name.to_ascii_lowercase().as_str() {
                "blur" => chain.blur = num_arg(args).unwrap_or(0.0),
                "grayscale" => chain.grayscale = pct_arg(args),
                "sepia" => chain.sepia = pct_arg(args),
                "invert" => chain.invert = pct_arg(args),
                "saturate" => chain.saturate = pct_arg(args),
                "hue-rotate" => chain.hue_rotate = num_arg(args).unwrap_or(0.0),
                "drop-shadow" => chain.shadow = Some(parse_shadow(args)),
                _ => return None,
            }
        }
        Some(chain)
    }
}

/// A percent channel argument: `50%` stays 50, a bare number is a CSS
/// fraction (`0.5` → 50).
fn pct_arg(s: &str) -> f32 {
    let t = s.trim();
    if let Some(p) = t.strip_suffix('%') {
        p.trim().parse().unwrap_or(0.0)
    } else {
        t.parse::<f32>().map_or(0.0, |v| v * 100.0)
    }
}

/// Parse `drop-shadow` arguments: up to three lengths (dx, dy, blur) and a
/// color token in any position. Blur defaults to 0; a plain color means
/// opacity 1, an `rgba()` alpha becomes the shadow opacity.
fn parse_shadow(args: &str) -> Shadow {
    let mut lengths: [f32; 3] = [0.0; 3];
    let mut count = 0;
    let mut color = Color::BLACK;
    let mut opacity = 1.0;
    for token in split_shadow_tokens(args) {
        if let Some(v) = leading_num(token) {
            if count < 3 {
                lengths[count] = v;
                count += 1;
            }
        } else if let Some((c, a)) = Color::parse_with_alpha(token) {
            color = c;
            opacity = a;
        }
    }
    Shadow {
        dx: lengths[0],
        dy: lengths[1],
        blur: lengths[2],
        color,
        opacity,
    }
}

/// Whitespace-split at paren depth 0, so `rgba(0, 0, 0, 0.5)` stays one token.
fn split_shadow_tokens(args: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = args.as_bytes();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b' ' | b'\t' if depth == 0 => {
                if i > start {
                    tokens.push(&args[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < args.len() {
        tokens.push(&args[start..]);
    }
    tokens
}

/// A length token is numeric-leading; color tokens are not.
fn leading_num(token: &str) -> Option<f32> {
    let t = token.trim();
    let first = t.chars().next()?;
    if first.is_ascii_digit() || first == '-' || first == '.' {
        num_arg(t)
    } else {
        None
    }
}
