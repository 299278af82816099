//! The named transform channels and their fixed-order serialization.
//!
//! A node's transform is not a free affine matrix — it is four named
//! channels (rotate, scale, skewX, skewY) serialized in exactly that
//! order. Renderers apply the functions sequentially, so the order is a
//! hard invariant: reordering changes the visual result.

use crate::emitter::format_num;
use crate::style::{num_arg, split_functions};
use serde::{Deserialize, Serialize};

/// The transform channels of a node.
///
/// Flip is a sign inversion folded into the scale magnitudes at
/// serialization time; `scale_x`/`scale_y` themselves stay positive.
/// `translate` is only carried by pasted nodes whose kind has no
/// geometry attribute to offset through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub rotate: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub translate: Option<(f32, f32)>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            rotate: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            flip_x: false,
            flip_y: false,
            translate: None,
        }
    }
}

impl TransformState {
    pub fn is_identity(&self) -> bool {
        self.rotate == 0.0
            && self.scale_x == 1.0
            && self.scale_y == 1.0
            && self.skew_x == 0.0
            && self.skew_y == 0.0
            && !self.flip_x
            && !self.flip_y
            && self.translate.is_none()
    }

    /// Signed scale factors with flips folded in.
    pub fn effective_scale(&self) -> (f32, f32) {
        let sx = if self.flip_x {
            -self.scale_x
        } else {
            self.scale_x
        };
        let sy = if self.flip_y {
            -self.scale_y
        } else {
            self.scale_y
        };
        (sx, sy)
    }

    /// Serialize as a style declaration value, or `None` for the identity.
    /// All four functions are always present, in the fixed order
    /// rotate → scale → skewX → skewY; a translate channel, when carried,
    /// is appended last.
    pub fn to_declaration(&self) -> Option<String> {
        if self.is_identity() {
            return None;
        }
        let (sx, sy) = self.effective_scale();
        let mut out = format!(
            "rotate({}deg) scale({}, {}) skewX({}deg) skewY({}deg)",
            format_num(self.rotate),
            format_num(sx),
            format_num(sy),
            format_num(self.skew_x),
            format_num(self.skew_y)
        );
        if let Some((tx, ty)) = self.translate {
            out.push_str(&format!(
                " translate({}px, {}px)",
                format_num(tx),
                format_num(ty)
            ));
        }
        Some(out)
    }

    /// Parse a declaration composed solely of the modeled channels.
    ///
    /// Returns `None` when any function falls outside that set (`matrix`,
    /// `perspective`, ...) — the caller then keeps the raw declaration
    /// untouched until the next transform edit replaces it wholesale.
    pub fn parse(decl: &str) -> Option<Self> {
        let mut state = Self::default();
        for (name, args) in split_functions(decl) {
            let mut nums = args.split(',').map(str::trim);
            match name.to_ascii_lowercase().as_str() {
                "rotate" => {
                    state.rotate = num_arg(nums.next()?).unwrap_or(0.0);
                }
                "scale" => {
                    let sx = num_arg(nums.next()?).unwrap_or(1.0);
                    let sy = nums.next().and_then(num_arg).unwrap_or(sx);
                    state.flip_x = sx < 0.0;
                    state.flip_y = sy < 0.0;
                    state.scale_x = sx.abs();
                    state.scale_y = sy.abs();
                }
                "skewx" => {
                    state.skew_x = num_arg(nums.next()?).unwrap_or(0.0);
                }
                "skewy" => {
                    state.skew_y = num_arg(nums.next()?).unwrap_or(0.0);
                }
                "translate" => {
                    let tx = num_arg(nums.next()?).unwrap_or(0.0);
                    let ty = nums.next().and_then(num_arg).unwrap_or(0.0);
                    state.translate = Some((tx, ty));
                }
                _ => return None,
            }
        }
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity_emits_nothing() {
        assert_eq!(TransformState::default().to_declaration(), None);
    }

    #[test]
    fn fixed_function_order() {
        let t = TransformState {
            skew_y: 5.0,
            rotate: 30.0,
            ..Default::default()
        };
        assert_eq!(
            t.to_declaration().unwrap(),
            "rotate(30deg) scale(1, 1) skewX(0deg) skewY(5deg)"
        );
    }

    #[test]
    fn flip_folds_into_scale_sign() {
        let t = TransformState {
            scale_x: 2.0,
            flip_x: true,
            ..Default::default()
        };
        assert_eq!(
            t.to_declaration().unwrap(),
            "rotate(0deg) scale(-2, 1) skewX(0deg) skewY(0deg)"
        );
    }

    #[test]
    fn parse_recovers_flips() {
        let t = TransformState::parse("rotate(45deg) scale(-1.5, 2) skewX(10deg) skewY(0deg)")
            .unwrap();
        assert_eq!(t.rotate, 45.0);
        assert!(t.flip_x);
        assert!(!t.flip_y);
        assert_eq!(t.scale_x, 1.5);
        assert_eq!(t.scale_y, 2.0);
        assert_eq!(t.skew_x, 10.0);
    }

    #[test]
    fn roundtrip_with_translate() {
        let t = TransformState {
            rotate: 90.0,
            translate: Some((10.0, 10.0)),
            ..Default::default()
        };
        let decl = t.to_declaration().unwrap();
        assert!(decl.ends_with("translate(10px, 10px)"));
        assert_eq!(TransformState::parse(&decl).unwrap(), t);
    }

    #[test]
    fn unmodeled_function_rejects() {
        assert_eq!(TransformState::parse("matrix(1, 0, 0, 1, 0, 0)"), None);
        assert_eq!(TransformState::parse("rotate(5deg) matrix(1,0,0,1,0,0)"), None);
    }

    #[test]
    fn bare_scale_applies_both_axes() {
        let t = TransformState::parse("scale(2)").unwrap();
        assert_eq!((t.scale_x, t.scale_y), (2.0, 2.0));
    }
}
