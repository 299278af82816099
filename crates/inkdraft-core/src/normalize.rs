//! Scene normalizer: raw document text → canonical well-formed text.
//!
//! Guarantees after a pass: an explicit namespace declaration, a viewBox,
//! pixel width/height attributes mirroring it, and a unique id on every
//! paintable node. Normalization is idempotent — a second pass is a
//! byte-identical no-op — because emission itself is canonical.

use crate::emitter::emit_document;
use crate::id::NodeId;
use crate::model::{AttrMap, SceneGraph};
use crate::parser::parse_document;
use crate::style::num_arg;
use std::collections::HashSet;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Default canvas dimension when a document declares no usable size.
pub const DEFAULT_CANVAS: f32 = 512.0;

/// Normalize raw document text. On parse failure the error carries the
/// reason; the caller keeps its last good text and surfaces the message as
/// a validation error instead of blocking further edits.
pub fn normalize_document(text: &str) -> Result<String, String> {
    let mut graph = parse_document(text)?;
    normalize_graph(&mut graph);
    Ok(emit_document(&graph))
}

/// The graph-level normalization pass, for callers that already parsed.
pub fn normalize_graph(graph: &mut SceneGraph) {
    ensure_namespace(graph);
    ensure_view_box(graph);
    ensure_pixel_size(graph);
    ensure_unique_ids(graph);
}

fn ensure_namespace(graph: &mut SceneGraph) {
    let root = graph.root;
    let attrs = &mut graph.get_mut(root).attrs;
    if attrs.get("xmlns").is_none() {
        attrs.set("xmlns", SVG_NAMESPACE);
    }
}

/// A usable pixel dimension: numeric and not percentage-based.
fn pixel_dim(attrs: &AttrMap, key: &str) -> Option<f32> {
    let raw = attrs.get(key)?;
    if raw.trim_end().ends_with('%') {
        return None;
    }
    num_arg(raw)
}

fn ensure_view_box(graph: &mut SceneGraph) {
    let root = graph.root;
    let attrs = &mut graph.get_mut(root).attrs;
    if attrs.get("viewBox").is_some() {
        return;
    }
    let (w, h) = match (pixel_dim(attrs, "width"), pixel_dim(attrs, "height")) {
        (Some(w), Some(h)) => (w, h),
        _ => (DEFAULT_CANVAS, DEFAULT_CANVAS),
    };
    attrs.set(
        "viewBox",
        format!(
            "0 0 {} {}",
            crate::emitter::format_num(w),
            crate::emitter::format_num(h)
        ),
    );
}

/// Percentage or missing width/height collapse to zero in some layout
/// hosts, so mirror the viewBox into explicit pixel attributes.
fn ensure_pixel_size(graph: &mut SceneGraph) {
    let [_, _, w, h] = graph.view_box().unwrap_or([0.0, 0.0, DEFAULT_CANVAS, DEFAULT_CANVAS]);
    let root = graph.root;
    let attrs = &mut graph.get_mut(root).attrs;
    if pixel_dim(attrs, "width").is_none() {
        attrs.set_num("width", w);
    }
    if pixel_dim(attrs, "height").is_none() {
        attrs.set_num("height", h);
    }
}

fn ensure_unique_ids(graph: &mut SceneGraph) {
    let mut seen: HashSet<NodeId> = HashSet::new();
    for (position, idx) in graph.descendants().into_iter().enumerate() {
        let node = graph.get(idx);
        if !node.kind.is_paintable() {
            if let Some(id) = node.id {
                seen.insert(id);
            }
            continue;
        }
        let tag = node.kind.tag().to_string();
        match node.id {
            Some(id) if !seen.contains(&id) => {
                // a later duplicate may hold the index slot; first wins
                graph.id_index.insert(id, idx);
                seen.insert(id);
            }
            _ => {
                let fresh = NodeId::synthesize(&tag, position);
                graph.set_node_id(idx, fresh);
                seen.insert(fresh);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn idempotent_on_canonical_input() {
        let once = normalize_document(
            "<svg width=\"100%\" height=\"100%\"><rect x=\"1\" y=\"2\" width=\"3\" height=\"4\"/></svg>",
        )
        .unwrap();
        let twice = normalize_document(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn view_box_defaults_to_512() {
        let out = normalize_document("<svg><rect/></svg>").unwrap();
        assert!(out.contains("viewBox=\"0 0 512 512\""));
        assert!(out.contains("width=\"512\""));
        assert!(out.contains("height=\"512\""));
    }

    #[test]
    fn view_box_synthesized_from_pixel_size() {
        let out = normalize_document("<svg width=\"300\" height=\"150\"></svg>").unwrap();
        assert!(out.contains("viewBox=\"0 0 300 150\""));
    }

    #[test]
    fn percentage_size_is_mirrored_from_view_box() {
        let out =
            normalize_document("<svg viewBox=\"0 0 640 480\" width=\"100%\" height=\"100%\"/>")
                .unwrap();
        assert!(out.contains("width=\"640\""));
        assert!(out.contains("height=\"480\""));
    }

    #[test]
    fn paintable_nodes_receive_unique_ids() {
        let out = normalize_document(
            "<svg viewBox=\"0 0 10 10\"><rect/><rect id=\"dup\"/><rect id=\"dup\"/></svg>",
        )
        .unwrap();
        let graph = parse_document(&out).unwrap();
        let mut ids = Vec::new();
        for idx in graph.descendants() {
            let node = graph.get(idx);
            if node.kind.is_paintable() {
                ids.push(node.id.unwrap().as_str().to_string());
            }
        }
        assert_eq!(ids.len(), 3);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(ids.contains(&"dup".to_string()));
    }

    #[test]
    fn first_duplicate_keeps_its_id_and_stays_resolvable() {
        let mut graph = parse_document(
            "<svg viewBox=\"0 0 10 10\"><rect id=\"dup\" x=\"1\"/><rect id=\"dup\" x=\"2\"/></svg>",
        )
        .unwrap();
        normalize_graph(&mut graph);
        let idx = graph.by_id("dup").unwrap();
        assert_eq!(graph.get(idx).attrs.get_num("x"), Some(1.0));
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(normalize_document("<svg><rect").is_err());
        assert!(normalize_document("plain text").is_err());
    }

    #[test]
    fn existing_namespace_untouched() {
        let out = normalize_document("<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();
        assert_eq!(out.matches("xmlns").count(), 1);
    }
}
