//! Emitter: SceneGraph → markup text.
//!
//! Serialization is deterministic: id first, plain attributes in source
//! order, modeled presentation attributes in canonical order, the style
//! string last. Emitting a just-parsed document reproduces it byte for
//! byte once it has passed through normalization, which is what makes
//! normalization idempotent.

use crate::model::{SceneGraph, SceneNode};
use petgraph::graph::NodeIndex;
use std::fmt::Write;

/// Emit a `SceneGraph` as a markup document (with trailing newline).
#[must_use]
pub fn emit_document(graph: &SceneGraph) -> String {
    let mut out = String::with_capacity(1024);
    emit_node(&mut out, graph, graph.root, 0);
    out
}

/// Emit the subtree rooted at `idx` as a standalone fragment.
#[must_use]
pub fn emit_fragment(graph: &SceneGraph, idx: NodeIndex) -> String {
    let mut out = String::new();
    emit_node(&mut out, graph, idx, 0);
    out
}

fn emit_node(out: &mut String, graph: &SceneGraph, idx: NodeIndex, depth: usize) {
    let node = graph.get(idx);
    let tag = node.kind.tag();

    indent(out, depth);
    out.push('<');
    out.push_str(tag);
    emit_attrs(out, node);

    let children = graph.children(idx);
    if children.is_empty() && node.text.is_none() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');

    if let Some(text) = &node.text {
        if children.is_empty() {
            out.push_str(&encode_text(text));
            let _ = writeln!(out, "</{tag}>");
            return;
        }
        out.push('\n');
        indent(out, depth + 1);
        out.push_str(&encode_text(text));
        out.push('\n');
    } else {
        out.push('\n');
    }

    for &child in children {
        emit_node(out, graph, child, depth + 1);
    }

    indent(out, depth);
    let _ = writeln!(out, "</{tag}>");
}

fn emit_attrs(out: &mut String, node: &SceneNode) {
    if let Some(id) = node.id {
        let _ = write!(out, " id=\"{}\"", encode_attr(id.as_str()));
    }
    for (key, value) in node.attrs.iter() {
        let _ = write!(out, " {key}=\"{}\"", encode_attr(value));
    }
    for (key, value) in node.style.attr_entries() {
        let _ = write!(out, " {key}=\"{}\"", encode_attr(&value));
    }
    if let Some(style) = node.style.style_value() {
        let _ = write!(out, " style=\"{}\"", encode_attr(&style));
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Minimal attribute-value escaping: `&`, `<`, `"`.
fn encode_attr(s: &str) -> String {
    if !s.contains(['&', '<', '"']) {
        return s.to_string();
    }
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

/// Minimal text escaping: `&`, `<`, `>`.
fn encode_text(s: &str) -> String {
    if !s.contains(['&', '<', '>']) {
        return s.to_string();
    }
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Format a number the way the documents carry them: integers bare,
/// fractions trimmed to at most two decimals.
pub fn format_num(n: f32) -> String {
    if n == n.floor() {
        format!("{}", n as i32)
    } else {
        format!("{n:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::{NodeKind, SceneNode};
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_attribute_placement() {
        let mut graph = SceneGraph::new(100.0, 100.0);
        let mut rect = SceneNode::with_id(NodeKind::Rect, NodeId::intern("r1"));
        rect.attrs.set_num("x", 10.0);
        rect.attrs.set_num("y", 20.0);
        rect.style.fill = Some(crate::style::Styled::both(crate::style::Paint::Solid(
            crate::color::Color::rgb(255, 0, 0),
        )));
        graph.add_child(graph.root, rect);

        let text = emit_document(&graph);
        assert_eq!(
            text,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 100\" width=\"100\" height=\"100\">\n  <rect id=\"r1\" x=\"10\" y=\"20\" fill=\"#ff0000\" style=\"fill: #ff0000\"/>\n</svg>\n"
        );
    }

    #[test]
    fn text_nodes_emit_inline() {
        let mut graph = SceneGraph::new(100.0, 100.0);
        let mut label = SceneNode::with_id(NodeKind::Text, NodeId::intern("t1"));
        label.text = Some("5 < 6 & 7".to_string());
        graph.add_child(graph.root, label);

        let out = emit_document(&graph);
        assert!(out.contains("<text id=\"t1\">5 &lt; 6 &amp; 7</text>"));
    }

    #[test]
    fn fragment_emits_subtree_only() {
        let mut graph = SceneGraph::new(100.0, 100.0);
        let g = graph.add_child(
            graph.root,
            SceneNode::with_id(NodeKind::Group, NodeId::intern("grp")),
        );
        graph.add_child(g, SceneNode::with_id(NodeKind::Rect, NodeId::intern("r2")));

        let frag = emit_fragment(&graph, g);
        assert_eq!(frag, "<g id=\"grp\">\n  <rect id=\"r2\"/>\n</g>\n");
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_num(12.0), "12");
        assert_eq!(format_num(0.5), "0.5");
        assert_eq!(format_num(1.204), "1.2");
        assert_eq!(format_num(-3.567), "-3.57");
    }
}
