//! Markup parser: document text → SceneGraph.
//!
//! Built on `winnow` 0.7. A best-effort XML subset: elements, attributes,
//! text content, comments, CDATA, prolog/doctype skipping, and the five
//! named entities plus numeric character references. Anything structurally
//! broken (unclosed or mismatched tags, a non-`<svg>` root) is a hard
//! parse error — the caller keeps its last good document and surfaces a
//! validation message.

use crate::id::NodeId;
use crate::model::{AttrMap, NodeKind, SceneGraph, SceneNode};
use crate::style::StyleState;
use petgraph::graph::NodeIndex;
use winnow::combinator::alt;
use winnow::combinator::delimited;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Parse a markup document into a `SceneGraph`.
#[must_use = "parsing result should be used"]
pub fn parse_document(input: &str) -> Result<SceneGraph, String> {
    let mut rest = input;
    skip_misc(&mut rest);
    let parsed = parse_element
        .parse_next(&mut rest)
        .map_err(|e| format!("markup parse error: {e}"))?;
    if parsed.node.kind != NodeKind::Svg {
        return Err(format!(
            "root element is <{}>, expected <svg>",
            parsed.node.kind.tag()
        ));
    }
    skip_misc(&mut rest);
    if !rest.trim().is_empty() {
        return Err("trailing content after the root element".to_string());
    }

    let mut graph = SceneGraph::from_root(parsed.node);
    let root = graph.root;
    for child in parsed.children {
        insert_recursive(&mut graph, root, child);
    }
    Ok(graph)
}

/// Parse a single-element fragment (a serialized subtree). The fragment
/// becomes the sole child of a scratch root, ready for grafting.
pub fn parse_fragment(input: &str) -> Result<SceneGraph, String> {
    let mut rest = input;
    skip_misc(&mut rest);
    let parsed = parse_element
        .parse_next(&mut rest)
        .map_err(|e| format!("fragment parse error: {e}"))?;
    let mut graph = SceneGraph::from_root(SceneNode::new(NodeKind::Svg));
    let root = graph.root;
    insert_recursive(&mut graph, root, parsed);
    Ok(graph)
}

/// Tree shape produced during parsing, before graph insertion.
#[derive(Debug)]
struct ParsedElement {
    node: SceneNode,
    children: Vec<ParsedElement>,
}

fn insert_recursive(graph: &mut SceneGraph, parent: NodeIndex, parsed: ParsedElement) {
    let idx = graph.add_child(parent, parsed.node);
    for child in parsed.children {
        insert_recursive(graph, idx, child);
    }
}

// ─── Low-level parsers ───────────────────────────────────────────────────

/// Skip whitespace, the XML prolog, doctypes, and comments.
fn skip_misc(input: &mut &str) {
    loop {
        *input = input.trim_start();
        if input.starts_with("<?") {
            skip_until(input, "?>");
        } else if input.starts_with("<!--") {
            skip_until(input, "-->");
        } else if input.starts_with("<!") {
            skip_until(input, ">");
        } else {
            break;
        }
    }
}

fn skip_until(input: &mut &str, end: &str) {
    match input.find(end) {
        Some(pos) => *input = &input[pos + end.len()..],
        None => *input = "",
    }
}

fn err() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn parse_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == ':' || c == '-' || c == '_' || c == '.'
    })
    .parse_next(input)
}

fn parse_attr_value(input: &mut &str) -> ModalResult<String> {
    let raw: &str = alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)?;
    Ok(decode_entities(raw))
}

fn parse_element(input: &mut &str) -> ModalResult<ParsedElement> {
    let _ = '<'.parse_next(input)?;
    let tag = parse_name.parse_next(input)?.to_string();

    let mut attrs = AttrMap::new();
    loop {
        *input = input.trim_start();
        if input.starts_with("/>") || input.starts_with('>') {
            break;
        }
        let name = parse_name.parse_next(input)?.to_string();
        *input = input.trim_start();
        let _ = '='.parse_next(input)?;
        *input = input.trim_start();
        let value = parse_attr_value.parse_next(input)?;
        attrs.set(&name, value);
    }

    let mut children = Vec::new();
    let mut text = String::new();

    if input.starts_with("/>") {
        *input = &input[2..];
    } else {
        let _ = '>'.parse_next(input)?;
        loop {
            if input.starts_with("</") {
                break;
            } else if input.starts_with("<!--") {
                skip_until(input, "-->");
            } else if input.starts_with("<![CDATA[") {
                *input = &input["<![CDATA[".len()..];
                let raw: &str = match input.find("]]>") {
                    Some(pos) => {
                        let (head, tail) = input.split_at(pos);
                        *input = &tail[3..];
                        head
                    }
                    None => return Err(err()),
                };
                text.push_str(raw);
            } else if input.starts_with('<') {
                children.push(parse_element.parse_next(input)?);
            } else if input.is_empty() {
                // unclosed element
                return Err(err());
            } else {
                let run: &str = take_till(1.., '<').parse_next(input)?;
                text.push_str(&decode_entities(run));
            }
        }
        let _ = "</".parse_next(input)?;
        let close = parse_name.parse_next(input)?;
        if close != tag {
            return Err(err());
        }
        *input = input.trim_start();
        let _ = '>'.parse_next(input)?;
    }

    let mut node = SceneNode::new(NodeKind::from_tag(&tag));
    node.id = attrs.take("id").filter(|s| !s.is_empty()).map(|s| NodeId::intern(&s));
    node.style = StyleState::extract(&mut attrs);
    node.attrs = attrs;
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        node.text = Some(trimmed.to_string());
    }

    Ok(ParsedElement { node, children })
}

// ─── Entities ────────────────────────────────────────────────────────────

/// Decode the five named entities and numeric character references.
/// Unknown entities pass through literally (best effort).
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';') else {
            out.push_str(rest);
            return out;
        };
        let entity = &rest[1..end];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                let decoded = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => out.push(c),
                    None => {
                        out.push('&');
                        out.push_str(entity);
                        out.push(';');
                    }
                }
            }
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_small_document() {
        let graph = parse_document(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
  <rect id="r1" x="10" y="10" width="30" height="20" fill="#ff0000"/>
  <text id="t1" x="50" y="50">Hello &amp; welcome</text>
</svg>"##,
        )
        .unwrap();

        assert_eq!(graph.canvas_size(), (100.0, 100.0));
        let r1 = graph.by_id("r1").unwrap();
        assert_eq!(graph.get(r1).kind, NodeKind::Rect);
        assert_eq!(graph.get(r1).attrs.get_num("x"), Some(10.0));
        let t1 = graph.by_id("t1").unwrap();
        assert_eq!(graph.get(t1).text.as_deref(), Some("Hello & welcome"));
    }

    #[test]
    fn root_must_be_svg() {
        assert!(parse_document("<div></div>").is_err());
    }

    #[test]
    fn mismatched_close_is_an_error() {
        assert!(parse_document("<svg><rect></svg>").is_err());
        assert!(parse_document("<svg><g></p></svg>").is_err());
    }

    #[test]
    fn prolog_doctype_and_comments_skip() {
        let graph = parse_document(
            "<?xml version=\"1.0\"?>\n<!DOCTYPE svg>\n<!-- banner -->\n<svg><!-- inner --><g id=\"grp\"/></svg>",
        )
        .unwrap();
        assert!(graph.by_id("grp").is_some());
    }

    #[test]
    fn unknown_tags_survive() {
        let graph = parse_document("<svg><foreignObject id=\"f\" data-x=\"1\"/></svg>").unwrap();
        let f = graph.by_id("f").unwrap();
        assert_eq!(
            graph.get(f).kind,
            NodeKind::Other("foreignObject".to_string())
        );
        assert_eq!(graph.get(f).attrs.get("data-x"), Some("1"));
    }

    #[test]
    fn numeric_entities_decode() {
        assert_eq!(decode_entities("a&#65;&#x42;&bogus;"), "aAB&bogus;");
    }

    #[test]
    fn fragment_parses_standalone_subtree() {
        let frag = parse_fragment("<g id=\"grp\"><circle id=\"c\" cx=\"5\" cy=\"5\" r=\"2\"/></g>")
            .unwrap();
        let top = frag.children(frag.root);
        assert_eq!(top.len(), 1);
        assert_eq!(frag.get(top[0]).kind, NodeKind::Group);
        assert_eq!(frag.children(top[0]).len(), 1);
    }
}
