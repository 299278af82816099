//! Integration tests: parse → emit → re-parse round-trip.
//!
//! Verifies that no data is lost when converting SVG text → SceneGraph → SVG text.

use inkdraft_core::emitter::emit_document;
use inkdraft_core::model::*;
use inkdraft_core::parser::parse_document;

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Parse, emit, re-parse, and compare node counts + IDs.
fn assert_roundtrip_preserves(input: &str) {
    let graph1 = parse_document(input).expect("first parse failed");
    let emitted = emit_document(&graph1);
    let graph2 = parse_document(&emitted).expect("re-parse failed");

    assert_eq!(
        graph1.graph.node_count(),
        graph2.graph.node_count(),
        "node count mismatch after round-trip.\nOriginal:\n{input}\nEmitted:\n{emitted}"
    );

    // Every node ID in graph1 exists in graph2
    for id in graph1.id_index.keys() {
        assert!(
            graph2.id_index.contains_key(id),
            "node ID {id:?} lost after round-trip"
        );
    }
}

/// Verify a specific node's kind survives round-trip.
fn assert_node_kind_preserved(input: &str, node_id: &str) {
    let graph1 = parse_document(input).expect("first parse failed");
    let emitted = emit_document(&graph1);
    let graph2 = parse_document(&emitted).expect("re-parse failed");

    let n1 = graph1
        .by_id(node_id)
        .map(|i| graph1.get(i))
        .expect("node missing in original");
    let n2 = graph2
        .by_id(node_id)
        .map(|i| graph2.get(i))
        .expect("node missing after round-trip");

    assert_eq!(
        n1.kind, n2.kind,
        "node kind changed for #{node_id} after round-trip"
    );
}

// ─── Fixture-based tests ─────────────────────────────────────────────────

#[test]
fn roundtrip_badge_fixture() {
    let input = include_str!("fixtures/badge.svg");
    assert_roundtrip_preserves(input);
}

#[test]
fn roundtrip_freeform_fixture() {
    let input = include_str!("fixtures/freeform.svg");
    assert_roundtrip_preserves(input);
}

#[test]
fn emit_is_stable_after_first_pass() {
    // The emitter is canonical: once a document has been through it,
    // a second parse → emit changes nothing.
    let graph1 = parse_document(include_str!("fixtures/freeform.svg")).unwrap();
    let once = emit_document(&graph1);
    let twice = emit_document(&parse_document(&once).unwrap());
    pretty_assertions::assert_eq!(once, twice);
}

// ─── Node kind preservation ──────────────────────────────────────────────

#[test]
fn roundtrip_preserves_circle_kind() {
    assert_node_kind_preserved(include_str!("fixtures/badge.svg"), "ring");
}

#[test]
fn roundtrip_preserves_group_kind() {
    assert_node_kind_preserved(include_str!("fixtures/badge.svg"), "badge");
}

#[test]
fn roundtrip_preserves_text_kind() {
    assert_node_kind_preserved(include_str!("fixtures/badge.svg"), "label");
}

// ─── Style preservation ──────────────────────────────────────────────────

#[test]
fn roundtrip_preserves_style_string_properties() {
    let input = include_str!("fixtures/freeform.svg");
    let graph1 = parse_document(input).unwrap();
    let emitted = emit_document(&graph1);
    let graph2 = parse_document(&emitted).unwrap();

    let idx = graph2.by_id("blob").expect("blob missing after round-trip");
    let blob = graph2.get(idx);
    let fill = blob.style.fill.as_ref().expect("fill lost");
    assert_eq!(fill.value.to_value(), "#22c55e");
    // fill came from an attribute AND the style string shadowed fill-opacity
    assert!(fill.repr.has_attr());
    let fo = blob.style.fill_opacity.as_ref().expect("fill-opacity lost");
    assert!(fo.repr.has_style() && !fo.repr.has_attr());
    assert_eq!(fo.value, 0.5);
}

#[test]
fn roundtrip_preserves_transform_declaration() {
    let input = include_str!("fixtures/freeform.svg");
    let graph1 = parse_document(input).unwrap();
    let emitted = emit_document(&graph1);
    let graph2 = parse_document(&emitted).unwrap();

    let idx = graph2.by_id("blob").unwrap();
    let transform = graph2.get(idx).style.transform.as_ref().expect("transform lost");
    assert_eq!(transform.rotate, 15.0);
}

#[test]
fn roundtrip_preserves_gradient_reference() {
    let input = include_str!("fixtures/badge.svg");
    let graph1 = parse_document(input).unwrap();
    let emitted = emit_document(&graph1);
    let graph2 = parse_document(&emitted).unwrap();

    let idx = graph2.by_id("ring").unwrap();
    let fill = &graph2.get(idx).style.fill.as_ref().unwrap().value;
    assert_eq!(fill.to_value(), "url(#grad-sky)");
}

// ─── Text content ────────────────────────────────────────────────────────

#[test]
fn roundtrip_decodes_and_reencodes_entities() {
    let input = include_str!("fixtures/freeform.svg");
    let graph1 = parse_document(input).unwrap();

    let find_text = |g: &SceneGraph| -> String {
        g.descendants()
            .into_iter()
            .filter_map(|i| {
                let n = g.get(i);
                matches!(n.kind, NodeKind::Text).then(|| n.text.clone()).flatten()
            })
            .next()
            .expect("text node missing")
    };
    assert_eq!(find_text(&graph1), "Q&A <draft>");

    let emitted = emit_document(&graph1);
    assert!(emitted.contains("Q&amp;A &lt;draft&gt;"));
    let graph2 = parse_document(&emitted).unwrap();
    assert_eq!(find_text(&graph2), "Q&A <draft>");
}

// ─── Edge cases ──────────────────────────────────────────────────────────

#[test]
fn roundtrip_empty_svg() {
    assert_roundtrip_preserves("<svg/>");
}

#[test]
fn parse_rejects_truncated_markup() {
    assert!(parse_document("<svg><rect x=\"1\"").is_err());
}

#[test]
fn parse_rejects_mismatched_close_tag() {
    assert!(parse_document("<svg><g></rect></svg>").is_err());
}

#[test]
fn parse_rejects_non_svg_root() {
    assert!(parse_document("<div>hello</div>").is_err());
}

#[test]
fn roundtrip_unknown_elements_survive() {
    let input = "<svg><metadata key=\"tool\"/><rect id=\"r\" x=\"1\" y=\"1\" width=\"2\" height=\"2\"/></svg>";
    let graph1 = parse_document(input).unwrap();
    let emitted = emit_document(&graph1);
    assert!(emitted.contains("<metadata key=\"tool\"/>"));
    assert_roundtrip_preserves(input);
}
