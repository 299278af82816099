//! Integration tests: whole editing flows through the session facade.
//!
//! These walk the documented behaviors end to end — shape creation,
//! duplication offsets, alignment math, gradient fills, the fixed
//! transform order, and the silent-no-op contract for stale targets.

use inkdraft_core::color::Color;
use inkdraft_core::id::NodeId;
use inkdraft_core::parser::parse_document;
use inkdraft_editor::gradient::{gradient_stops, GradientKind};
use inkdraft_editor::layers::{AlignEdge, AlignOutcome};
use inkdraft_editor::session::EditorSession;
use inkdraft_editor::shapes::ShapeKind;

fn make_session() -> EditorSession {
    let input = include_str!("fixtures/scene.svg");
    EditorSession::open(input).unwrap()
}

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

// ─── Normalization on open ──────────────────────────────────────────────

#[test]
fn open_normalizes_foreign_markup() {
    let session = EditorSession::open("<svg><rect width=\"30\" height=\"30\"/></svg>").unwrap();
    assert!(session.text().contains("viewBox=\"0 0 512 512\""));
    assert!(session.text().contains("xmlns="));

    let layers = session.layers();
    assert_eq!(layers.len(), 1);
    assert!(layers[0].id.as_str().starts_with("rect-"));
}

#[test]
fn canonical_text_is_stable() {
    let mut session = make_session();
    let canonical = session.text().to_string();
    assert!(session.set_text(&canonical));
    assert_eq!(session.text(), canonical);
}

// ─── Duplication ────────────────────────────────────────────────────────

#[test]
fn duplicate_offsets_clone_and_inserts_after_original() {
    let mut session = make_session();
    let copy = session.duplicate(id("panel")).unwrap();

    let node = session.node_snapshot(copy).unwrap();
    assert_eq!(node.attrs.get_num("x"), Some(30.0));
    assert_eq!(node.attrs.get_num("y"), Some(30.0));

    // document order: background, panel, copy, dot — listed topmost first
    let layers = session.layers();
    assert_eq!(layers[0].id, id("dot"));
    assert_eq!(layers[1].id, copy);
    assert_eq!(layers[2].id, id("panel"));
}

#[test]
fn paste_lands_topmost() {
    let mut session = make_session();
    assert!(session.copy(id("panel")));
    let pasted = session.paste().unwrap();

    let layers = session.layers();
    assert_eq!(layers[0].id, pasted);
    assert_eq!(session.selection, Some(pasted));
}

// ─── Alignment ──────────────────────────────────────────────────────────

#[test]
fn rect_aligns_against_canvas_edges() {
    let mut session = make_session();

    assert_eq!(session.align(id("panel"), AlignEdge::Left), AlignOutcome::Applied);
    assert_eq!(
        session.node_snapshot(id("panel")).unwrap().attrs.get_num("x"),
        Some(0.0)
    );

    session.align(id("panel"), AlignEdge::HCenter);
    assert_eq!(
        session.node_snapshot(id("panel")).unwrap().attrs.get_num("x"),
        Some(70.0)
    );

    session.align(id("panel"), AlignEdge::Right);
    assert_eq!(
        session.node_snapshot(id("panel")).unwrap().attrs.get_num("x"),
        Some(140.0)
    );
}

#[test]
fn text_alignment_is_center_only() {
    let mut session = make_session();
    let label = session.add_shape(ShapeKind::Text).unwrap();
    session.apply_property(label, "x", "12");

    assert_eq!(session.align(label, AlignEdge::HCenter), AlignOutcome::Applied);
    let node = session.node_snapshot(label).unwrap();
    assert_eq!(node.attrs.get_num("x"), Some(100.0));
    assert_eq!(node.style_or_attr("text-anchor", ""), "middle");

    assert_eq!(session.align(label, AlignEdge::Top), AlignOutcome::Unsupported);
    assert_eq!(session.align(label, AlignEdge::Right), AlignOutcome::Unsupported);
}

#[test]
fn alignment_of_missing_node_reports_missing() {
    let mut session = make_session();
    let before = session.text().to_string();
    assert_eq!(session.align(id("ghost"), AlignEdge::Left), AlignOutcome::Missing);
    assert_eq!(session.text(), before);
}

// ─── Gradient fills ─────────────────────────────────────────────────────

#[test]
fn gradient_fill_roundtrip() {
    let mut session = make_session();
    let red = Color::rgb(0xff, 0x00, 0x00);
    let blue = Color::rgb(0x00, 0x00, 0xff);

    let grad = session
        .set_gradient(id("dot"), GradientKind::Linear, red, blue)
        .unwrap();

    let node = session.node_snapshot(id("dot")).unwrap();
    assert_eq!(node.style_or_attr("fill", ""), format!("url(#{grad})"));

    let graph = parse_document(session.text()).unwrap();
    let stops = gradient_stops(&graph, grad);
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0], ("0%".to_string(), red));
    assert_eq!(stops[1], ("100%".to_string(), blue));
}

#[test]
fn gradient_is_undoable() {
    let mut session = make_session();
    let grad = session
        .set_gradient(
            id("dot"),
            GradientKind::Radial,
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
        )
        .unwrap();
    assert!(session.text().contains(&format!("url(#{grad})")));

    assert!(session.undo());
    assert!(!session.text().contains("radialGradient"));
    assert_eq!(
        session.node_snapshot(id("dot")).unwrap().style_or_attr("fill", ""),
        "#e17055"
    );
}

// ─── Shape factory ──────────────────────────────────────────────────────

#[test]
fn star_points_survive_the_document_roundtrip() {
    let mut session = make_session();
    let star = session.add_shape(ShapeKind::Star).unwrap();

    // the snapshot comes from a re-parse of the emitted text
    let node = session.node_snapshot(star).unwrap();
    let points = node.attrs.get("points").unwrap().to_string();
    let coords: Vec<f32> = points
        .split_whitespace()
        .flat_map(|pair| pair.split(','))
        .map(|n| n.parse().unwrap())
        .collect();
    assert_eq!(coords.len(), 20, "ten vertices");

    // canvas 200 → size 40: outer radius 20, inner radius 8, center (100,100)
    for (i, pair) in coords.chunks(2).enumerate() {
        let r = ((pair[0] - 100.0).powi(2) + (pair[1] - 100.0).powi(2)).sqrt();
        let expected = if i % 2 == 0 { 20.0 } else { 8.0 };
        assert!(
            (r - expected).abs() < 0.05,
            "vertex {i}: radius {r}, expected {expected}"
        );
    }
}

#[test]
fn created_shapes_are_committed() {
    let mut session = make_session();
    let heart = session.add_shape(ShapeKind::Heart).unwrap();
    assert!(session.node_snapshot(heart).is_some());
    assert!(session.undo());
    assert!(session.node_snapshot(heart).is_none());
}

// ─── Transform channel order ────────────────────────────────────────────

#[test]
fn transform_functions_keep_fixed_order_across_edit_sequences() {
    let mut session = make_session();

    // edits arrive in the reverse of the serialized order, and each one
    // round-trips through the serialized document before the next
    session.apply_property(id("panel"), "skew-x", "10");
    session.apply_property(id("panel"), "rotate", "45");
    session.apply_property(id("panel"), "scale", "2");

    assert!(
        session
            .text()
            .contains("rotate(45deg) scale(2, 2) skewX(10deg) skewY(0deg)"),
        "order must be rotate, scale, skewX, skewY:\n{}",
        session.text()
    );

    session.apply_property(id("panel"), "flip-x", "");
    assert!(
        session
            .text()
            .contains("rotate(45deg) scale(-2, 2) skewX(10deg) skewY(0deg)"),
        "flip folds into the scale sign"
    );
}

// ─── Stale targets ──────────────────────────────────────────────────────

#[test]
fn mutations_on_deleted_nodes_are_silent_no_ops() {
    let mut session = make_session();
    assert!(session.delete(id("dot")));
    let before = session.text().to_string();

    assert!(!session.apply_property(id("dot"), "fill", "#123456"));
    assert!(!session.move_up(id("dot")));
    assert!(!session.toggle_visibility(id("dot")));
    assert!(session.duplicate(id("dot")).is_none());
    assert!(!session.nudge(id("dot"), 5.0, 5.0));

    assert_eq!(session.text(), before, "document must be untouched");
}

// ─── Keyboard-driven editing ────────────────────────────────────────────

#[test]
fn arrow_keys_require_a_selection() {
    let mut session = make_session();
    assert!(session.handle_key("Escape", false, false, false, false));
    assert!(!session.handle_key("ArrowRight", false, false, false, false));
}

#[test]
fn shift_arrow_nudges_ten_units() {
    let mut session = make_session();
    session.selection = Some(id("dot"));
    assert!(session.handle_key("ArrowDown", false, true, false, false));
    let node = session.node_snapshot(id("dot")).unwrap();
    assert_eq!(node.attrs.get_num("cy"), Some(150.0));
}

// ─── Export ─────────────────────────────────────────────────────────────

#[test]
fn export_filename_is_generated() {
    let session = make_session();
    let name = session.export_filename();
    assert!(name.starts_with("inkdraft-"));
    assert!(name.ends_with(".svg"));
}
