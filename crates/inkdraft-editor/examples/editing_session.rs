//! Drives one editing session end to end and prints the final document.
//! Run with RUST_LOG=debug to watch the operation log.

use inkdraft_core::color::Color;
use inkdraft_editor::gradient::GradientKind;
use inkdraft_editor::layers::AlignEdge;
use inkdraft_editor::session::EditorSession;
use inkdraft_editor::shapes::ShapeKind;

fn main() {
    env_logger::init();

    let mut session = EditorSession::new();

    if let Some(card) = session.add_shape(ShapeKind::Rect) {
        session.apply_property(card, "width", "360");
        session.apply_property(card, "height", "200");
        session.align(card, AlignEdge::HCenter);
        session.align(card, AlignEdge::VCenter);
        session.apply_property(card, "corner-radius", "16");
        session.set_gradient(
            card,
            GradientKind::Linear,
            Color::rgb(0x6c, 0x5c, 0xe7),
            Color::rgb(0x00, 0xb8, 0x94),
        );
    }

    if let Some(star) = session.add_shape(ShapeKind::Star) {
        session.apply_property(star, "fill", "#fdcb6e");
        session.apply_property(star, "rotate", "18");
        session.nudge(star, 0.0, -40.0);
    }

    if let Some(label) = session.add_shape(ShapeKind::Text) {
        session.apply_property(label, "text", "Hello, Inkdraft");
        session.apply_property(label, "font-size", "28");
        session.nudge(label, 0.0, 70.0);
    }

    // Step back over the last change, then reapply it.
    session.undo();
    session.redo();

    println!("{}", session.text());
    eprintln!("suggested filename: {}", session.export_filename());
}
