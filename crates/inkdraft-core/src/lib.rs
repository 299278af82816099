pub mod color;
pub mod emitter;
pub mod filter;
pub mod geometry;
pub mod id;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod style;
pub mod transform;

pub use color::Color;
pub use emitter::{emit_document, emit_fragment, format_num};
pub use filter::{FilterChain, Shadow};
pub use geometry::{Bounds, hit_test, node_bounds};
pub use id::NodeId;
pub use model::*;
pub use normalize::{normalize_document, normalize_graph};
pub use parser::{parse_document, parse_fragment};
pub use style::{Paint, Repr, StyleState, Styled};
pub use transform::TransformState;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::stable_graph::NodeIndex;
