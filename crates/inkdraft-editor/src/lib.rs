pub mod clipboard;
pub mod gesture;
pub mod gradient;
pub mod history;
pub mod layers;
pub mod mutate;
pub mod session;
pub mod shapes;
pub mod shortcuts;

pub use clipboard::{ClipEntry, Clipboard};
pub use gesture::{Handle, MoveController, TransformController};
pub use gradient::{GradientKind, gradient_stops, set_gradient, set_solid};
pub use history::History;
pub use layers::{AlignEdge, AlignOutcome, LayerInfo};
pub use mutate::{PropertyEdit, apply_edit};
pub use session::EditorSession;
pub use shapes::{ShapeKind, create_shape};
pub use shortcuts::{EditorAction, ShortcutMap};
