//! Studio
//!
//! The per-project state container: validate, apply, commit, undo, redo.

mod apply;
mod session;

pub use apply::{apply_operation, new_layer_id};
pub use session::{Applied, LayerSnapshot, ProjectSession};
