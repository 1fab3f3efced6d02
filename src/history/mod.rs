//! History Module
//!
//! Linear undo/redo over full layer-stack snapshots.

mod undo;

pub use undo::{History, HistoryEntry, INITIAL_LABEL};
