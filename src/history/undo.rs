//! Undo/Redo History
//!
//! A linear sequence of full layer-stack snapshots with a cursor. Committing
//! after an undo discards the undone branch; there is no redo tree.
//!
//! Snapshots are immutable once committed. They are held behind `Arc` so a
//! reader can keep a snapshot alive while later commits replace the live
//! stack; no snapshot is ever mutated in place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Layer;

/// Label of the base snapshot a history starts from.
pub const INITIAL_LABEL: &str = "Initial state";

/// One committed layer-stack state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Full copy of the layer collection at this point.
    pub layers: Arc<Vec<Layer>>,

    /// Human-readable description of the change that produced this state.
    pub label: String,

    /// When the state was committed.
    pub committed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(layers: Vec<Layer>, label: impl Into<String>) -> Self {
        Self {
            layers: Arc::new(layers),
            label: label.into(),
            committed_at: Utc::now(),
        }
    }
}

/// Snapshot history with a cursor.
///
/// Invariant: `entries` is never empty and `index < entries.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "HistoryRecord")]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_depth: Option<usize>,
}

/// Unchecked wire form of [`History`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRecord {
    entries: Vec<HistoryEntry>,
    index: usize,
    #[serde(default)]
    max_depth: Option<usize>,
}

impl TryFrom<HistoryRecord> for History {
    type Error = String;

    fn try_from(record: HistoryRecord) -> std::result::Result<Self, Self::Error> {
        if record.entries.is_empty() {
            return Err("history must contain at least one snapshot".to_string());
        }
        if record.index >= record.entries.len() {
            return Err(format!(
                "history index {} out of range for {} snapshots",
                record.index,
                record.entries.len()
            ));
        }
        Ok(Self {
            entries: record.entries,
            index: record.index,
            max_depth: record.max_depth,
        })
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Start a history whose base snapshot is `base`.
    pub fn new(base: Vec<Layer>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(base, INITIAL_LABEL)],
            index: 0,
            max_depth: None,
        }
    }

    /// Limit the number of undo steps kept. `None` keeps everything.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self.trim_history();
        self
    }

    /// The snapshot under the cursor. This is the live layer state.
    pub fn current(&self) -> &Arc<Vec<Layer>> {
        &self.entries[self.index].layers
    }

    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    /// Append `layers` as a new snapshot.
    ///
    /// Truncates everything after the cursor first, so any undone states are
    /// gone for good. The cursor ends on the new snapshot.
    pub fn commit(&mut self, layers: Vec<Layer>, label: impl Into<String>) {
        let label = label.into();
        let discarded = self.entries.len() - (self.index + 1);
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry::new(layers, label.clone()));
        self.index = self.entries.len() - 1;
        self.trim_history();

        debug!(
            label = %label,
            index = self.index,
            discarded,
            "history commit"
        );
    }

    /// Step the cursor back. Returns false at the base snapshot.
    pub fn undo(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        debug!(index = self.index, "history undo");
        true
    }

    /// Step the cursor forward. Returns false at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        debug!(index = self.index, "history redo");
        true
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Position of the cursor.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of snapshots, including the base.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its base snapshot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Drop the oldest snapshots beyond `max_depth` undo steps.
    fn trim_history(&mut self) {
        let Some(depth) = self.max_depth else {
            return;
        };
        let excess = self.entries.len().saturating_sub(depth + 1);
        let excess = excess.min(self.index);
        if excess > 0 {
            self.entries.drain(..excess);
            self.index -= excess;
        }
    }
}
