//! Project Session
//!
//! Explicit state container scoped to one project. Callers hold the session
//! and pass it where it is needed; mutation goes through `&mut self`, so a
//! session has at most one mutation in flight.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::constraints::{ConstraintEngine, ValidationResult};
use crate::error::{Result, StudioError};
use crate::model::{CanvasSize, Layer, LayerId, Operation, Project};

use super::apply::apply_operation;

/// Immutable view of the layer stack taken at one instant.
///
/// Later commits replace the live stack without touching a snapshot, so
/// exports and read-only validation can run against it freely.
#[derive(Debug, Clone)]
pub struct LayerSnapshot {
    pub canvas: CanvasSize,
    pub layers: Arc<Vec<Layer>>,
}

/// Outcome of [`ProjectSession::apply`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Applied {
    pub validation: ValidationResult,
    /// False when validation blocked the operation.
    pub committed: bool,
    /// Id assigned by ADD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<LayerId>,
}

#[derive(Debug)]
pub struct ProjectSession {
    project: Project,
    engine: Arc<ConstraintEngine>,
}

impl ProjectSession {
    pub fn new(project: Project) -> Self {
        Self::with_engine(project, Arc::new(ConstraintEngine::new()))
    }

    pub fn with_engine(project: Project, engine: Arc<ConstraintEngine>) -> Self {
        Self { project, engine }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn engine(&self) -> &ConstraintEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> LayerSnapshot {
        LayerSnapshot {
            canvas: self.project.canvas.clone(),
            layers: self.project.layer_stack(),
        }
    }

    /// Validate without applying.
    pub fn validate(&self, op: &Operation) -> ValidationResult {
        self.engine.validate(&self.project, op)
    }

    /// Validate, then apply and commit if no error-severity violation fired.
    ///
    /// A blocked operation leaves the project untouched and returns
    /// `committed = false`. Unknown target layers fail before validation.
    pub fn apply(&mut self, op: Operation) -> Result<Applied> {
        if let Some(target) = op.target() {
            if self.project.layer(target).is_none() {
                return Err(StudioError::LayerNotFound {
                    id: target.to_string(),
                });
            }
        }

        let validation = self.validate(&op);
        if !validation.valid {
            warn!(
                operation = %op.kind(),
                target = op.target().unwrap_or("-"),
                rules = ?validation.errors().map(|v| v.rule.as_str()).collect::<Vec<_>>(),
                "operation blocked by brand rules"
            );
            return Ok(Applied {
                validation,
                committed: false,
                layer_id: None,
            });
        }

        let label = op.label();
        let kind = op.kind();
        let (layers, layer_id) = apply_operation(self.project.layers(), op)?;
        self.project.commit(layers, label.clone());

        info!(
            operation = %kind,
            label = %label,
            warnings = validation.warnings().count(),
            history_index = self.project.history().index(),
            "operation committed"
        );

        Ok(Applied {
            validation,
            committed: true,
            layer_id,
        })
    }

    /// Step back one snapshot. False when already at the base.
    pub fn undo(&mut self) -> bool {
        self.project.undo()
    }

    /// Step forward one snapshot. False when already at the newest.
    pub fn redo(&mut self) -> bool {
        self.project.redo()
    }

    pub fn into_project(self) -> Project {
        self.project
    }
}
