//! Brandcanvas - Brand-Governed Layer Composition
//!
//! A design project is a stack of image, brand-asset and text layers on a
//! fixed canvas, bound to one brand kit. Every structural change goes
//! through the constraint engine before it is committed.
//!
//! # Architecture
//!
//! - `model`: layers, brand kits, operations and projects (plain data)
//! - `constraints`: brand rules, violations and prompt enrichment
//! - `history`: linear undo/redo over full layer snapshots
//! - `studio`: validate, apply and commit against one project
//! - `compositor`: deterministic flatten and export to PNG, JPEG or WebP
//! - `generation`: AI background synthesis and style variations

pub mod cli;
pub mod compositor;
pub mod config;
pub mod constraints;
pub mod error;
pub mod generation;
pub mod history;
pub mod model;
pub mod studio;
pub mod telemetry;

pub use compositor::{Compositor, ExportArtifact, ExportFormat, ExportQuality};
pub use config::StudioConfig;
pub use constraints::{ConstraintEngine, Severity, ValidationResult, Violation};
pub use error::{Result, StudioError};
pub use generation::{GenerationOrchestrator, ImageSynthesizer};
pub use history::History;
pub use model::{BrandKit, Layer, Operation, Project};
pub use studio::{Applied, ProjectSession};
