//! Data Model
//!
//! Entity definitions for projects, layers, brand kits and operations.

mod brand;
mod layer;
mod operation;
mod project;

pub use brand::{AssetCategory, BrandAsset, BrandFonts, BrandKit, BrandRules, ColorMode, LogoZone};
pub use layer::{
    AssetContent, ImageContent, Layer, LayerContent, LayerDraft, LayerId, LayerType, Point, Size,
    TextAlign, TextContent, TextStyle,
};
pub use operation::{LayerPatch, Operation, OperationKind, TextStylePatch};
pub use project::{canvas_preset, CanvasSize, Project, CANVAS_PRESETS};
