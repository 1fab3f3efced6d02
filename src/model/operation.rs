//! Operations
//!
//! Tagged requests to mutate a project. Operations are the only unit the
//! constraint engine validates; structural changes never bypass them.

use serde::{Deserialize, Serialize};

use super::layer::{LayerContent, LayerDraft, LayerId, Layer, Point, Size, TextAlign};

/// Operation discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Add,
    Remove,
    Reorder,
    Transform,
    Generate,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Add => write!(f, "ADD"),
            OperationKind::Remove => write!(f, "REMOVE"),
            OperationKind::Reorder => write!(f, "REORDER"),
            OperationKind::Transform => write!(f, "TRANSFORM"),
            OperationKind::Generate => write!(f, "GENERATE"),
        }
    }
}

/// A request to mutate a project's layer stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Operation {
    /// Insert a new layer. The id is assigned on apply.
    Add { layer: LayerDraft },
    Remove { layer_id: LayerId },
    Reorder { layer_id: LayerId, new_z: f64 },
    Transform { layer_id: LayerId, changes: LayerPatch },
    /// A completed generation placed on an image layer.
    Generate {
        layer_id: LayerId,
        prompt: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Add { .. } => OperationKind::Add,
            Operation::Remove { .. } => OperationKind::Remove,
            Operation::Reorder { .. } => OperationKind::Reorder,
            Operation::Transform { .. } => OperationKind::Transform,
            Operation::Generate { .. } => OperationKind::Generate,
        }
    }

    /// Layer the operation targets. ADD has none until applied.
    pub fn target(&self) -> Option<&str> {
        match self {
            Operation::Add { .. } => None,
            Operation::Remove { layer_id }
            | Operation::Reorder { layer_id, .. }
            | Operation::Transform { layer_id, .. }
            | Operation::Generate { layer_id, .. } => Some(layer_id),
        }
    }

    /// Short human-readable summary, stored as the history label.
    pub fn label(&self) -> String {
        match self {
            Operation::Add { layer } => format!("Add {} layer", layer.layer_type()),
            Operation::Remove { layer_id } => format!("Remove {}", layer_id),
            Operation::Reorder { layer_id, new_z } => format!("Move {} to z={}", layer_id, new_z),
            Operation::Transform { layer_id, .. } => format!("Transform {}", layer_id),
            Operation::Generate { layer_id, model, .. } => {
                format!("Generate {} with {}", layer_id, model)
            }
        }
    }
}

/// Partial text style change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
}

/// Partial field changes carried by TRANSFORM.
///
/// There is no `z` field: stacking changes go through REORDER. Fields that do
/// not belong to the target's variant are ignored when applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Image and asset layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Asset layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_aspect: Option<bool>,
    /// Text layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStylePatch>,
}

impl LayerPatch {
    pub fn color(&self) -> Option<&str> {
        self.style.as_ref().and_then(|s| s.color.as_deref())
    }

    pub fn font_family(&self) -> Option<&str> {
        self.style.as_ref().and_then(|s| s.font_family.as_deref())
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.size = Some(Size::new(w, h));
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.style.get_or_insert_with(Default::default).color = Some(color.into());
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.style.get_or_insert_with(Default::default).font_family = Some(family.into());
        self
    }

    /// Write the patch onto `layer`.
    pub fn apply_to(&self, layer: &mut Layer) {
        if let Some(position) = self.position {
            layer.position = position;
        }
        if let Some(size) = self.size {
            layer.size = size;
        }
        if let Some(rotation) = self.rotation {
            layer.rotation = rotation;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(locked) = self.locked {
            layer.locked = locked;
        }
        if let Some(visible) = self.visible {
            layer.visible = visible;
        }

        match &mut layer.content {
            LayerContent::Image(image) => {
                if let Some(src) = &self.src {
                    image.src = src.clone();
                }
            }
            LayerContent::Asset(asset) => {
                if let Some(src) = &self.src {
                    asset.src = src.clone();
                }
                if let Some(preserve) = self.preserve_aspect {
                    asset.preserve_aspect = preserve;
                }
            }
            LayerContent::Text(text) => {
                if let Some(content) = &self.text {
                    text.text = content.clone();
                }
                if let Some(style) = &self.style {
                    if let Some(family) = &style.font_family {
                        text.style.font_family = family.clone();
                    }
                    if let Some(size) = style.font_size {
                        text.style.font_size = size;
                    }
                    if let Some(weight) = style.font_weight {
                        text.style.font_weight = weight;
                    }
                    if let Some(color) = &style.color {
                        text.style.color = color.clone();
                    }
                    if let Some(align) = style.align {
                        text.style.align = align;
                    }
                }
            }
        }
    }
}
