//! Layers
//!
//! A layer is one visual element of a design. The variant-specific payload
//! lives in [`LayerContent`] so an image layer can never carry text styling
//! and a text layer can never carry an image source.

use serde::{Deserialize, Serialize};

/// Identifier of a layer within a project.
pub type LayerId = String;

/// Position in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// The smaller of the two dimensions.
    pub fn min_dim(&self) -> f64 {
        self.w.min(self.h)
    }
}

/// Layer type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    /// Raster imagery, usually generated.
    Image,
    /// Fixed brand asset (logo, icon, watermark, pattern). Never generated.
    Asset,
    /// Literal text.
    Text,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Image => write!(f, "image"),
            LayerType::Asset => write!(f, "asset"),
            LayerType::Text => write!(f, "text"),
        }
    }
}

/// Horizontal text alignment within the layer box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text styling. Family and colour are expected to come from the brand kit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    pub color: String,
    #[serde(default)]
    pub align: TextAlign,
}

fn default_font_weight() -> u16 {
    400
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f64, color: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            font_weight: default_font_weight(),
            color: color.into(),
            align: TextAlign::Left,
        }
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.3
    }
}

/// Payload of an image layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    /// Image URL or data URI.
    pub src: String,
    /// Prompt the image was generated from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Model that generated the image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_model: Option<String>,
}

/// Payload of a brand asset layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetContent {
    pub src: String,
    /// Reference into the brand kit's asset list.
    pub asset_id: String,
    #[serde(default = "default_preserve_aspect")]
    pub preserve_aspect: bool,
}

fn default_preserve_aspect() -> bool {
    true
}

/// Payload of a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub style: TextStyle,
}

/// Variant-specific layer payload, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerContent {
    Image(ImageContent),
    Asset(AssetContent),
    Text(TextContent),
}

impl LayerContent {
    pub fn layer_type(&self) -> LayerType {
        match self {
            LayerContent::Image(_) => LayerType::Image,
            LayerContent::Asset(_) => LayerType::Asset,
            LayerContent::Text(_) => LayerType::Text,
        }
    }

    /// Raster source for image and asset layers.
    pub fn source(&self) -> Option<&str> {
        match self {
            LayerContent::Image(image) => Some(&image.src),
            LayerContent::Asset(asset) => Some(&asset.src),
            LayerContent::Text(_) => None,
        }
    }
}

/// Geometry and flags shared by every layer, plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    /// Stacking key. Lower values are painted first. Need not be contiguous.
    pub z: f64,
    pub position: Point,
    pub size: Size,
    /// Degrees, clockwise, about the layer's center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(flatten)]
    pub content: LayerContent,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

impl Layer {
    pub fn layer_type(&self) -> LayerType {
        self.content.layer_type()
    }

    pub fn is_image(&self) -> bool {
        matches!(self.content, LayerContent::Image(_))
    }

    pub fn is_asset(&self) -> bool {
        matches!(self.content, LayerContent::Asset(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.content, LayerContent::Text(_))
    }

    pub fn source(&self) -> Option<&str> {
        self.content.source()
    }

    /// Brand asset id for asset layers.
    pub fn asset_id(&self) -> Option<&str> {
        match &self.content {
            LayerContent::Asset(asset) => Some(&asset.asset_id),
            _ => None,
        }
    }

    /// Geometric center, the pivot for rotation.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.w / 2.0,
            self.position.y + self.size.h / 2.0,
        )
    }

    /// Name used in user-facing messages: the asset id for brand assets,
    /// otherwise the layer id.
    pub fn display_name(&self) -> &str {
        self.asset_id().unwrap_or(&self.id)
    }
}

/// A layer that has not been assigned an id yet. Carried by ADD operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDraft {
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(flatten)]
    pub content: LayerContent,
}

impl LayerDraft {
    fn with_content(content: LayerContent, size: Size) -> Self {
        Self {
            z: 0.0,
            position: Point::default(),
            size,
            rotation: 0.0,
            opacity: 1.0,
            locked: false,
            visible: true,
            content,
        }
    }

    /// Image layer drawn from `src`.
    pub fn image(src: impl Into<String>, size: Size) -> Self {
        Self::with_content(
            LayerContent::Image(ImageContent {
                src: src.into(),
                prompt: None,
                generation_model: None,
            }),
            size,
        )
    }

    /// Image layer produced by a generation call.
    pub fn generated(
        src: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
        size: Size,
    ) -> Self {
        Self::with_content(
            LayerContent::Image(ImageContent {
                src: src.into(),
                prompt: Some(prompt.into()),
                generation_model: Some(model.into()),
            }),
            size,
        )
    }

    /// Brand asset layer referencing `asset_id` in the brand kit.
    pub fn asset(asset_id: impl Into<String>, src: impl Into<String>, size: Size) -> Self {
        Self::with_content(
            LayerContent::Asset(AssetContent {
                src: src.into(),
                asset_id: asset_id.into(),
                preserve_aspect: true,
            }),
            size,
        )
    }

    pub fn text(text: impl Into<String>, style: TextStyle, size: Size) -> Self {
        Self::with_content(
            LayerContent::Text(TextContent {
                text: text.into(),
                style,
            }),
            size,
        )
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn layer_type(&self) -> LayerType {
        self.content.layer_type()
    }

    /// Turn the draft into a layer with the given id.
    pub fn into_layer(self, id: impl Into<LayerId>) -> Layer {
        Layer {
            id: id.into(),
            z: self.z,
            position: self.position,
            size: self.size,
            rotation: self.rotation,
            opacity: self.opacity.clamp(0.0, 1.0),
            locked: self.locked,
            visible: self.visible,
            content: self.content,
        }
    }
}
