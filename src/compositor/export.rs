//! Export Renderer
//!
//! Flattens a layer snapshot into one raster:
//!
//! 1. keep visible layers, stable-sorted by `z` ascending
//! 2. resolve every distinct image source concurrently
//! 3. decode, draw strictly in sorted order, then encode, all on the blocking
//!    pool
//!
//! Any unresolvable or undecodable source aborts the export. Cancellation or
//! timeout produces no output.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::color::parse_color;
use super::resolve::SourceResolver;
use super::surface::{draw_image, flatten, Placement};
use super::text::{layout_lines, Typesetter};
use crate::error::{Result, StudioError};
use crate::model::{CanvasSize, Layer, LayerContent, Point};
use crate::studio::LayerSnapshot;

/// Default per-source resolution timeout.
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 30_000;

const JPEG_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    /// Lossless formats ignore the quality setting.
    pub fn is_lossless(&self) -> bool {
        matches!(self, ExportFormat::Png)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            other => Err(StudioError::InvalidRequest {
                reason: format!("unknown export format '{}', expected png, jpeg or webp", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportQuality {
    Draft,
    Standard,
    #[default]
    High,
}

impl ExportQuality {
    /// Encoder quality in 0..=1.
    pub fn factor(&self) -> f64 {
        match self {
            ExportQuality::Draft => 0.6,
            ExportQuality::Standard => 0.85,
            ExportQuality::High => 1.0,
        }
    }

    /// JPEG quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.factor() * 100.0).round() as u8
    }

    /// Lossy WebP quality on libwebp's 0..=100 scale.
    pub fn webp_quality(&self) -> f32 {
        (self.factor() * 100.0) as f32
    }
}

impl std::fmt::Display for ExportQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportQuality::Draft => write!(f, "draft"),
            ExportQuality::Standard => write!(f, "standard"),
            ExportQuality::High => write!(f, "high"),
        }
    }
}

impl FromStr for ExportQuality {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(ExportQuality::Draft),
            "standard" => Ok(ExportQuality::Standard),
            "high" => Ok(ExportQuality::High),
            other => Err(StudioError::InvalidRequest {
                reason: format!(
                    "unknown export quality '{}', expected draft, standard or high",
                    other
                ),
            }),
        }
    }
}

/// Encoded export output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    /// Hex SHA-256 of `bytes`.
    pub sha256: String,
}

/// Visible layers in paint order. The sort is stable, so equal `z` keeps the
/// collection order.
pub fn draw_order(layers: &[Layer]) -> Vec<Layer> {
    let mut visible: Vec<Layer> = layers.iter().filter(|l| l.visible).cloned().collect();
    visible.sort_by(|a, b| a.z.total_cmp(&b.z));
    visible
}

/// Distinct non-empty raster sources in first-use order.
fn raster_sources(layers: &[Layer]) -> Vec<String> {
    let mut seen = HashSet::new();
    layers
        .iter()
        .filter_map(Layer::source)
        .filter(|src| !src.is_empty())
        .filter(|src| seen.insert(*src))
        .map(str::to_string)
        .collect()
}

/// Decode resolved bytes into RGBA rasters.
pub fn decode_sources(encoded: HashMap<String, Vec<u8>>) -> Result<HashMap<String, RgbaImage>> {
    encoded
        .into_iter()
        .map(|(source, bytes)| {
            let image = image::load_from_memory(&bytes).map_err(|e| StudioError::ImageDecode {
                source_ref: source.chars().take(64).collect(),
                reason: e.to_string(),
            })?;
            Ok((source, image.to_rgba8()))
        })
        .collect()
}

/// Paint `layers` in the given order onto a transparent canvas.
///
/// Callers pass layers already filtered and sorted by [`draw_order`].
pub fn render_layers(
    canvas: &CanvasSize,
    layers: &[Layer],
    images: &HashMap<String, RgbaImage>,
    typesetter: &dyn Typesetter,
) -> Result<RgbaImage> {
    if canvas.w == 0 || canvas.h == 0 {
        return Err(StudioError::InvalidProject {
            reason: format!("canvas has zero area ({}x{})", canvas.w, canvas.h),
        });
    }
    let mut surface = RgbaImage::new(canvas.w, canvas.h);

    for layer in layers {
        let placement = Placement::rect(layer.position.x, layer.position.y, layer.size.w, layer.size.h)
            .rotated_about(layer.center(), layer.rotation)
            .with_opacity(layer.opacity);

        match &layer.content {
            LayerContent::Image(_) | LayerContent::Asset(_) => {
                let Some(src) = layer.source().filter(|s| !s.is_empty()) else {
                    continue;
                };
                let image = images.get(src).ok_or_else(|| StudioError::ResourceResolution {
                    source_ref: src.chars().take(64).collect(),
                    reason: "source was not resolved".to_string(),
                })?;
                draw_image(&mut surface, image, &placement);
            }
            LayerContent::Text(text) => {
                if text.text.is_empty() {
                    continue;
                }
                let color = parse_color(&text.style.color)?;
                let lines = layout_lines(typesetter, &text.text, &text.style, layer.position, layer.size.w)?;

                // Text is drawn unrotated on its own canvas-sized sheet, then
                // composited with the layer's rotation and opacity.
                let mut sheet = RgbaImage::new(canvas.w, canvas.h);
                for line in &lines {
                    typesetter.draw_line(&mut sheet, &line.text, &text.style, Point::new(line.x, line.y), color)?;
                }
                let sheet_placement = Placement::rect(0.0, 0.0, canvas.w as f64, canvas.h as f64)
                    .rotated_about(layer.center(), layer.rotation)
                    .with_opacity(layer.opacity);
                draw_image(&mut surface, &sheet, &sheet_placement);
            }
        }
        debug!(layer = %layer.id, z = layer.z, kind = %layer.layer_type(), "drew layer");
    }

    Ok(surface)
}

/// Encode a rendered surface. PNG is lossless; JPEG and WebP are lossy at
/// the quality's factor.
pub fn encode(surface: &RgbaImage, format: ExportFormat, quality: ExportQuality) -> Result<Vec<u8>> {
    let (w, h) = surface.dimensions();
    let failed = |reason: String| StudioError::Encode {
        format: format.to_string(),
        reason,
    };
    let mut bytes = Vec::new();

    match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes)
            .write_image(surface.as_raw(), w, h, ExtendedColorType::Rgba8)
            .map_err(|e| failed(e.to_string()))?,
        ExportFormat::Jpeg => {
            let flat = flatten(surface, JPEG_BACKGROUND);
            JpegEncoder::new_with_quality(&mut bytes, quality.jpeg_quality())
                .write_image(flat.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(|e| failed(e.to_string()))?
        }
        ExportFormat::Webp => {
            let memory = webp::Encoder::from_rgba(surface.as_raw(), w, h)
                .encode_simple(false, quality.webp_quality())
                .map_err(|e| failed(format!("{:?}", e)))?;
            bytes.extend_from_slice(&memory);
        }
    }
    Ok(bytes)
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Resolves sources and renders snapshots.
#[derive(Clone)]
pub struct Compositor {
    resolver: Arc<dyn SourceResolver>,
    typesetter: Arc<dyn Typesetter>,
    resolve_timeout: Duration,
}

impl Compositor {
    pub fn new(resolver: Arc<dyn SourceResolver>, typesetter: Arc<dyn Typesetter>) -> Self {
        Self {
            resolver,
            typesetter,
            resolve_timeout: Duration::from_millis(DEFAULT_RESOLVE_TIMEOUT_MS),
        }
    }

    /// Per-source resolution timeout.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub async fn export(
        &self,
        snapshot: &LayerSnapshot,
        format: ExportFormat,
        quality: ExportQuality,
    ) -> Result<ExportArtifact> {
        self.export_with_cancel(snapshot, format, quality, &CancellationToken::new())
            .await
    }

    /// Export, aborting with `Cancelled` as soon as `cancel` fires.
    pub async fn export_with_cancel(
        &self,
        snapshot: &LayerSnapshot,
        format: ExportFormat,
        quality: ExportQuality,
        cancel: &CancellationToken,
    ) -> Result<ExportArtifact> {
        let started = Instant::now();
        let layers = draw_order(&snapshot.layers);
        let cancelled = || StudioError::Cancelled {
            operation: "export".to_string(),
        };

        let encoded = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            resolved = self.resolve_sources(&layers) => resolved?,
        };

        let canvas = snapshot.canvas.clone();
        let typesetter = Arc::clone(&self.typesetter);
        let job = tokio::task::spawn_blocking(move || {
            let images = decode_sources(encoded)?;
            let surface = render_layers(&canvas, &layers, &images, typesetter.as_ref())?;
            encode(&surface, format, quality)
        });

        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            joined = job => joined.map_err(|e| StudioError::Encode {
                format: format.to_string(),
                reason: format!("render task failed: {}", e),
            })??,
        };

        let artifact = ExportArtifact {
            sha256: sha256_hex(&bytes),
            bytes,
            format,
            width: snapshot.canvas.w,
            height: snapshot.canvas.h,
        };

        info!(
            format = %format,
            quality = %quality,
            layers = snapshot.layers.len(),
            bytes = artifact.bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "export complete"
        );
        Ok(artifact)
    }

    /// Fetch every distinct source concurrently. Drawing order is decided
    /// later, so completion order does not matter here.
    async fn resolve_sources(&self, layers: &[Layer]) -> Result<HashMap<String, Vec<u8>>> {
        let timeout_ms = self.resolve_timeout.as_millis() as u64;
        let fetches = raster_sources(layers).into_iter().map(|source| async move {
            let bytes = tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(&source))
                .await
                .map_err(|_| StudioError::Timeout {
                    operation: format!(
                        "resolving {}",
                        source.chars().take(64).collect::<String>()
                    ),
                    timeout_ms,
                })??;
            Ok::<_, StudioError>((source, bytes))
        });

        Ok(try_join_all(fetches).await?.into_iter().collect())
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("resolve_timeout", &self.resolve_timeout)
            .finish()
    }
}
