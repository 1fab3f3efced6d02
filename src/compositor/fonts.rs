//! Font Book
//!
//! Registered font faces keyed by family and weight, rasterized with
//! `ab_glyph`. A family lookup picks the registered weight closest to the
//! requested one; unknown families fall back to the configured fallback
//! family, if any.

use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::surface::blend_color;
use super::text::Typesetter;
use crate::error::{Result, StudioError};
use crate::model::{Point, TextStyle};

#[derive(Default, Clone)]
pub struct FontBook {
    faces: HashMap<String, Vec<(u16, FontArc)>>,
    fallback: Option<String>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `family` for text whose own family is not registered.
    pub fn with_fallback(mut self, family: impl Into<String>) -> Self {
        self.fallback = Some(family.into());
        self
    }

    /// Register a TrueType/OpenType face from raw bytes.
    pub fn register(&mut self, family: impl Into<String>, weight: u16, data: Vec<u8>) -> Result<()> {
        let family = family.into();
        let font = FontArc::try_from_vec(data).map_err(|e| StudioError::InvalidRequest {
            reason: format!("font data for \"{}\" is not a valid font: {}", family, e),
        })?;
        debug!(family = %family, weight, "registered font face");

        let faces = self.faces.entry(family).or_default();
        faces.retain(|(w, _)| *w != weight);
        faces.push((weight, font));
        faces.sort_by_key(|(w, _)| *w);
        Ok(())
    }

    /// Register a face from a font file.
    pub fn register_file(&mut self, family: impl Into<String>, weight: u16, path: &Path) -> Result<()> {
        let data = std::fs::read(path)?;
        self.register(family, weight, data)
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.faces.contains_key(family)
    }

    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.faces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Face for `family` at the registered weight nearest to `weight`.
    fn face(&self, family: &str, weight: u16) -> Result<&FontArc> {
        let faces = self
            .faces
            .get(family)
            .or_else(|| self.fallback.as_ref().and_then(|f| self.faces.get(f)))
            .ok_or_else(|| StudioError::FontUnavailable {
                family: family.to_string(),
            })?;

        faces
            .iter()
            .min_by_key(|(w, _)| (i32::from(*w) - i32::from(weight)).abs())
            .map(|(_, font)| font)
            .ok_or_else(|| StudioError::FontUnavailable {
                family: family.to_string(),
            })
    }
}

/// Pixel scale at which one em equals `font_size` pixels.
fn em_scale(font: &FontArc, font_size: f64) -> PxScale {
    let size = font_size as f32;
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(size * font.height_unscaled() / upem),
        _ => PxScale::from(size),
    }
}

/// Glyphs with their caret offsets, plus the total advance.
fn glyph_run(font: &FontArc, scale: PxScale, text: &str) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let mut run = Vec::with_capacity(text.len());

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        run.push((id, caret));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }
    (run, caret)
}

impl Typesetter for FontBook {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<f64> {
        let font = self.face(&style.font_family, style.font_weight)?;
        let (_, advance) = glyph_run(font, em_scale(font, style.font_size), text);
        Ok(advance as f64)
    }

    fn draw_line(
        &self,
        target: &mut RgbaImage,
        text: &str,
        style: &TextStyle,
        origin: Point,
        color: Rgba<u8>,
    ) -> Result<()> {
        let font = self.face(&style.font_family, style.font_weight)?;
        let scale = em_scale(font, style.font_size);
        let baseline = origin.y as f32 + font.as_scaled(scale).ascent();
        let (width, height) = (target.width() as i64, target.height() as i64);

        let (run, _) = glyph_run(font, scale, text);
        for (id, x) in run {
            let glyph = id.with_scale_and_position(scale, point(origin.x as f32 + x, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px >= 0 && py >= 0 && px < width && py < height {
                    blend_color(target.get_pixel_mut(px as u32, py as u32), color, coverage as f64);
                }
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families())
            .field("fallback", &self.fallback)
            .finish()
    }
}
