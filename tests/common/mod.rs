//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use brandcanvas::compositor::{encode, ExportFormat, ExportQuality};
use brandcanvas::model::{
    AssetCategory, BrandAsset, BrandFonts, BrandKit, BrandRules, CanvasSize, ColorMode, LogoZone,
    Project,
};

pub const LOGO_SRC: &str = "assets/logo.png";

/// Acme kit: strict palette, 200px logo minimum, logo kept on top.
pub fn acme_kit() -> BrandKit {
    BrandKit {
        id: "acme".to_string(),
        name: "Acme".to_string(),
        palette: vec![
            "#FF5500".to_string(),
            "#111111".to_string(),
            "#FFFFFF".to_string(),
        ],
        fonts: BrandFonts {
            heading: "Montserrat".to_string(),
            body: "Inter".to_string(),
            accent: "Playfair Display".to_string(),
        },
        assets: vec![BrandAsset {
            id: "primary-logo".to_string(),
            name: "Primary Logo".to_string(),
            src: LOGO_SRC.to_string(),
            category: AssetCategory::Logo,
            min_size: Some(120.0),
        }],
        rules: BrandRules {
            logo_min_size: 200.0,
            logo_zone: LogoZone::TopRight,
            color_mode: ColorMode::Strict,
            logo_always_on_top: true,
            clear_space_ratio: 0.1,
        },
    }
}

pub fn acme_project(w: u32, h: u32) -> Project {
    Project::new("Launch", CanvasSize::new(w, h), Arc::new(acme_kit()))
}

/// PNG bytes of a solid `w`x`h` image.
pub fn solid_png(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, Rgba(color));
    encode(&img, ExportFormat::Png, ExportQuality::High).expect("png encodes")
}

pub fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).expect("decodes").to_rgba8()
}
