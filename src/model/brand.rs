//! Brand Kit
//!
//! The constraint authority for one brand identity. Rule fields are read-only
//! inputs to validation; nothing in this crate mutates a brand kit.

use serde::{Deserialize, Serialize};

/// Category of a brand asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Logo,
    Icon,
    Watermark,
    Pattern,
}

/// A fixed brand asset such as a logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandAsset {
    pub id: String,
    /// Display name, e.g. "Primary Logo".
    pub name: String,
    pub src: String,
    #[serde(rename = "type")]
    pub category: AssetCategory,
    /// Never render smaller than this (px).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<f64>,
}

/// The three named font roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandFonts {
    pub heading: String,
    pub body: String,
    pub accent: String,
}

impl BrandFonts {
    pub fn all(&self) -> [&str; 3] {
        [&self.heading, &self.body, &self.accent]
    }

    /// Exact match against one of the three roles.
    pub fn contains(&self, family: &str) -> bool {
        self.all().contains(&family)
    }
}

/// Where the logo is expected to sit; drives the clear-space prompt clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoZone {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    Custom,
}

impl LogoZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogoZone::TopLeft => "top-left",
            LogoZone::TopRight => "top-right",
            LogoZone::BottomLeft => "bottom-left",
            LogoZone::BottomRight => "bottom-right",
            LogoZone::Center => "center",
            LogoZone::Custom => "custom",
        }
    }
}

/// Palette enforcement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Only palette colours are allowed.
    Strict,
    /// Palette colours are recommended.
    #[default]
    Suggest,
}

/// Rule record of a brand kit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRules {
    /// Logo is never smaller than this (px).
    pub logo_min_size: f64,
    pub logo_zone: LogoZone,
    pub color_mode: ColorMode,
    /// Logo z must stay above every generated layer.
    pub logo_always_on_top: bool,
    /// Minimum clear space around the logo as a fraction of logo size.
    #[serde(default)]
    pub clear_space_ratio: f64,
}

impl Default for BrandRules {
    fn default() -> Self {
        Self {
            logo_min_size: 0.0,
            logo_zone: LogoZone::Custom,
            color_mode: ColorMode::Suggest,
            logo_always_on_top: false,
            clear_space_ratio: 0.0,
        }
    }
}

/// Palette, fonts, assets and rules for one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKit {
    pub id: String,
    pub name: String,
    /// Hex colours, ordered by priority.
    pub palette: Vec<String>,
    pub fonts: BrandFonts,
    #[serde(default, alias = "logos")]
    pub assets: Vec<BrandAsset>,
    #[serde(default)]
    pub rules: BrandRules,
}

impl BrandKit {
    /// Case-insensitive palette membership.
    pub fn palette_contains(&self, color: &str) -> bool {
        self.palette.iter().any(|c| c.eq_ignore_ascii_case(color))
    }

    pub fn asset(&self, id: &str) -> Option<&BrandAsset> {
        self.assets.iter().find(|a| a.id == id)
    }
}
