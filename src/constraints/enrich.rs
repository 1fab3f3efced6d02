//! Prompt enrichment: brand context appended to generation prompts.

use crate::model::{BrandKit, LogoZone};

/// Number of palette colours mentioned in an enriched prompt.
pub const PROMPT_PALETTE_COLORS: usize = 4;

/// Fixed style clause closing every enriched prompt.
pub const BRAND_STYLE_SUFFIX: &str = "Style: professional, brand-consistent";

/// Append palette, logo clear-space and style context to `prompt`.
///
/// Pure: the same inputs always produce the same string. The clear-space
/// clause is omitted for the `custom` logo zone.
pub fn enrich_prompt(prompt: &str, kit: &BrandKit) -> String {
    let palette = kit
        .palette
        .iter()
        .take(PROMPT_PALETTE_COLORS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let clear_space = match kit.rules.logo_zone {
        LogoZone::Custom => String::new(),
        zone => format!(
            "Leave clear space at {} for logo placement",
            zone.as_str().replacen('-', " ", 1)
        ),
    };

    [
        prompt.to_string(),
        format!("Color palette to harmonize with: {}", palette),
        clear_space,
        BRAND_STYLE_SUFFIX.to_string(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(". ")
}
