//! Constraint Engine
//!
//! Brand rules that gate every structural operation, plus the prompt
//! enrichment used before generation requests.

mod engine;
mod enrich;
mod rules;
mod violation;

pub use engine::ConstraintEngine;
pub use enrich::{enrich_prompt, BRAND_STYLE_SUFFIX, PROMPT_PALETTE_COLORS};
pub use rules::{
    default_rules, AssetMinSize, BrandFonts, BrandRule, GeneratedBehindBrand, LockedLayer,
    LogoAlwaysOnTop, LogoMinSize, RuleContext, StrictPalette,
};
pub use violation::{Severity, ValidationResult, Violation};
