//! Brand Rules
//!
//! Each rule looks at one operation against the current layer stack and the
//! brand kit, and returns zero or more violations. Rules ignore operations
//! they do not govern.

use crate::model::{BrandKit, ColorMode, Layer, Operation, Size};

use super::violation::Violation;

/// Read-only view a rule checks against.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub layers: &'a [Layer],
    pub kit: &'a BrandKit,
}

impl<'a> RuleContext<'a> {
    pub fn new(layers: &'a [Layer], kit: &'a BrandKit) -> Self {
        Self { layers, kit }
    }

    pub fn layer(&self, id: &str) -> Option<&'a Layer> {
        self.layers.iter().find(|l| l.id == id)
    }
}

/// A single brand rule.
pub trait BrandRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation>;
}

/// REORDER: a brand asset may not drop to or below any generated image.
pub struct LogoAlwaysOnTop;

impl BrandRule for LogoAlwaysOnTop {
    fn name(&self) -> &'static str {
        "logo-always-on-top"
    }

    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation> {
        let Operation::Reorder { layer_id, new_z } = op else {
            return vec![];
        };
        if !ctx.kit.rules.logo_always_on_top {
            return vec![];
        }
        let Some(layer) = ctx.layer(layer_id) else {
            return vec![];
        };
        if !layer.is_asset() {
            return vec![];
        }

        let max_generated_z = ctx
            .layers
            .iter()
            .filter(|l| l.is_image() && l.id != *layer_id)
            .map(|l| l.z)
            .fold(-1.0_f64, f64::max);

        if *new_z <= max_generated_z {
            vec![Violation::error(
                self.name(),
                format!(
                    "Logo \"{}\" cannot be placed behind generated imagery",
                    layer.display_name()
                ),
            )
            .with_fix(Operation::Reorder {
                layer_id: layer_id.clone(),
                new_z: max_generated_z + 1.0,
            })]
        } else {
            vec![]
        }
    }
}

/// TRANSFORM: in strict mode, text colours must come from the palette.
pub struct StrictPalette;

impl BrandRule for StrictPalette {
    fn name(&self) -> &'static str {
        "strict-palette"
    }

    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation> {
        let Operation::Transform { changes, .. } = op else {
            return vec![];
        };
        let Some(color) = changes.color() else {
            return vec![];
        };
        if ctx.kit.rules.color_mode != ColorMode::Strict || ctx.kit.palette_contains(color) {
            return vec![];
        }
        vec![Violation::error(
            self.name(),
            format!("Color {} is not in the brand palette", color),
        )]
    }
}

/// TRANSFORM: fonts outside the three brand roles are allowed with a warning.
pub struct BrandFonts;

impl BrandRule for BrandFonts {
    fn name(&self) -> &'static str {
        "brand-fonts"
    }

    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation> {
        let Operation::Transform { changes, .. } = op else {
            return vec![];
        };
        let Some(family) = changes.font_family() else {
            return vec![];
        };
        if ctx.kit.fonts.contains(family) {
            return vec![];
        }
        vec![Violation::warning(
            self.name(),
            format!(
                "Font \"{}\" is not in the brand kit. Use: {}",
                family,
                ctx.kit.fonts.all().join(", ")
            ),
        )]
    }
}

/// Target asset layer and new size of a resizing TRANSFORM.
fn resized_asset<'a>(ctx: &RuleContext<'a>, op: &Operation) -> Option<(&'a Layer, Size)> {
    let Operation::Transform { layer_id, changes } = op else {
        return None;
    };
    let size = changes.size?;
    let layer = ctx.layer(layer_id)?;
    layer.is_asset().then_some((layer, size))
}

/// TRANSFORM: asset layers never shrink below the kit's logo minimum.
pub struct LogoMinSize;

impl BrandRule for LogoMinSize {
    fn name(&self) -> &'static str {
        "logo-min-size"
    }

    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation> {
        let Some((_, size)) = resized_asset(ctx, op) else {
            return vec![];
        };
        let min = ctx.kit.rules.logo_min_size;
        if size.min_dim() < min {
            vec![Violation::error(
                self.name(),
                format!("Logo cannot be smaller than {}px", min),
            )]
        } else {
            vec![]
        }
    }
}

/// TRANSFORM: asset layers respect their own brand asset's `minSize`.
pub struct AssetMinSize;

impl BrandRule for AssetMinSize {
    fn name(&self) -> &'static str {
        "asset-min-size"
    }

    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation> {
        let Some((layer, size)) = resized_asset(ctx, op) else {
            return vec![];
        };
        let Some(asset) = layer.asset_id().and_then(|id| ctx.kit.asset(id)) else {
            return vec![];
        };
        match asset.min_size {
            Some(min) if size.min_dim() < min => vec![Violation::error(
                self.name(),
                format!("Asset \"{}\" cannot be smaller than {}px", asset.name, min),
            )],
            _ => vec![],
        }
    }
}

/// GENERATE: generated imagery should sit behind every brand asset.
///
/// One warning per conflicting asset, each suggesting a move to just below it.
pub struct GeneratedBehindBrand;

impl BrandRule for GeneratedBehindBrand {
    fn name(&self) -> &'static str {
        "generated-behind-brand"
    }

    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation> {
        let Operation::Generate { layer_id, .. } = op else {
            return vec![];
        };
        if !ctx.kit.rules.logo_always_on_top {
            return vec![];
        }
        let Some(layer) = ctx.layer(layer_id) else {
            return vec![];
        };

        ctx.layers
            .iter()
            .filter(|l| l.is_asset() && layer.z >= l.z)
            .map(|logo| {
                Violation::warning(
                    self.name(),
                    format!(
                        "Generated image must stay behind brand asset \"{}\"",
                        logo.display_name()
                    ),
                )
                .with_fix(Operation::Reorder {
                    layer_id: layer_id.clone(),
                    new_z: logo.z - 1.0,
                })
            })
            .collect()
    }
}

/// REMOVE: locked layers cannot be removed.
pub struct LockedLayer;

impl BrandRule for LockedLayer {
    fn name(&self) -> &'static str {
        "locked-layer"
    }

    fn check(&self, ctx: &RuleContext<'_>, op: &Operation) -> Vec<Violation> {
        let Operation::Remove { layer_id } = op else {
            return vec![];
        };
        match ctx.layer(layer_id) {
            Some(layer) if layer.locked => vec![Violation::error(
                self.name(),
                format!("Layer \"{}\" is locked and cannot be removed", layer_id),
            )],
            _ => vec![],
        }
    }
}

/// The built-in rule set in evaluation order.
pub fn default_rules() -> Vec<Box<dyn BrandRule>> {
    vec![
        Box::new(LogoAlwaysOnTop),
        Box::new(StrictPalette),
        Box::new(BrandFonts),
        Box::new(LogoMinSize),
        Box::new(AssetMinSize),
        Box::new(GeneratedBehindBrand),
        Box::new(LockedLayer),
    ]
}
