//! Constraint Engine
//!
//! Runs every rule over an operation and folds the results. Validation is
//! synchronous and never mutates its inputs.

use tracing::debug;

use crate::model::{BrandKit, Layer, Operation, Project};

use super::rules::{default_rules, BrandRule, RuleContext};
use super::violation::ValidationResult;

pub struct ConstraintEngine {
    rules: Vec<Box<dyn BrandRule>>,
}

impl ConstraintEngine {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Engine with a custom rule list, evaluated in the given order.
    pub fn with_rules(rules: Vec<Box<dyn BrandRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate `op` against the project's live layers and brand kit.
    pub fn validate(&self, project: &Project, op: &Operation) -> ValidationResult {
        self.validate_layers(project.layers(), &project.brand_kit, op)
    }

    /// Validate `op` against an explicit layer snapshot.
    pub fn validate_layers(&self, layers: &[Layer], kit: &BrandKit, op: &Operation) -> ValidationResult {
        let ctx = RuleContext::new(layers, kit);
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(&ctx, op))
            .collect();

        let result = ValidationResult::from_violations(violations);
        debug!(
            operation = %op.kind(),
            valid = result.valid,
            violations = result.violations.len(),
            "validated operation"
        );
        result
    }
}

impl Default for ConstraintEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConstraintEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Severity, Violation};
    use crate::model::{BrandFonts, BrandRules, ColorMode, LayerDraft, LayerPatch, Size};
    use std::sync::Arc;

    fn kit() -> BrandKit {
        BrandKit {
            id: "k".to_string(),
            name: "K".to_string(),
            palette: vec!["#FF0000".to_string(), "#00FF00".to_string()],
            fonts: BrandFonts {
                heading: "A".to_string(),
                body: "B".to_string(),
                accent: "C".to_string(),
            },
            assets: vec![],
            rules: BrandRules {
                color_mode: ColorMode::Strict,
                ..BrandRules::default()
            },
        }
    }

    #[test]
    fn test_transform_violations_in_rule_order() {
        let layers = vec![LayerDraft::image("a.png", Size::new(1.0, 1.0)).into_layer("a")];
        let op = Operation::Transform {
            layer_id: "a".to_string(),
            changes: LayerPatch::default()
                .with_color("#123456")
                .with_font_family("Papyrus"),
        };
        let result = ConstraintEngine::new().validate_layers(&layers, &kit(), &op);

        assert!(!result.valid);
        let rules: Vec<_> = result.violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["strict-palette", "brand-fonts"]);
        assert_eq!(result.violations[1].severity, Severity::Warning);
    }

    #[test]
    fn test_add_is_unconstrained() {
        let op = Operation::Add {
            layer: LayerDraft::image("a.png", Size::new(1.0, 1.0)),
        };
        let result = ConstraintEngine::new().validate_layers(&[], &kit(), &op);
        assert_eq!(result, ValidationResult::ok());
    }

    struct AlwaysWarn;

    impl BrandRule for AlwaysWarn {
        fn name(&self) -> &'static str {
            "always-warn"
        }

        fn check(&self, _ctx: &RuleContext<'_>, _op: &Operation) -> Vec<Violation> {
            vec![Violation::warning(self.name(), "heads up")]
        }
    }

    #[test]
    fn test_custom_rules() {
        let engine = ConstraintEngine::with_rules(vec![Box::new(AlwaysWarn)]);
        assert_eq!(engine.rule_names(), vec!["always-warn"]);

        let project = crate::model::Project::new(
            "p",
            crate::model::CanvasSize::new(10, 10),
            Arc::new(kit()),
        );
        let op = Operation::Remove {
            layer_id: "x".to_string(),
        };
        let result = engine.validate(&project, &op);
        assert!(result.valid);
        assert_eq!(result.violations.len(), 1);
    }
}
