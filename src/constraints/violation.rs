//! Violations
//!
//! Rules produce violations; the engine folds them into a result. Nothing here
//! is persisted.

use serde::{Deserialize, Serialize};

use crate::model::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the operation.
    Error,
    /// Operation proceeds; the caller should surface the message.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One broken brand rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub message: String,
    pub severity: Severity,
    /// Suggested corrective operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Operation>,
}

impl Violation {
    pub fn error(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
            severity: Severity::Error,
            fix: None,
        }
    }

    pub fn warning(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
            severity: Severity::Warning,
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Operation) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of validating one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no violation has severity `error`.
    pub valid: bool,
    /// In rule-evaluation order, not deduplicated.
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: !violations.iter().any(Violation::is_error),
            violations,
        }
    }

    pub fn ok() -> Self {
        Self::from_violations(Vec::new())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_invalidate() {
        let result = ValidationResult::from_violations(vec![Violation::warning("brand-fonts", "w")]);
        assert!(result.valid);
        assert!(result.has_warnings());
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn test_any_error_invalidates() {
        let result = ValidationResult::from_violations(vec![
            Violation::warning("brand-fonts", "w"),
            Violation::error("strict-palette", "e"),
        ]);
        assert!(!result.valid);
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn test_violation_json_includes_fix() {
        let v = Violation::error("logo-always-on-top", "behind").with_fix(Operation::Reorder {
            layer_id: "logo".to_string(),
            new_z: 4.0,
        });
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["fix"]["type"], "REORDER");
        assert_eq!(json["fix"]["newZ"], 4.0);
    }
}
