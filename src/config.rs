//! Configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Environment variables override file values.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compositor::{ExportFormat, ExportQuality, DEFAULT_RESOLVE_TIMEOUT_MS};
use crate::error::{Result, StudioError};
use crate::generation::{DEFAULT_MODEL, DEFAULT_TIMEOUT_MS};

pub const ENV_GENERATION_URL: &str = "BRANDCANVAS_GENERATION_URL";
pub const ENV_GENERATION_MODEL: &str = "BRANDCANVAS_GENERATION_MODEL";
pub const ENV_GENERATION_TIMEOUT_MS: &str = "BRANDCANVAS_GENERATION_TIMEOUT_MS";
pub const ENV_EXPORT_TIMEOUT_MS: &str = "BRANDCANVAS_EXPORT_TIMEOUT_MS";
pub const ENV_HISTORY_MAX_DEPTH: &str = "BRANDCANVAS_HISTORY_MAX_DEPTH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationSettings {
    /// HTTP synthesis endpoint. Unset means the offline mock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub quality: ExportQuality,
    pub resolve_timeout_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: ExportQuality::High,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
        }
    }
}

impl ExportSettings {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Undo steps kept per project. Unset keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioConfig {
    pub generation: GenerationSettings,
    pub export: ExportSettings,
    pub history: HistorySettings,
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| StudioError::Config {
        reason: format!("{} must be a non-negative integer, got '{}'", name, value),
    })
}

impl StudioConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StudioError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| StudioError::Config {
            reason: format!("invalid config {}: {}", path.display(), e),
        })
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Override fields from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Override fields from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_GENERATION_URL).filter(|v| !v.trim().is_empty()) {
            self.generation.endpoint = Some(url);
        }
        if let Some(model) = lookup(ENV_GENERATION_MODEL).filter(|v| !v.trim().is_empty()) {
            self.generation.model = model;
        }
        if let Some(value) = lookup(ENV_GENERATION_TIMEOUT_MS) {
            self.generation.timeout_ms = parse_env(ENV_GENERATION_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_EXPORT_TIMEOUT_MS) {
            self.export.resolve_timeout_ms = parse_env(ENV_EXPORT_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_HISTORY_MAX_DEPTH) {
            self.history.max_depth = Some(parse_env(ENV_HISTORY_MAX_DEPTH, &value)?);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: StudioConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.generation.model, "gemini-3-pro-image-preview");
        assert_eq!(config.generation.timeout_ms, 120_000);
        assert_eq!(config.export.resolve_timeout_ms, 30_000);
        assert_eq!(config.history.max_depth, None);
    }

    #[test]
    fn test_partial_json() {
        let config: StudioConfig = serde_json::from_str(
            r#"{ "export": { "format": "webp" }, "history": { "maxDepth": 50 } }"#,
        )
        .unwrap();
        assert_eq!(config.export.format, ExportFormat::Webp);
        assert_eq!(config.export.quality, ExportQuality::High);
        assert_eq!(config.history.max_depth, Some(50));
    }

    #[test]
    fn test_env_overrides() {
        let config = StudioConfig::default()
            .apply_overrides(lookup(&[
                (ENV_GENERATION_URL, "http://localhost:8080/api/studio/generate"),
                (ENV_GENERATION_TIMEOUT_MS, "5000"),
                (ENV_HISTORY_MAX_DEPTH, "20"),
            ]))
            .unwrap();
        assert_eq!(
            config.generation.endpoint.as_deref(),
            Some("http://localhost:8080/api/studio/generate")
        );
        assert_eq!(config.generation.timeout(), Duration::from_secs(5));
        assert_eq!(config.history.max_depth, Some(20));
    }

    #[test]
    fn test_bad_env_number() {
        let err = StudioConfig::default()
            .apply_overrides(lookup(&[(ENV_EXPORT_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains(ENV_EXPORT_TIMEOUT_MS));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("studio.json");
        std::fs::write(&path, r#"{ "generation": { "model": "custom-model" } }"#).unwrap();
        let config = StudioConfig::load(&path).unwrap();
        assert_eq!(config.generation.model, "custom-model");

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(StudioConfig::load(&path).unwrap_err().error_code(), "CONFIG_ERROR");
    }
}
