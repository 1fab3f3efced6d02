//! Synthesis collaborator
//!
//! The external image model sits behind [`ImageSynthesizer`]. This crate never
//! synthesizes pixels itself and never retries a failed call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default image model.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";

/// Default output edge length when no canvas size is given.
pub const DEFAULT_SIZE: u32 = 1080;

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub model: String,
    pub width: u32,
    pub height: u32,
    /// Style preset name, recorded on the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            style: None,
        }
    }
}

impl GenerationConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// Request sent to the synthesis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
}

/// Reference to the rendered image: a remote URL or a data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    pub url: String,
}

/// External image synthesis.
///
/// Implementations map a rate limit to `StudioError::RateLimited` and any
/// other failure to `StudioError::GenerationFailed`.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResponse>;
}

/// One completed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub original_prompt: String,
    pub enriched_prompt: String,
    pub image_url: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenerationConfig::default();
        assert_eq!(config.model, "gemini-3-pro-image-preview");
        assert_eq!((config.width, config.height), (1080, 1080));
        assert!(config.style.is_none());
    }

    #[test]
    fn test_result_json_shape() {
        let result = GenerationResult {
            original_prompt: "a".to_string(),
            enriched_prompt: "a. b".to_string(),
            image_url: "data:image/png;base64,".to_string(),
            model: DEFAULT_MODEL.to_string(),
            style: None,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["enrichedPrompt"], "a. b");
        assert!(json.get("style").is_none());
    }
}
