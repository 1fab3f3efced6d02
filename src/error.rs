//! Error handling for Brandcanvas
//!
//! Brand-rule violations are not errors: they travel as data inside a
//! [`ValidationResult`](crate::constraints::ValidationResult). The variants
//! here cover resolution, rendering and generation failures that callers must
//! handle.

use thiserror::Error;

/// Result type alias for Brandcanvas operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Main error type for Brandcanvas operations
#[derive(Error, Debug)]
pub enum StudioError {
    // Model Errors
    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    #[error("Invalid project: {reason}")]
    InvalidProject { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Invalid color: {value}")]
    InvalidColor { value: String },

    // Export Errors
    #[error("Failed to resolve image source {source_ref}: {reason}")]
    ResourceResolution { source_ref: String, reason: String },

    #[error("Failed to decode image from {source_ref}: {reason}")]
    ImageDecode { source_ref: String, reason: String },

    #[error("Font not available: {family}")]
    FontUnavailable { family: String },

    #[error("Failed to encode {format}: {reason}")]
    Encode { format: String, reason: String },

    // Generation Errors
    #[error("Generation rate limited, retry later")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Generation failed: {reason}")]
    GenerationFailed { reason: String },

    #[error("All {attempted} variations failed: {}", .reasons.join("; "))]
    VariationsFailed {
        attempted: usize,
        reasons: Vec<String>,
    },

    // Control Flow
    #[error("{operation} cancelled")]
    Cancelled { operation: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StudioError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StudioError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            StudioError::InvalidProject { .. } => "INVALID_PROJECT",
            StudioError::InvalidRequest { .. } => "INVALID_REQUEST",
            StudioError::InvalidColor { .. } => "INVALID_COLOR",
            StudioError::ResourceResolution { .. } => "RESOURCE_RESOLUTION",
            StudioError::ImageDecode { .. } => "IMAGE_DECODE",
            StudioError::FontUnavailable { .. } => "FONT_UNAVAILABLE",
            StudioError::Encode { .. } => "ENCODE_ERROR",
            StudioError::RateLimited { .. } => "RATE_LIMITED",
            StudioError::GenerationFailed { .. } => "GENERATION_FAILED",
            StudioError::VariationsFailed { .. } => "VARIATIONS_FAILED",
            StudioError::Cancelled { .. } => "CANCELLED",
            StudioError::Timeout { .. } => "TIMEOUT",
            StudioError::Config { .. } => "CONFIG_ERROR",
            StudioError::Io(_) => "IO_ERROR",
            StudioError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns true if the same request may succeed when retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StudioError::RateLimited { .. } | StudioError::Timeout { .. }
        )
    }

    /// Returns a user-facing recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StudioError::LayerNotFound { .. } => {
                Some("The layer may have been removed; refresh the layer list.")
            }
            StudioError::ResourceResolution { .. } | StudioError::ImageDecode { .. } => {
                Some("Check that every image and brand asset source is reachable, then export again.")
            }
            StudioError::FontUnavailable { .. } => {
                Some("Register the brand font with the font book or configure a fallback family.")
            }
            StudioError::RateLimited { .. } => Some("Rate limited. Try again in a moment."),
            StudioError::GenerationFailed { .. } | StudioError::VariationsFailed { .. } => {
                Some("Try a different prompt or model.")
            }
            StudioError::Timeout { .. } => Some("The service is slow to respond; try again."),
            _ => None,
        }
    }
}
