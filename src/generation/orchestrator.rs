//! Generation Orchestrator
//!
//! enrich prompt -> external synthesis -> ADD an image layer. The synthesis
//! call is the only suspension point. Nothing touches the project until a
//! call has succeeded, so a cancelled or failed generation leaves no trace.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::http::DEFAULT_TIMEOUT_MS;
use super::presets::{styled_prompt, MAX_VARIATIONS, STYLE_PRESETS};
use super::synth::{GenerationConfig, GenerationResult, ImageSynthesizer, SynthesisRequest};
use crate::constraints::{enrich_prompt, ValidationResult};
use crate::error::{Result, StudioError};
use crate::model::{BrandKit, LayerDraft, LayerId, Operation, Size};
use crate::studio::{Applied, ProjectSession};

/// A generation placed into a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedGeneration {
    pub result: GenerationResult,
    /// Outcome of the ADD that inserted the layer.
    pub applied: Applied,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<LayerId>,
    /// GENERATE checks on the placed layer; warnings only.
    pub placement: ValidationResult,
}

/// A variation that did not come back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationFailure {
    pub style: String,
    pub code: String,
    pub message: String,
}

/// Variation batch outcome. `results` follow preset order, not completion
/// order. A partial set is still a success.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationSet {
    pub results: Vec<GenerationResult>,
    pub failures: Vec<VariationFailure>,
}

impl VariationSet {
    pub fn requested(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

fn ensure_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(StudioError::InvalidRequest {
            reason: "Prompt is required".to_string(),
        });
    }
    Ok(())
}

pub struct GenerationOrchestrator {
    synthesizer: Arc<dyn ImageSynthesizer>,
    timeout: Duration,
}

impl GenerationOrchestrator {
    pub fn new(synthesizer: Arc<dyn ImageSynthesizer>) -> Self {
        Self {
            synthesizer,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Upper bound on a single synthesis call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn generate(
        &self,
        prompt: &str,
        kit: &BrandKit,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.generate_with_cancel(prompt, kit, config, &CancellationToken::new())
            .await
    }

    /// Enrich `prompt` with the brand context and call the synthesizer.
    pub async fn generate_with_cancel(
        &self,
        prompt: &str,
        kit: &BrandKit,
        config: &GenerationConfig,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        ensure_prompt(prompt)?;
        let started = Instant::now();
        let enriched = enrich_prompt(prompt, kit);
        let request = SynthesisRequest {
            prompt: enriched.clone(),
            model: config.model.clone(),
            width: config.width,
            height: config.height,
        };

        let call = tokio::time::timeout(self.timeout, self.synthesizer.synthesize(&request));
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(StudioError::Cancelled {
                    operation: "generation".to_string(),
                })
            }
            outcome = call => outcome.map_err(|_| StudioError::Timeout {
                operation: "generation".to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })??,
        };

        info!(
            synthesizer = self.synthesizer.name(),
            model = %config.model,
            style = config.style.as_deref().unwrap_or("-"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation complete"
        );

        Ok(GenerationResult {
            original_prompt: prompt.to_string(),
            enriched_prompt: enriched,
            image_url: response.url,
            model: config.model.clone(),
            style: config.style.clone(),
            timestamp: Utc::now(),
        })
    }

    /// Generate a background and place it into the session's project.
    pub async fn generate_into(
        &self,
        session: &mut ProjectSession,
        prompt: &str,
        config: &GenerationConfig,
        cancel: &CancellationToken,
    ) -> Result<PlacedGeneration> {
        let kit = Arc::clone(&session.project().brand_kit);
        let result = self.generate_with_cancel(prompt, &kit, config, cancel).await?;
        place_generated(session, result)
    }

    /// Up to [`MAX_VARIATIONS`] concurrent generations, one per style preset.
    pub async fn variations(
        &self,
        prompt: &str,
        kit: &BrandKit,
        config: &GenerationConfig,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<VariationSet> {
        if count == 0 {
            return Err(StudioError::InvalidRequest {
                reason: "variation count must be at least 1".to_string(),
            });
        }
        ensure_prompt(prompt)?;

        let presets = &STYLE_PRESETS[..count.min(MAX_VARIATIONS)];
        let calls = presets.iter().map(|(name, text)| {
            let styled = styled_prompt(prompt, text);
            let config = config.clone().with_style(*name);
            async move {
                let outcome = self.generate_with_cancel(&styled, kit, &config, cancel).await;
                (*name, outcome)
            }
        });
        let outcomes = join_all(calls).await;

        if cancel.is_cancelled() {
            return Err(StudioError::Cancelled {
                operation: "variation generation".to_string(),
            });
        }

        let mut set = VariationSet {
            results: Vec::new(),
            failures: Vec::new(),
        };
        let mut all_rate_limited = true;
        let mut retry_after: Option<u64> = None;

        for (style, outcome) in outcomes {
            match outcome {
                Ok(result) => set.results.push(result),
                Err(err) => {
                    warn!(style, error = %err, "variation failed");
                    match &err {
                        StudioError::RateLimited { retry_after_secs } => {
                            retry_after = retry_after.max(*retry_after_secs);
                        }
                        _ => all_rate_limited = false,
                    }
                    set.failures.push(VariationFailure {
                        style: style.to_string(),
                        code: err.error_code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        if set.results.is_empty() {
            return Err(if all_rate_limited {
                StudioError::RateLimited {
                    retry_after_secs: retry_after,
                }
            } else {
                StudioError::VariationsFailed {
                    attempted: set.failures.len(),
                    reasons: set.failures.iter().map(|f| f.message.clone()).collect(),
                }
            });
        }

        info!(
            succeeded = set.results.len(),
            failed = set.failures.len(),
            "variations complete"
        );
        Ok(set)
    }
}

impl std::fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field("synthesizer", &self.synthesizer.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Insert a completed generation as a full-canvas image layer at `z = 0`.
///
/// The layer goes in through the ordinary ADD path. GENERATE rules are then
/// evaluated against the placed layer so the caller can surface placement
/// warnings, such as imagery sitting in front of a logo.
pub fn place_generated(session: &mut ProjectSession, result: GenerationResult) -> Result<PlacedGeneration> {
    let canvas = session.project().canvas.clone();
    let draft = LayerDraft::generated(
        result.image_url.clone(),
        result.enriched_prompt.clone(),
        result.model.clone(),
        Size::new(canvas.w as f64, canvas.h as f64),
    )
    .with_z(0.0);

    let applied = session.apply(Operation::Add { layer: draft })?;
    let layer_id = applied.layer_id.clone();

    let placement = match &layer_id {
        Some(id) => session.validate(&Operation::Generate {
            layer_id: id.clone(),
            prompt: result.enriched_prompt.clone(),
            model: result.model.clone(),
            src: None,
        }),
        None => ValidationResult::ok(),
    };
    for violation in &placement.violations {
        warn!(rule = %violation.rule, "{}", violation.message);
    }

    Ok(PlacedGeneration {
        result,
        applied,
        layer_id,
        placement,
    })
}
