//! Mock synthesizer for offline use and tests
//!
//! Returns a solid-colour PNG data URI whose colour is derived from the
//! prompt, so the same prompt always yields the same image. Failures can be
//! scripted by prompt substring.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

use super::synth::{ImageSynthesizer, SynthesisRequest, SynthesisResponse};
use crate::compositor::{encode, encode_data_uri, ExportFormat, ExportQuality};
use crate::error::{Result, StudioError};

/// Largest edge of the mock raster. Layers stretch it to their box anyway.
const MAX_EDGE: u32 = 64;

/// Scripted failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    Failed,
}

#[derive(Debug, Default)]
pub struct MockSynthesizer {
    failures: Vec<(String, MockFailure)>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request whose prompt contains `needle`.
    pub fn fail_when(mut self, needle: impl Into<String>, failure: MockFailure) -> Self {
        self.failures.push((needle.into(), failure));
        self
    }

    /// Sleep before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of synthesize calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Colour the mock paints for `prompt`.
    pub fn color_for(prompt: &str) -> Rgba<u8> {
        let digest = Sha256::digest(prompt.as_bytes());
        Rgba([digest[0], digest[1], digest[2], 255])
    }
}

#[async_trait]
impl ImageSynthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some((_, failure)) = self
            .failures
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
        {
            return Err(match failure {
                MockFailure::RateLimited => StudioError::RateLimited {
                    retry_after_secs: Some(1),
                },
                MockFailure::Failed => StudioError::GenerationFailed {
                    reason: "mock failure".to_string(),
                },
            });
        }

        let raster = RgbaImage::from_pixel(
            request.width.clamp(1, MAX_EDGE),
            request.height.clamp(1, MAX_EDGE),
            Self::color_for(&request.prompt),
        );
        let png = encode(&raster, ExportFormat::Png, ExportQuality::High)?;
        Ok(SynthesisResponse {
            url: encode_data_uri(ExportFormat::Png.mime_type(), &png),
        })
    }
}
