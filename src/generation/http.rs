//! HTTP synthesis client
//!
//! Posts `{prompt, model, width, height}` to a generation endpoint and reads
//! back either `{url}` or `{images: [{url}, ...]}`. Requires the `http`
//! feature; without it every call fails with a configuration error.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "http")]
use serde::Deserialize;
#[cfg(feature = "http")]
use tracing::{debug, warn};

use super::synth::{ImageSynthesizer, SynthesisRequest, SynthesisResponse};
use crate::error::{Result, StudioError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

#[cfg(feature = "http")]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EndpointReply {
    Single { url: String },
    Batch { images: Vec<SynthesisResponse> },
}

#[derive(Debug, Clone)]
pub struct HttpSynthesizer {
    endpoint: String,
    timeout: Duration,
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl HttpSynthesizer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            #[cfg(feature = "http")]
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cfg(feature = "http")]
    async fn send_request(&self, request: &SynthesisRequest) -> Result<SynthesisResponse> {
        let timeout_ms = self.timeout.as_millis() as u64;
        debug!(endpoint = %self.endpoint, model = %request.model, "posting generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StudioError::Timeout {
                        operation: "generation request".to_string(),
                        timeout_ms,
                    }
                } else if e.is_connect() {
                    StudioError::GenerationFailed {
                        reason: format!("cannot connect to {}: {}", self.endpoint, e),
                    }
                } else {
                    StudioError::GenerationFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            warn!(endpoint = %self.endpoint, ?retry_after_secs, "generation rate limited");
            return Err(StudioError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(StudioError::GenerationFailed {
                reason: format!("endpoint returned {}", status),
            });
        }

        let reply = response
            .json::<EndpointReply>()
            .await
            .map_err(|e| StudioError::GenerationFailed {
                reason: format!("invalid response from endpoint: {}", e),
            })?;

        match reply {
            EndpointReply::Single { url } => Ok(SynthesisResponse { url }),
            EndpointReply::Batch { images } => {
                images
                    .into_iter()
                    .next()
                    .ok_or_else(|| StudioError::GenerationFailed {
                        reason: "endpoint returned no images".to_string(),
                    })
            }
        }
    }

    #[cfg(not(feature = "http"))]
    async fn send_request(&self, _request: &SynthesisRequest) -> Result<SynthesisResponse> {
        Err(StudioError::Config {
            reason: format!(
                "HTTP generation not compiled; rebuild with --features http to use {}",
                self.endpoint
            ),
        })
    }
}

#[async_trait]
impl ImageSynthesizer for HttpSynthesizer {
    fn name(&self) -> &str {
        "http"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResponse> {
        self.send_request(request).await
    }
}
