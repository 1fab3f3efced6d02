//! Generation
//!
//! Prompt enrichment, the external synthesis seam, and placement of results
//! as image layers.

mod http;
mod mock;
mod orchestrator;
mod presets;
mod synth;

pub use http::{HttpSynthesizer, DEFAULT_TIMEOUT_MS};
pub use mock::{MockFailure, MockSynthesizer};
pub use orchestrator::{
    place_generated, GenerationOrchestrator, PlacedGeneration, VariationFailure, VariationSet,
};
pub use presets::{style_preset, styled_prompt, DEFAULT_VARIATIONS, MAX_VARIATIONS, STYLE_PRESETS};
pub use synth::{
    GenerationConfig, GenerationResult, ImageSynthesizer, SynthesisRequest, SynthesisResponse,
    DEFAULT_MODEL, DEFAULT_SIZE,
};
