//! Generation Tests
//!
//! Background generation and style variations against the offline
//! synthesizer.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use brandcanvas::compositor::{ChainResolver, Compositor, ExportFormat, ExportQuality, FontBook};
use brandcanvas::constraints::Severity;
use brandcanvas::generation::{
    GenerationConfig, GenerationOrchestrator, MockFailure, MockSynthesizer,
};
use brandcanvas::model::{LayerContent, LayerDraft, Operation, Size};
use brandcanvas::studio::ProjectSession;
use brandcanvas::StudioError;

use common::{acme_kit, acme_project, decode, LOGO_SRC};

fn orchestrator(mock: MockSynthesizer) -> (GenerationOrchestrator, Arc<MockSynthesizer>) {
    let mock = Arc::new(mock);
    (GenerationOrchestrator::new(mock.clone()), mock)
}

fn config() -> GenerationConfig {
    GenerationConfig::default().with_size(32, 32)
}

fn session_with_logo_at(z: f64) -> ProjectSession {
    let mut session = ProjectSession::new(acme_project(64, 64));
    let applied = session
        .apply(Operation::Add {
            layer: LayerDraft::asset("primary-logo", LOGO_SRC, Size::new(20.0, 20.0)).with_z(z),
        })
        .unwrap();
    assert!(applied.committed);
    session
}

#[tokio::test]
async fn test_generate_places_full_canvas_layer_at_bottom() {
    let (orchestrator, mock) = orchestrator(MockSynthesizer::new());
    let mut session = session_with_logo_at(5.0);

    let placed = orchestrator
        .generate_into(&mut session, "misty forest", &config(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(mock.calls(), 1);
    assert!(placed.applied.committed);
    assert!(placed.placement.violations.is_empty());

    let layer = session
        .project()
        .layer(placed.layer_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(layer.z, 0.0);
    assert_eq!(layer.size, Size::new(64.0, 64.0));
    match &layer.content {
        LayerContent::Image(image) => {
            assert!(image.src.starts_with("data:image/png;base64,"));
            assert_eq!(image.prompt.as_deref(), Some(placed.result.enriched_prompt.as_str()));
        }
        other => panic!("unexpected content {:?}", other),
    }
}

#[tokio::test]
async fn test_prompt_is_enriched_with_brand_context() {
    let (orchestrator, _) = orchestrator(MockSynthesizer::new());
    let result = orchestrator
        .generate("misty forest", &acme_kit(), &config())
        .await
        .unwrap();

    assert_eq!(result.original_prompt, "misty forest");
    assert!(result.enriched_prompt.starts_with("misty forest"));
    assert!(result.enriched_prompt.contains("#FF5500"));
    assert_ne!(result.enriched_prompt, result.original_prompt);
}

#[tokio::test]
async fn test_placement_warns_when_logo_is_not_above() {
    let (orchestrator, _) = orchestrator(MockSynthesizer::new());
    let mut session = session_with_logo_at(0.0);

    let placed = orchestrator
        .generate_into(&mut session, "misty forest", &config(), &CancellationToken::new())
        .await
        .unwrap();

    // Placement still commits; the conflict is reported as a warning.
    assert!(placed.applied.committed);
    assert!(placed.placement.valid);
    assert_eq!(placed.placement.violations.len(), 1);
    let warning = &placed.placement.violations[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.rule, "generated-behind-brand");
    assert_eq!(
        warning.message,
        "Generated image must stay behind brand asset \"primary-logo\""
    );
    assert_eq!(
        warning.fix,
        Some(Operation::Reorder {
            layer_id: placed.layer_id.clone().unwrap(),
            new_z: -1.0,
        })
    );
}

#[tokio::test]
async fn test_blank_prompt_is_rejected_without_calling_out() {
    let (orchestrator, mock) = orchestrator(MockSynthesizer::new());
    let mut session = ProjectSession::new(acme_project(64, 64));

    let err = orchestrator
        .generate_into(&mut session, "   ", &config(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_REQUEST");
    assert_eq!(mock.calls(), 0);
    assert!(session.project().layers().is_empty());
}

#[tokio::test]
async fn test_failed_generation_inserts_nothing() {
    let (orchestrator, _) =
        orchestrator(MockSynthesizer::new().fail_when("forest", MockFailure::Failed));
    let mut session = ProjectSession::new(acme_project(64, 64));

    let err = orchestrator
        .generate_into(&mut session, "misty forest", &config(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::GenerationFailed { .. }));
    assert!(session.project().layers().is_empty());
    assert_eq!(session.project().history().len(), 1);
}

#[tokio::test]
async fn test_cancelled_generation_inserts_nothing() {
    let (orchestrator, _) =
        orchestrator(MockSynthesizer::new().with_latency(Duration::from_secs(30)));
    let mut session = ProjectSession::new(acme_project(64, 64));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = orchestrator
        .generate_into(&mut session, "misty forest", &config(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CANCELLED");
    assert!(session.project().layers().is_empty());
}

#[tokio::test]
async fn test_variations_keep_preset_order() {
    let (orchestrator, mock) = orchestrator(MockSynthesizer::new());
    let set = orchestrator
        .variations("coffee cup", &acme_kit(), &config(), 4, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(mock.calls(), 4);
    let styles: Vec<&str> = set
        .results
        .iter()
        .map(|r| r.style.as_deref().unwrap())
        .collect();
    assert_eq!(styles, vec!["minimal", "bold", "elegant", "organic"]);
    assert!(set.failures.is_empty());
}

#[tokio::test]
async fn test_variation_count_is_capped() {
    let (orchestrator, mock) = orchestrator(MockSynthesizer::new());
    let set = orchestrator
        .variations("coffee cup", &acme_kit(), &config(), 9, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(set.results.len(), 4);
    assert_eq!(mock.calls(), 4);
}

#[tokio::test]
async fn test_partial_variations_succeed() {
    let mock = MockSynthesizer::new()
        .fail_when("high contrast", MockFailure::Failed)
        .fail_when("earthy tones", MockFailure::RateLimited);
    let (orchestrator, _) = orchestrator(mock);

    let set = orchestrator
        .variations("coffee cup", &acme_kit(), &config(), 4, &CancellationToken::new())
        .await
        .unwrap();

    let styles: Vec<&str> = set
        .results
        .iter()
        .map(|r| r.style.as_deref().unwrap())
        .collect();
    assert_eq!(styles, vec!["minimal", "elegant"]);
    assert_eq!(set.requested(), 4);
    let failed: Vec<(&str, &str)> = set
        .failures
        .iter()
        .map(|f| (f.style.as_str(), f.code.as_str()))
        .collect();
    assert_eq!(failed, vec![("bold", "GENERATION_FAILED"), ("organic", "RATE_LIMITED")]);
}

#[tokio::test]
async fn test_all_variations_failing_is_an_error() {
    let (orchestrator, _) =
        orchestrator(MockSynthesizer::new().fail_when("Style:", MockFailure::Failed));
    let err = orchestrator
        .variations("coffee cup", &acme_kit(), &config(), 3, &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        StudioError::VariationsFailed { attempted, reasons } => {
            assert_eq!(attempted, 3);
            assert_eq!(reasons.len(), 3);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_all_variations_rate_limited_surfaces_rate_limit() {
    let (orchestrator, _) =
        orchestrator(MockSynthesizer::new().fail_when("Style:", MockFailure::RateLimited));
    let err = orchestrator
        .variations("coffee cup", &acme_kit(), &config(), 2, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "RATE_LIMITED");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_zero_variations_rejected() {
    let (orchestrator, mock) = orchestrator(MockSynthesizer::new());
    let err = orchestrator
        .variations("coffee cup", &acme_kit(), &config(), 0, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_REQUEST");
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_generated_background_exports() {
    let (orchestrator, _) = orchestrator(MockSynthesizer::new());
    let mut session = ProjectSession::new(acme_project(48, 48));
    let placed = orchestrator
        .generate_into(&mut session, "misty forest", &config(), &CancellationToken::new())
        .await
        .unwrap();

    let compositor = Compositor::new(
        Arc::new(ChainResolver::standard(".")),
        Arc::new(FontBook::new()),
    );
    let artifact = compositor
        .export(&session.snapshot(), ExportFormat::Png, ExportQuality::High)
        .await
        .unwrap();

    let expected = MockSynthesizer::color_for(&placed.result.enriched_prompt);
    assert_eq!(decode(&artifact.bytes).get_pixel(24, 24), &expected);
}
