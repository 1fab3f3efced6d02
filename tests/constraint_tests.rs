//! Constraint Tests
//!
//! Brand rules gating operations against a live project.

mod common;

use brandcanvas::constraints::Severity;
use brandcanvas::model::{LayerDraft, LayerPatch, Operation, Size, TextStyle};
use brandcanvas::studio::ProjectSession;

use common::{acme_project, LOGO_SRC};

fn add(session: &mut ProjectSession, draft: LayerDraft) -> String {
    let applied = session.apply(Operation::Add { layer: draft }).unwrap();
    assert!(applied.committed);
    applied.layer_id.unwrap()
}

fn logo_draft(w: f64, h: f64) -> LayerDraft {
    LayerDraft::asset("primary-logo", LOGO_SRC, Size::new(w, h))
}

// === Palette and fonts ===

#[test]
fn test_strict_palette_blocks_off_brand_color() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let headline = add(
        &mut session,
        LayerDraft::text("Launch day", TextStyle::new("Inter", 48.0, "#111111"), Size::new(600.0, 120.0)),
    );
    let before = session.project().history().len();

    let applied = session
        .apply(Operation::Transform {
            layer_id: headline.clone(),
            changes: LayerPatch::default().with_color("#0000ff"),
        })
        .unwrap();

    assert!(!applied.committed);
    assert!(!applied.validation.valid);
    assert_eq!(applied.validation.violations.len(), 1);
    let violation = &applied.validation.violations[0];
    assert_eq!(violation.rule, "strict-palette");
    assert_eq!(violation.severity, Severity::Error);
    assert_eq!(violation.message, "Color #0000ff is not in the brand palette");

    // Nothing committed.
    assert_eq!(session.project().history().len(), before);
    let style_color = match &session.project().layer(&headline).unwrap().content {
        brandcanvas::model::LayerContent::Text(text) => text.style.color.clone(),
        other => panic!("unexpected content {:?}", other),
    };
    assert_eq!(style_color, "#111111");
}

#[test]
fn test_palette_match_ignores_case() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let headline = add(
        &mut session,
        LayerDraft::text("Launch", TextStyle::new("Inter", 48.0, "#111111"), Size::new(600.0, 120.0)),
    );

    let applied = session
        .apply(Operation::Transform {
            layer_id: headline,
            changes: LayerPatch::default().with_color("#ff5500"),
        })
        .unwrap();
    assert!(applied.committed);
}

#[test]
fn test_off_brand_font_warns_but_commits() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let headline = add(
        &mut session,
        LayerDraft::text("Launch", TextStyle::new("Inter", 48.0, "#111111"), Size::new(600.0, 120.0)),
    );

    let applied = session
        .apply(Operation::Transform {
            layer_id: headline,
            changes: LayerPatch::default().with_font_family("Comic Sans"),
        })
        .unwrap();

    assert!(applied.committed);
    assert!(applied.validation.valid);
    assert!(applied.validation.has_warnings());
    assert_eq!(
        applied.validation.violations[0].message,
        "Font \"Comic Sans\" is not in the brand kit. Use: Montserrat, Inter, Playfair Display"
    );
}

// === Sizes ===

#[test]
fn test_logo_min_size_uses_smaller_dimension() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let logo = add(&mut session, logo_draft(300.0, 300.0).with_z(10.0));

    let applied = session
        .apply(Operation::Transform {
            layer_id: logo.clone(),
            changes: LayerPatch::default().with_size(150.0, 300.0),
        })
        .unwrap();

    assert!(!applied.committed);
    let rules: Vec<&str> = applied.validation.errors().map(|v| v.rule.as_str()).collect();
    assert_eq!(rules, vec!["logo-min-size"]);
    assert_eq!(
        applied.validation.violations[0].message,
        "Logo cannot be smaller than 200px"
    );
    assert_eq!(session.project().layer(&logo).unwrap().size, Size::new(300.0, 300.0));
}

#[test]
fn test_resize_at_minimum_is_allowed() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let logo = add(&mut session, logo_draft(300.0, 300.0));

    let applied = session
        .apply(Operation::Transform {
            layer_id: logo,
            changes: LayerPatch::default().with_size(200.0, 400.0),
        })
        .unwrap();
    assert!(applied.committed);
}

#[test]
fn test_text_layers_are_not_size_constrained() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let caption = add(
        &mut session,
        LayerDraft::text("fine print", TextStyle::new("Inter", 10.0, "#111111"), Size::new(300.0, 40.0)),
    );

    let applied = session
        .apply(Operation::Transform {
            layer_id: caption,
            changes: LayerPatch::default().with_size(20.0, 10.0),
        })
        .unwrap();
    assert!(applied.committed);
}

// === Locking ===

#[test]
fn test_locked_layer_cannot_be_removed() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let logo = add(&mut session, logo_draft(300.0, 300.0).locked());

    let applied = session
        .apply(Operation::Remove {
            layer_id: logo.clone(),
        })
        .unwrap();

    assert!(!applied.committed);
    assert_eq!(
        applied.validation.violations[0].message,
        format!("Layer \"{}\" is locked and cannot be removed", logo)
    );
    assert!(session.project().layer(&logo).is_some());
}

#[test]
fn test_unknown_layer_is_an_error_not_a_violation() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let err = session
        .apply(Operation::Remove {
            layer_id: "nope".to_string(),
        })
        .unwrap_err();
    assert_eq!(err.error_code(), "LAYER_NOT_FOUND");
}

// === Logo stays on top ===

#[test]
fn test_logo_cannot_drop_behind_generated_image() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    add(
        &mut session,
        LayerDraft::generated("bg.png", "sunset", "model", Size::new(1080.0, 1080.0)).with_z(3.0),
    );
    let logo = add(&mut session, logo_draft(300.0, 300.0).with_z(10.0));

    for new_z in [3.0, 2.0, -5.0] {
        let result = session.validate(&Operation::Reorder {
            layer_id: logo.clone(),
            new_z,
        });
        assert!(!result.valid, "z {} should be rejected", new_z);
        let violation = &result.violations[0];
        assert_eq!(violation.rule, "logo-always-on-top");
        assert_eq!(
            violation.message,
            "Logo \"primary-logo\" cannot be placed behind generated imagery"
        );
        assert_eq!(
            violation.fix,
            Some(Operation::Reorder {
                layer_id: logo.clone(),
                new_z: 4.0,
            })
        );
    }

    let applied = session
        .apply(Operation::Reorder {
            layer_id: logo.clone(),
            new_z: 3.5,
        })
        .unwrap();
    assert!(applied.committed);
    assert_eq!(session.project().layer(&logo).unwrap().z, 3.5);
}

#[test]
fn test_logo_stays_above_every_generated_image_across_reorders() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let mut generated = Vec::new();
    for z in [0.0, 2.0, 5.0] {
        generated.push(add(
            &mut session,
            LayerDraft::generated("bg.png", "texture", "model", Size::new(100.0, 100.0)).with_z(z),
        ));
    }
    let logo = add(&mut session, logo_draft(300.0, 300.0).with_z(9.0));

    for new_z in [-1.0, 0.0, 1.0, 4.9, 5.0, 5.1, 7.0, 12.0] {
        let _ = session
            .apply(Operation::Reorder {
                layer_id: logo.clone(),
                new_z,
            })
            .unwrap();

        let layers = session.project().layers();
        let logo_z = layers.iter().find(|l| l.id == logo).unwrap().z;
        let max_generated = layers
            .iter()
            .filter(|l| l.is_image())
            .map(|l| l.z)
            .fold(f64::MIN, f64::max);
        assert!(logo_z > max_generated, "logo at {} fell behind {}", logo_z, max_generated);
    }
}

#[test]
fn test_add_is_not_constrained() {
    let mut session = ProjectSession::new(acme_project(1080, 1080));
    let applied = session
        .apply(Operation::Add {
            layer: logo_draft(10.0, 10.0).with_z(-100.0),
        })
        .unwrap();
    assert!(applied.committed);
    assert!(applied.validation.violations.is_empty());
}
