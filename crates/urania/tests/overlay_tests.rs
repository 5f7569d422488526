mod common;

use urania::aspects::AspectKind;
use urania::dom::Document;
use urania::overlay::{
    ChartToken, OverlayController, OverlayEvent, OverlayState, Transition, Viewport,
};
use urania::primitives::Point;

fn chart() -> (Document, OverlayController) {
    let doc = Document::parse(common::CHART_SVG).expect("chart markup");
    let controller = OverlayController::attach(&doc, doc.root());
    (doc, controller)
}

/// A click on the sun-moon square line.
fn click_square() -> OverlayEvent {
    OverlayEvent::Clicked(Point::new(200.0, 100.0))
}

#[test]
fn test_attach_indexes_markers_and_lines() {
    let (_doc, controller) = chart();
    let tokens: Vec<&str> = controller.markers().iter().map(|m| m.token.as_str()).collect();
    assert_eq!(tokens, vec!["sun", "moon", "mars"]);
    assert_eq!(controller.markers()[0].center, Point::new(100.0, 100.0));

    let lines = controller.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].key, "aspect-sun-square-moon");
    assert_eq!(lines[0].kind, Some(AspectKind::Square));
    assert_eq!(lines[1].endpoints, Some(("sun".to_string(), "mars".to_string())));
}

#[test]
fn test_hover_resolution_priority() {
    let (doc, controller) = chart();
    assert_eq!(
        controller.resolve_hover(&doc, Point::new(101.0, 101.0)),
        Some(ChartToken::Body("sun".to_string()))
    );
    // off the glyph, within the nearest-marker radius
    assert_eq!(
        controller.resolve_hover(&doc, Point::new(100.0, 118.0)),
        Some(ChartToken::Body("sun".to_string()))
    );
    assert_eq!(
        controller.resolve_hover(&doc, Point::new(25.0, 375.0)),
        Some(ChartToken::Sign("Taurus".to_string()))
    );
    assert_eq!(controller.resolve_hover(&doc, Point::new(390.0, 10.0)), None);
}

#[test]
fn test_sign_hit_beats_nearby_marker() {
    let doc = Document::parse(
        r#"<svg width="200" height="100"><path id="sign-aries" d="M 0 0 L 50 0 L 50 50 L 0 50 Z"/><circle id="planet-sun" cx="62" cy="25" r="3"/></svg>"#,
    )
    .expect("chart markup");
    let controller = OverlayController::attach(&doc, doc.root());
    assert_eq!(controller.markers().len(), 1);

    // inside the wedge, 17px from the sun glyph
    assert_eq!(
        controller.resolve_hover(&doc, Point::new(45.0, 25.0)),
        Some(ChartToken::Sign("Aries".to_string()))
    );
    // off the wedge and every glyph, still within marker range
    assert_eq!(
        controller.resolve_hover(&doc, Point::new(62.0, 42.0)),
        Some(ChartToken::Body("sun".to_string()))
    );
}

#[test]
fn test_self_referencing_use_has_no_marker() {
    let mut doc = Document::parse(
        r##"<svg width="100" height="100"><use id="planet-sun" href="#planet-sun"/><use id="planet-moon" href="#planet-mars"/><use id="planet-mars" href="#planet-moon"/></svg>"##,
    )
    .expect("chart markup");
    let mut controller = OverlayController::attach(&doc, doc.root());
    assert!(controller.markers().is_empty());
    assert_eq!(controller.resolve_hover(&doc, Point::new(0.0, 0.0)), None);
    controller.handle(&mut doc, OverlayEvent::PointerMoved(Point::new(1.0, 1.0)));
    assert_eq!(controller.state(), &OverlayState::Idle);
}

#[test]
fn test_hover_does_not_touch_markup() {
    let (mut doc, mut controller) = chart();
    let before = doc.to_markup();
    let moved = OverlayEvent::PointerMoved(Point::new(101.0, 101.0));
    let transition = controller.handle(&mut doc, moved);
    assert_eq!(transition, Transition::default());
    assert_eq!(doc.to_markup(), before);

    let hover = controller.hovered().expect("hover state");
    assert_eq!(hover.token, ChartToken::Body("sun".to_string()));
    assert_eq!(hover.tooltip.x, 113.0);

    controller.handle(&mut doc, OverlayEvent::PointerLeft);
    assert_eq!(controller.state(), &OverlayState::Idle);
}

#[test]
fn test_click_selects_and_emphasizes() {
    let (mut doc, mut controller) = chart();
    let transition = controller.handle(&mut doc, click_square());
    assert_eq!(transition, Transition { applied: 7, reverted: 0 });

    let selection = controller.selected().expect("selection");
    assert_eq!(selection.key, "aspect-sun-square-moon");

    let trine = doc.get_by_id("aspect-sun-trine-mars").expect("trine line");
    let square = doc.get_by_id("aspect-sun-square-moon").expect("square line");
    assert_eq!(doc.attr(trine, "opacity"), Some("0.04"));
    assert_eq!(doc.attr(square, "opacity"), None);

    let sun = doc.get_by_id("planet-sun").expect("sun");
    assert_eq!(
        doc.attr(sun, "transform"),
        Some("translate(100 100) translate(0 0) scale(1.35) translate(0 0)")
    );
    assert_eq!(doc.attr(sun, "fill"), Some("#f00"));
    assert_eq!(doc.attr(sun, "stroke"), Some("#f00"));

    let mars = doc.get_by_id("planet-mars").expect("mars");
    assert_eq!(doc.attr(mars, "transform"), None);
}

#[test]
fn test_toggle_restores_markup_without_drift() {
    let (mut doc, mut controller) = chart();
    let original = doc.to_markup();
    for _ in 0..3 {
        controller.handle(&mut doc, click_square());
        assert_ne!(doc.to_markup(), original);
        let transition = controller.handle(&mut doc, click_square());
        assert_eq!(transition.reverted, 7);
        assert_eq!(doc.to_markup(), original);
        assert_eq!(controller.state(), &OverlayState::Idle);
    }
    let sun = doc.get_by_id("planet-sun").expect("sun");
    assert!(controller.snapshot().is_captured(sun, "transform"));
}

#[test]
fn test_switching_selection_reverts_previous() {
    let (mut doc, mut controller) = chart();
    controller.handle(&mut doc, click_square());
    controller.handle(
        &mut doc,
        OverlayEvent::AspectChosen {
            p1: "Mars".to_string(),
            kind: AspectKind::Trine,
            p2: "Sun".to_string(),
        },
    );

    assert_eq!(controller.selected().map(|s| s.key.as_str()), Some("aspect-sun-trine-mars"));
    let mars = doc.get_by_id("planet-mars").expect("mars");
    assert_eq!(
        doc.attr(mars, "transform"),
        Some("translate(200 300) scale(1.35) translate(-200 -300)")
    );
    assert_eq!(doc.attr(mars, "fill"), Some("#0f0"));

    let moon = doc.get_by_id("planet-moon").expect("moon");
    assert_eq!(doc.attr(moon, "transform"), Some("translate(300 100)"));
    assert_eq!(doc.attr(moon, "fill"), None);

    let square = doc.get_by_id("aspect-sun-square-moon").expect("square line");
    assert_eq!(doc.attr(square, "opacity"), Some("0.04"));
}

#[test]
fn test_unmatched_choice_and_empty_click_keep_state() {
    let (mut doc, mut controller) = chart();
    controller.handle(&mut doc, click_square());
    let markup = doc.to_markup();

    let transition = controller.handle(
        &mut doc,
        OverlayEvent::AspectChosen {
            p1: "venus".to_string(),
            kind: AspectKind::Sextile,
            p2: "mars".to_string(),
        },
    );
    assert_eq!(transition, Transition::default());

    let transition = controller.handle(&mut doc, OverlayEvent::Clicked(Point::new(390.0, 10.0)));
    assert_eq!(transition, Transition::default());
    assert_eq!(controller.selected().map(|s| s.key.as_str()), Some("aspect-sun-square-moon"));
    assert_eq!(doc.to_markup(), markup);
}

#[test]
fn test_hover_during_selection_and_reset() {
    let (mut doc, mut controller) = chart();
    let original = doc.to_markup();
    controller.handle(&mut doc, click_square());
    controller.handle(&mut doc, OverlayEvent::PointerMoved(Point::new(200.0, 300.0)));

    let selection = controller.selected().expect("still selected");
    assert_eq!(
        selection.hover.as_ref().map(|h| h.token.clone()),
        Some(ChartToken::Body("mars".to_string()))
    );

    controller.handle(
        &mut doc,
        OverlayEvent::Resized(Viewport {
            width: 250.0,
            height: 320.0,
        }),
    );
    let hover = controller.hovered().expect("hover kept across resize");
    assert!(hover.tooltip.right() <= 250.0);
    assert!(hover.tooltip.bottom() <= 320.0);

    let transition = controller.reset(&mut doc);
    assert_eq!(transition.reverted, 7);
    assert_eq!(doc.to_markup(), original);
}
