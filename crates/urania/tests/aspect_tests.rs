mod common;

use urania::aspects::{
    aspect_phase, dedupe_aspects, derive_angle_aspects, normalize_chart_aspects, summarize,
    Aspect, AspectCalculator, AspectKind, AspectPhase, AspectSource, AspectStrength, MotionTable,
    Motion,
};

fn aspect(p1: &str, kind: AspectKind, p2: &str, orb: f64) -> Aspect {
    Aspect {
        p1: p1.to_string(),
        p2: p2.to_string(),
        kind,
        orb,
        major: kind.is_major(),
        source: AspectSource::Upstream,
    }
}

#[test]
fn test_strength_label_boundaries() {
    assert_eq!(AspectStrength::from_orb(1.5).label, "Very strong");
    assert_eq!(AspectStrength::from_orb(1.51).label, "Strong");
    assert_eq!(AspectStrength::from_orb(3.0).label, "Strong");
    assert_eq!(AspectStrength::from_orb(5.0).label, "Moderate");
    assert_eq!(AspectStrength::from_orb(7.0).label, "Subtle");
    assert_eq!(AspectStrength::from_orb(7.01).label, "Faint");
}

#[test]
fn test_strength_score_is_clamped() {
    assert_eq!(AspectStrength::from_orb(0.0).score, 100);
    assert_eq!(AspectStrength::from_orb(3.33).score, 67);
    assert_eq!(AspectStrength::from_orb(20.0).score, 5);
    assert_eq!(AspectStrength::from_orb(-2.0).score, 80);
}

#[test]
fn test_derive_square_within_tolerance() {
    let exact = derive_angle_aspects("asc", 0.0, [("sun", 90.0)]);
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].kind, AspectKind::Square);
    assert_eq!(exact[0].orb, 0.0);
    assert_eq!(exact[0].p1, "ascendant");
    assert_eq!(exact[0].source, AspectSource::Derived);

    let edge = derive_angle_aspects("asc", 0.0, [("sun", 95.9)]);
    assert_eq!(edge.len(), 1);
    assert_eq!(edge[0].orb, 5.9);

    let outside = derive_angle_aspects("asc", 0.0, [("sun", 96.4)]);
    assert!(outside.is_empty());
}

#[test]
fn test_derive_wraps_around_zero() {
    let found = derive_angle_aspects("mc", 358.0, [("moon", 2.0)]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, AspectKind::Conjunction);
    assert_eq!(found[0].orb, 4.0);
}

#[test]
fn test_derive_skips_the_angle_itself() {
    let found = derive_angle_aspects("ascendant", 100.0, [("asc", 100.0), ("sun", 100.5)]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].p2, "sun");
}

#[test]
fn test_dedupe_keeps_smallest_orb_and_drops_self_pairs() {
    let aspects = vec![
        aspect("sun", AspectKind::Square, "moon", 3.4),
        aspect("mean_node", AspectKind::Conjunction, "true_node", 0.1),
        aspect("moon", AspectKind::Square, "sun", 3.33),
        aspect("sun", AspectKind::Trine, "moon", 1.0),
    ];
    let deduped = dedupe_aspects(aspects);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].kind, AspectKind::Square);
    assert_eq!(deduped[0].orb, 3.33);
    assert_eq!(deduped[1].kind, AspectKind::Trine);
}

#[test]
fn test_phase_separating_after_exact() {
    let sun = Motion::new(10.0, Some(1.0));
    let moon = Motion::new(100.0, Some(13.0));
    assert_eq!(aspect_phase(sun, moon, 90.0), AspectPhase::Separating);
}

#[test]
fn test_phase_applying_and_unknown() {
    let sun = Motion::new(10.0, Some(1.0));
    let moon = Motion::new(95.0, Some(13.0));
    assert_eq!(aspect_phase(sun, moon, 90.0), AspectPhase::Applying);

    let no_speed = Motion::new(95.0, None);
    assert_eq!(aspect_phase(sun, no_speed, 90.0), AspectPhase::Unknown);

    let still = Motion::stationary(10.0);
    let also_still = Motion::stationary(100.0);
    assert_eq!(aspect_phase(still, also_still, 90.0), AspectPhase::Unknown);
}

#[test]
fn test_normalize_paris_chart() {
    let chart = common::paris_chart();
    let aspects = normalize_chart_aspects(&chart);

    let keys: Vec<String> = aspects.iter().map(|a| a.key()).collect();
    assert_eq!(
        keys,
        vec![
            "ascendant.trine.venus",
            "ascendant.opposition.moon",
            "midheaven.conjunction.mercury",
            "midheaven.square.north_node",
            "ascendant.square.sun",
            "sun.square.moon",
        ]
    );
    let orbs: Vec<f64> = aspects.iter().map(|a| a.orb).collect();
    assert_eq!(orbs, vec![0.1, 0.2, 0.3, 2.2, 3.13, 3.33]);
    assert!(orbs.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_no_derivation_when_upstream_reports_angle() {
    let mut chart = common::paris_chart();
    chart.aspects.push(urania::natal::UpstreamAspect {
        p1: "Asc".to_string(),
        p2: "Sun".to_string(),
        aspect_type: "square".to_string(),
        deg: None,
        orb: 3.1,
        major: None,
    });
    let aspects = normalize_chart_aspects(&chart);
    let asc: Vec<&Aspect> = aspects.iter().filter(|a| a.involves("ascendant")).collect();
    assert_eq!(asc.len(), 1);
    assert_eq!(asc[0].source, AspectSource::Upstream);
    assert!(aspects.iter().any(|a| a.involves("midheaven")));
}

#[test]
fn test_upstream_only_calculator() {
    let chart = common::paris_chart();
    let aspects = AspectCalculator::upstream_only().normalize(&chart);
    assert_eq!(aspects.len(), 1);
    assert_eq!(aspects[0].key(), "sun.square.moon");
}

#[test]
fn test_summary_after_reconcile() {
    let mut chart = common::paris_chart();
    assert_eq!(chart.aspects_summary.total, 5);
    chart.reconcile_summary();
    assert_eq!(chart.aspects_summary.total, chart.aspects.len());
    assert_eq!(chart.aspects_summary.by_type.get("square"), Some(&2));

    let normalized = normalize_chart_aspects(&chart);
    let summary = summarize(&normalized);
    assert_eq!(summary.total, 6);
    assert_eq!(summary.major, 6);
}

#[test]
fn test_motion_table_phases() {
    let chart = common::paris_chart();
    let table = MotionTable::from_chart(&chart);
    assert_eq!(table.get("mercury").and_then(|m| m.speed), Some(-0.3));
    assert_eq!(table.get("asc").and_then(|m| m.speed), Some(0.0));

    let sun_moon = aspect("sun", AspectKind::Square, "moon", 3.33);
    assert_ne!(table.phase(&sun_moon), AspectPhase::Unknown);

    let unknown = aspect("sun", AspectKind::Square, "vesta", 1.0);
    assert_eq!(table.phase(&unknown), AspectPhase::Unknown);
}

#[test]
fn test_kind_names() {
    assert_eq!(AspectKind::from_name("Semi-Sextile"), Some(AspectKind::SemiSextile));
    assert_eq!(AspectKind::from_name("inconjunct"), Some(AspectKind::Quincunx));
    assert_eq!(AspectKind::from_name("novile"), None);
    assert_eq!(AspectKind::SemiSextile.label(), "Semi-sextile");
    assert_eq!(AspectKind::Trine.degree(), 120.0);
}
