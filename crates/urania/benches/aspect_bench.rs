use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use urania::aspects::{
    derive_angle_aspects, dedupe_aspects, normalize_chart_aspects, summarize, AspectCalculator,
};
use urania::natal::NatalChart;

const PLANETS: [&str; 10] = [
    "sun", "moon", "mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune", "pluto",
];

fn spread_planets() -> Vec<(&'static str, f64)> {
    PLANETS
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, (i as f64 * 37.3 + 11.0) % 360.0))
        .collect()
}

fn sample_chart() -> NatalChart {
    let planets: Vec<_> = spread_planets()
        .into_iter()
        .enumerate()
        .map(|(i, (id, lon))| {
            json!({
                "id": id,
                "name": id,
                "sign": "Aries",
                "pos": lon % 30.0,
                "abs_pos": lon,
                "house": (i % 12) + 1,
                "speed": 1.0 - i as f64 * 0.2,
            })
        })
        .collect();
    let chart = json!({
        "planets": planets,
        "angles": { "asc": 141.2, "mc": 40.8 },
        "aspects": [
            { "p1": "Sun", "p2": "Moon", "type": "square", "orb": 3.33 },
            { "p1": "Moon", "p2": "Sun", "type": "Square", "orb": 3.4 },
            { "p1": "Venus", "p2": "Mars", "type": "trine", "orb": 1.2 },
            { "p1": "Jupiter", "p2": "Saturn", "type": "sextile", "orb": 2.5 },
            { "p1": "Mean_Node", "p2": "True_Node", "type": "conjunction", "orb": 0.1 }
        ]
    });
    serde_json::from_value(chart).expect("bench chart")
}

fn bench_derive_angle_aspects(c: &mut Criterion) {
    let planets = spread_planets();
    c.bench_function("derive_angle_aspects", |b| {
        b.iter(|| {
            derive_angle_aspects(
                black_box("ascendant"),
                black_box(141.2),
                planets.iter().copied(),
            )
        })
    });
}

fn bench_dedupe_aspects(c: &mut Criterion) {
    let planets = spread_planets();
    let mut aspects = derive_angle_aspects("ascendant", 141.2, planets.iter().copied());
    aspects.extend(derive_angle_aspects("asc", 141.2, planets.iter().copied()));
    aspects.extend(derive_angle_aspects("midheaven", 40.8, planets.iter().copied()));

    c.bench_function("dedupe_aspects", |b| {
        b.iter(|| dedupe_aspects(black_box(aspects.clone())))
    });
}

fn bench_normalize_chart(c: &mut Criterion) {
    let chart = sample_chart();
    let upstream_only = AspectCalculator::upstream_only();

    c.bench_function("normalize_chart_aspects", |b| {
        b.iter(|| normalize_chart_aspects(black_box(&chart)))
    });
    c.bench_function("normalize_upstream_only", |b| {
        b.iter(|| upstream_only.normalize(black_box(&chart)))
    });
    c.bench_function("normalize_and_summarize", |b| {
        b.iter(|| summarize(&normalize_chart_aspects(black_box(&chart))))
    });
}

criterion_group!(
    benches,
    bench_derive_angle_aspects,
    bench_dedupe_aspects,
    bench_normalize_chart
);
criterion_main!(benches);
