pub mod calculator;
pub mod classify;
pub mod dedup;
pub mod deriver;
pub mod types;

pub use calculator::{
    from_upstream, normalize_chart_aspects, summarize, summarize_upstream, AspectCalculator,
    MotionTable,
};
pub use classify::{aspect_phase, AspectPhase, AspectStrength, Motion};
pub use dedup::dedupe_aspects;
pub use deriver::{derive_angle_aspects, references_angle};
pub use types::{Aspect, AspectDefinition, AspectKind, AspectSource, ANGLE_ASPECTS};
