//! User text highlights over the report body, persisted per subject.

pub mod range;
pub mod render;
pub mod session;
pub mod store;

pub use range::{HighlightColor, HighlightError, HighlightRange, HighlightSet};
pub use render::{
    flattened_text, render_highlights, selection_offsets, strip_markers, DomPosition,
};
pub use session::HighlightSession;
pub use store::{subject_key, HighlightStore, JsonFileHighlightStore, MemoryHighlightStore};
