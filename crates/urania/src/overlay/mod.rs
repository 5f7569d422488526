//! Interactive overlay on the server-rendered chart: hover lookup and
//! aspect selection emphasis.

pub mod controller;
pub mod lines;
pub mod snapshot;
pub mod tokens;
pub mod tooltip;

pub use controller::{
    Hover, OverlayController, OverlayEvent, OverlayState, Selection, Transition, VisualState,
    DIMMED_OPACITY, EMPHASIS_SCALE,
};
pub use lines::{AspectLine, BodyMarker};
pub use snapshot::SnapshotStore;
pub use tokens::{resolve_element, ChartToken, Resolution, ResolutionStrategy};
pub use tooltip::{place_tooltip, TooltipSize, Viewport};
