//! urania: the aspect geometry and annotation engine behind a natal report.
//!
//! The calculation service is an opaque oracle (see [`upstream`]); everything
//! here normalizes its output, derives what it leaves out and drives the
//! interactive chart overlay, text highlights and export over an explicit
//! document model ([`dom`]).

pub mod geometry;
pub mod points;
pub mod primitives;
pub mod zodiac;

pub mod aspects;
pub mod chart_style;
pub mod interpretation;
pub mod natal;

pub mod dom;
pub mod highlights;
pub mod overlay;
pub mod report;

pub mod boundary;
pub mod envelope;
pub mod error;
pub mod session;
pub mod upstream;

pub use aspects::{Aspect, AspectCalculator, AspectKind, AspectPhase, AspectStrength};
pub use boundary::{ApiResponse, Boundary};
pub use chart_style::ChartStyle;
pub use dom::Document;
pub use envelope::ReportEnvelope;
pub use error::ApiError;
pub use highlights::{HighlightColor, HighlightRange, HighlightSession, HighlightStore};
pub use interpretation::{Atom, AtomCategory, AtomIndex};
pub use natal::{NatalChart, NatalRequest};
pub use overlay::{OverlayController, OverlayEvent, OverlayState};
pub use report::{compose_export, render_body, ExportOptions, ReportSection, ReportView};
pub use session::{LoadedReport, ReportLoader, ReportState};
pub use upstream::{AstrologyApi, City, CitySearch, HttpAstrologyApi, SearchOutcome, UpstreamError};
