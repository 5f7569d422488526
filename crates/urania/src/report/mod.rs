//! Report composition: the resolved view, the highlightable body and the
//! printable export.

pub mod body;
pub mod export;
pub mod view;

pub use body::{find_section, render_body, SECTION_ATTR};
pub use export::{compose_export, ExportOptions};
pub use view::{AngleSection, AspectRow, PlanetRow, ReportView};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    NatalWheel,
    Ascendant,
    Midheaven,
    Planets,
    Aspects,
    Themes,
}

impl ReportSection {
    /// Canonical order.
    pub const ALL: [ReportSection; 6] = [
        ReportSection::NatalWheel,
        ReportSection::Ascendant,
        ReportSection::Midheaven,
        ReportSection::Planets,
        ReportSection::Aspects,
        ReportSection::Themes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSection::NatalWheel => "natal_wheel",
            ReportSection::Ascendant => "ascendant",
            ReportSection::Midheaven => "midheaven",
            ReportSection::Planets => "planets",
            ReportSection::Aspects => "aspects",
            ReportSection::Themes => "themes",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportSection::NatalWheel => "Natal wheel",
            ReportSection::Ascendant => "Ascendant",
            ReportSection::Midheaven => "Midheaven",
            ReportSection::Planets => "Planets",
            ReportSection::Aspects => "Aspects",
            ReportSection::Themes => "Themes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let flat = name.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_");
        if flat == "wheel" {
            return Some(ReportSection::NatalWheel);
        }
        Self::ALL.into_iter().find(|s| s.as_str() == flat)
    }
}
