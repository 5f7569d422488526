use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    #[error("Highlight range {start}..{end} is empty or inverted")]
    InvalidRange { start: usize, end: usize },
    #[error("Highlight overlaps existing range {0}")]
    Overlap(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    Yellow,
    Green,
    Blue,
    Pink,
    Purple,
}

impl HighlightColor {
    pub const ALL: [HighlightColor; 5] = [
        HighlightColor::Yellow,
        HighlightColor::Green,
        HighlightColor::Blue,
        HighlightColor::Pink,
        HighlightColor::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightColor::Yellow => "yellow",
            HighlightColor::Green => "green",
            HighlightColor::Blue => "blue",
            HighlightColor::Pink => "pink",
            HighlightColor::Purple => "purple",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn css_class(&self) -> String {
        format!("hl-{}", self.as_str())
    }
}

/// A highlighted span `[start, end)` of the report body's flattened text,
/// counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRange {
    pub id: Uuid,
    pub start: usize,
    pub end: usize,
    pub color: HighlightColor,
}

impl HighlightRange {
    /// Touching ranges do not overlap.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Non-overlapping ranges for one report subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightSet {
    ranges: Vec<HighlightRange>,
}

impl HighlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored ranges, dropping any that are invalid or collide
    /// with an earlier one.
    pub fn from_ranges(stored: Vec<HighlightRange>) -> Self {
        let mut set = Self::new();
        for range in stored {
            if range.end <= range.start {
                log::warn!("dropping stored highlight {} with empty range", range.id);
                continue;
            }
            if let Some(existing) = set.ranges.iter().find(|r| r.overlaps(range.start, range.end)) {
                log::warn!("dropping stored highlight {} overlapping {}", range.id, existing.id);
                continue;
            }
            set.ranges.push(range);
        }
        set
    }

    pub fn ranges(&self) -> &[HighlightRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn create(
        &mut self,
        start: usize,
        end: usize,
        color: HighlightColor,
    ) -> Result<&HighlightRange, HighlightError> {
        if end <= start {
            return Err(HighlightError::InvalidRange { start, end });
        }
        if let Some(existing) = self.ranges.iter().find(|r| r.overlaps(start, end)) {
            return Err(HighlightError::Overlap(existing.id));
        }
        self.ranges.push(HighlightRange {
            id: Uuid::new_v4(),
            start,
            end,
            color,
        });
        Ok(&self.ranges[self.ranges.len() - 1])
    }

    pub fn remove(&mut self, id: Uuid) -> Option<HighlightRange> {
        let index = self.ranges.iter().position(|r| r.id == id)?;
        Some(self.ranges.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&HighlightRange> {
        self.ranges.iter().find(|r| r.id == id)
    }
}
