use crate::highlights::range::HighlightRange;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Key under which one report subject's highlights are stored.
///
/// Different birth data never share a key; whitespace and case in the
/// name and city are normalized.
pub fn subject_key(name: &str, birth_date: &str, birth_time: &str, city: &str) -> String {
    let norm = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    format!(
        "highlights:{}|{}T{}|{}",
        norm(name),
        birth_date.trim(),
        birth_time.trim(),
        norm(city)
    )
}

/// Persistent subject-key → ranges mapping.
///
/// `load` never fails: missing or unreadable data is an empty list. `save`
/// reports failure so the caller can decide to swallow it.
pub trait HighlightStore {
    fn load(&self, key: &str) -> Vec<HighlightRange>;
    fn save(&mut self, key: &str, ranges: &[HighlightRange]) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHighlightStore {
    entries: HashMap<String, Vec<HighlightRange>>,
}

impl MemoryHighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl HighlightStore for MemoryHighlightStore {
    fn load(&self, key: &str) -> Vec<HighlightRange> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    fn save(&mut self, key: &str, ranges: &[HighlightRange]) -> Result<()> {
        if ranges.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), ranges.to_vec());
        }
        Ok(())
    }
}

/// One JSON object on disk mapping subject keys to range lists. Every save
/// rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileHighlightStore {
    path: PathBuf,
}

type Entries = BTreeMap<String, serde_json::Value>;

impl JsonFileHighlightStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if text.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }
}

impl HighlightStore for JsonFileHighlightStore {
    fn load(&self, key: &str) -> Vec<HighlightRange> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("highlight store unreadable, starting empty: {:#}", e);
                return Vec::new();
            }
        };
        let Some(raw) = entries.get(key) else {
            return Vec::new();
        };
        match serde_json::from_value::<Vec<HighlightRange>>(raw.clone()) {
            Ok(ranges) => ranges,
            Err(e) => {
                log::warn!("highlights for {} are corrupt, ignoring: {}", key, e);
                Vec::new()
            }
        }
    }

    fn save(&mut self, key: &str, ranges: &[HighlightRange]) -> Result<()> {
        // A corrupt file is replaced rather than blocking new writes.
        let mut entries = self.read_entries().unwrap_or_default();
        if ranges.is_empty() {
            entries.remove(key);
        } else {
            entries.insert(key.to_string(), serde_json::to_value(ranges)?);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let text = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_key_normalizes_whitespace_and_case() {
        assert_eq!(
            subject_key(" Ada  Lovelace", "1990-05-15", "14:30", "PARIS "),
            "highlights:ada lovelace|1990-05-15T14:30|paris"
        );
        assert_ne!(
            subject_key("Ada", "1990-05-15", "14:30", "Paris"),
            subject_key("Ada", "1990-05-15", "14:31", "Paris")
        );
    }
}
