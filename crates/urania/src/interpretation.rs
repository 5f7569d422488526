//! Interpretation atoms: the titled text fragments the service attaches to a
//! chart, flattened out of whatever container shape it used.

use crate::aspects::AspectKind;
use crate::points::{canonical_point, display_name};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomCategory {
    PlanetSign,
    PlanetHouse,
    Aspect,
    Other,
}

impl AtomCategory {
    /// Category implied by a container name such as `planets_in_signs`.
    pub fn from_container(name: &str) -> Self {
        let flat: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match flat.as_str() {
            "planets_in_signs" | "planet_in_sign" | "signs" | "planet_sign" | "planet_signs"
            | "planets_signs" => AtomCategory::PlanetSign,
            "houses" | "planets_in_houses" | "planet_in_house" | "planet_house"
            | "planet_houses" => AtomCategory::PlanetHouse,
            "aspects" | "aspect" => AtomCategory::Aspect,
            _ => AtomCategory::Other,
        }
    }

    /// Category implied by a structured key, if it has a recognised prefix.
    pub fn from_key(key: &str) -> Option<Self> {
        let lower = key.to_lowercase();
        let parts: Vec<&str> = lower.split('.').collect();
        match parts.as_slice() {
            ["planet", _, "sign"] => Some(AtomCategory::PlanetSign),
            ["planet", _, "house"] => Some(AtomCategory::PlanetHouse),
            ["aspect", ..] => Some(AtomCategory::Aspect),
            _ => None,
        }
    }
}

/// One interpretation fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub category: AtomCategory,
    /// Dotted machine key, e.g. `planet.sun.sign`, when the service sent one.
    pub key: Option<String>,
    pub title: String,
    pub body: String,
}

const TITLE_FIELDS: &[&str] = &["title", "heading", "name"];
const BODY_FIELDS: &[&str] = &["text", "body", "content", "description"];
const KEY_FIELDS: &[&str] = &["key", "id", "slug"];

fn first_str<'a>(entry: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|f| entry.get(*f).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn looks_like_entry(map: &Map<String, Value>) -> bool {
    first_str(map, TITLE_FIELDS).is_some() && first_str(map, BODY_FIELDS).is_some()
}

fn atom_from_entry(
    entry: &Value,
    container: AtomCategory,
    fallback_key: Option<&str>,
) -> Option<Atom> {
    let Value::Object(map) = entry else {
        return None;
    };
    let title = first_str(map, TITLE_FIELDS)?;
    let body = first_str(map, BODY_FIELDS)?;
    let key = first_str(map, KEY_FIELDS)
        .or(fallback_key)
        .map(|k| k.to_string());

    let own_category = map
        .get("category")
        .and_then(Value::as_str)
        .map(AtomCategory::from_container)
        .filter(|c| *c != AtomCategory::Other);
    let category = key
        .as_deref()
        .and_then(AtomCategory::from_key)
        .or(own_category)
        .unwrap_or(container);

    Some(Atom {
        category,
        key,
        title: title.to_string(),
        body: body.to_string(),
    })
}

fn extract_container(name: &str, value: &Value, out: &mut Vec<Atom>) {
    let category = AtomCategory::from_container(name);
    match value {
        Value::Array(entries) => {
            out.extend(entries.iter().filter_map(|e| atom_from_entry(e, category, None)));
        }
        Value::Object(map) if looks_like_entry(map) => {
            out.extend(atom_from_entry(value, category, Some(name)));
        }
        Value::Object(map) => {
            for (key, entry) in map {
                out.extend(atom_from_entry(entry, category, Some(key)));
            }
        }
        _ => {}
    }
}

/// Flatten an interpretation payload into atoms, in payload order.
///
/// Tolerates null, `{category: [entries]}`, `{category: {key: entry}}` and a
/// flat list of entries carrying their own `category`. Malformed entries are
/// skipped.
pub fn extract_atoms(payload: &Value) -> Vec<Atom> {
    let mut atoms = Vec::new();
    match payload {
        Value::Array(entries) => {
            atoms.extend(
                entries
                    .iter()
                    .filter_map(|e| atom_from_entry(e, AtomCategory::Other, None)),
            );
        }
        Value::Object(map) => {
            for (name, value) in map {
                extract_container(name, value, &mut atoms);
            }
        }
        _ => {}
    }
    if !payload.is_null() && atoms.is_empty() {
        log::debug!("interpretation payload yielded no atoms");
    }
    atoms
}

/// `sun trine moon` style comparison form.
fn flatten_title(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title words for whole-word matching: punctuation trimmed and ordinal
/// suffixes dropped, so `10th` reads as `10`.
fn title_words(s: &str) -> Vec<String> {
    flatten_title(s)
        .split(' ')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(|w| {
            let digits = w.trim_end_matches(|c: char| c.is_ascii_alphabetic());
            let ordinal = matches!(&w[digits.len()..], "st" | "nd" | "rd" | "th");
            if ordinal && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                digits.to_string()
            } else {
                w.to_string()
            }
        })
        .collect()
}

fn contains_words(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Lookups over a report's atoms.
#[derive(Debug, Clone, Default)]
pub struct AtomIndex {
    atoms: Vec<Atom>,
}

impl AtomIndex {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn from_payload(payload: &Value) -> Self {
        Self::new(extract_atoms(payload))
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    fn by_key(&self, matches: impl Fn(&[&str]) -> bool) -> Option<&Atom> {
        self.atoms.iter().find(|atom| match &atom.key {
            Some(key) => {
                let lower = key.to_lowercase();
                let parts: Vec<&str> = lower.split('.').collect();
                matches(&parts)
            }
            None => false,
        })
    }

    fn placement(
        &self,
        token: &str,
        category: AtomCategory,
        suffix: &str,
        hint: Option<&str>,
    ) -> Option<&Atom> {
        let wanted = canonical_point(token);
        let keyed = self.by_key(|parts| match parts {
            ["planet", id, s] => *s == suffix && canonical_point(id) == wanted,
            _ => false,
        });
        if keyed.is_some() {
            return keyed;
        }

        let prefix = format!("{} in ", flatten_title(&display_name(&wanted)));
        let mut candidates = self
            .atoms
            .iter()
            .filter(|a| a.category == category && flatten_title(&a.title).starts_with(&prefix));
        match hint {
            Some(hint) => {
                let hint = title_words(hint);
                let all: Vec<&Atom> = candidates.collect();
                all.iter()
                    .find(|a| contains_words(&title_words(&a.title), &hint))
                    .or_else(|| all.first())
                    .copied()
            }
            None => candidates.next(),
        }
    }

    /// Atom describing `token` in its sign. `sign` narrows the title fallback.
    pub fn planet_sign(&self, token: &str, sign: Option<&str>) -> Option<&Atom> {
        self.placement(token, AtomCategory::PlanetSign, "sign", sign)
    }

    /// Atom describing `token` in its house.
    pub fn planet_house(&self, token: &str, house: Option<u8>) -> Option<&Atom> {
        let hint = house.map(|h| h.to_string());
        self.placement(token, AtomCategory::PlanetHouse, "house", hint.as_deref())
    }

    /// Atom for an angle; tries `angle.<token>`, then the sign placement.
    pub fn angle(&self, token: &str, sign: Option<&str>) -> Option<&Atom> {
        let wanted = canonical_point(token);
        self.by_key(|parts| match parts {
            ["angle", id] | [id] => canonical_point(id) == wanted,
            _ => false,
        })
        .or_else(|| self.planet_sign(&wanted, sign))
    }

    /// Atom for an aspect between `p1` and `p2`, in either order.
    pub fn aspect(&self, p1: &str, kind: AspectKind, p2: &str) -> Option<&Atom> {
        let a = canonical_point(p1);
        let b = canonical_point(p2);
        let keyed = self.by_key(|parts| match parts {
            ["aspect", x, k, y] => {
                AspectKind::from_name(k) == Some(kind) && {
                    let (x, y) = (canonical_point(x), canonical_point(y));
                    (x == a && y == b) || (x == b && y == a)
                }
            }
            _ => false,
        });
        if keyed.is_some() {
            return keyed;
        }

        let name_a = flatten_title(&display_name(&a));
        let name_b = flatten_title(&display_name(&b));
        let kind_names = [flatten_title(kind.as_str()), flatten_title(&kind.label())];
        let wanted: Vec<String> = kind_names
            .iter()
            .flat_map(|k| {
                [
                    format!("{} {} {}", name_a, k, name_b),
                    format!("{} {} {}", name_b, k, name_a),
                ]
            })
            .collect();
        self.atoms
            .iter()
            .filter(|atom| atom.category == AtomCategory::Aspect)
            .find(|atom| {
                let title = flatten_title(&atom.title);
                wanted.iter().any(|w| title.starts_with(w.as_str()))
            })
    }

    /// Atoms outside the placement and aspect categories.
    pub fn themes(&self) -> impl Iterator<Item = &Atom> {
        self.atoms
            .iter()
            .filter(|a| a.category == AtomCategory::Other)
    }
}
