//! Resolve chart markup elements to domain tokens.
//!
//! Chart markup names things inconsistently, so resolution is a fixed,
//! ordered list of heuristics. It is best effort: an element none of them
//! recognise simply has no token.

use crate::dom::{Document, NodeId};
use crate::points::{canonical_point, is_known_point, vocabulary_match};
use crate::zodiac::{find_sign, sign_meta};
use regex::Regex;
use serde::Serialize;

lazy_static::lazy_static! {
    static ref STRUCTURED_ID: Regex =
        Regex::new(r"(?i)^(?:chart[-_])?(planet|body|point|angle|sign|house)[-_]([a-z0-9_\-]+)$")
            .expect("structured id pattern");
}

const EXPLICIT_BODY_ATTRS: &[&str] = &["data-planet", "data-body", "data-point"];
const GLYPH_SUFFIXES: &[&str] = &["-glyph", "-symbol", "_glyph", "_symbol"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ChartToken {
    /// Canonical point token (`sun`, `north_node`, `ascendant`...).
    Body(String),
    /// Sign name, capitalized.
    Sign(String),
    House(u8),
}

impl ChartToken {
    pub fn is_body(&self) -> bool {
        matches!(self, ChartToken::Body(_))
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ChartToken::Body(t) => Some(t),
            _ => None,
        }
    }

    /// Classify free text: a point name, a sign name or a house number.
    pub fn from_text(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if is_known_point(raw) {
            return Some(ChartToken::Body(canonical_point(raw)));
        }
        if let Some((index, _)) = find_sign(raw) {
            return Some(ChartToken::Sign(sign_meta(index).name.clone()));
        }
        let digits = raw.trim_start_matches(|c: char| {
            c.is_ascii_alphabetic() || c == '-' || c == '_' || c == ' '
        });
        house_number(digits).map(ChartToken::House)
    }
}

fn house_number(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|h| (1..=12).contains(h))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionStrategy {
    ExplicitAttribute,
    StructuredId,
    SuffixPattern,
    VocabularySubstring,
}

pub const STRATEGIES: [ResolutionStrategy; 4] = [
    ResolutionStrategy::ExplicitAttribute,
    ResolutionStrategy::StructuredId,
    ResolutionStrategy::SuffixPattern,
    ResolutionStrategy::VocabularySubstring,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub token: ChartToken,
    pub strategy: ResolutionStrategy,
    /// The element that carried the naming, which may be an ancestor of the
    /// one that was hit.
    pub node: NodeId,
}

impl ResolutionStrategy {
    pub fn apply(&self, doc: &Document, node: NodeId) -> Option<ChartToken> {
        let element = doc.element(node)?;
        match self {
            ResolutionStrategy::ExplicitAttribute => {
                for attr in EXPLICIT_BODY_ATTRS {
                    if let Some(v) = element.attr(attr).filter(|v| !v.trim().is_empty()) {
                        return Some(ChartToken::Body(canonical_point(v)));
                    }
                }
                if let Some(v) = element.attr("data-sign") {
                    if let Some((index, _)) = find_sign(v) {
                        return Some(ChartToken::Sign(sign_meta(index).name.clone()));
                    }
                }
                if let Some(h) = element.attr("data-house").and_then(house_number) {
                    return Some(ChartToken::House(h));
                }
                element.attr("data-token").and_then(ChartToken::from_text)
            }
            ResolutionStrategy::StructuredId => {
                let id = element.attr("id")?;
                let caps = STRUCTURED_ID.captures(id.trim())?;
                let (kind, rest) = (caps[1].to_lowercase(), &caps[2]);
                match kind.as_str() {
                    "sign" => {
                        find_sign(rest).map(|(i, _)| ChartToken::Sign(sign_meta(i).name.clone()))
                    }
                    "house" => house_number(rest).map(ChartToken::House),
                    _ => {
                        let token = canonical_point(rest);
                        is_known_point(&token).then_some(ChartToken::Body(token))
                    }
                }
            }
            ResolutionStrategy::SuffixPattern => names(element.attr("id"), element.attr("class"))
                .into_iter()
                .find_map(|name| {
                    let lower = name.to_lowercase();
                    let stem = GLYPH_SUFFIXES
                        .iter()
                        .find_map(|suffix| lower.strip_suffix(suffix))?;
                    // `planet-sun-glyph` names the body in its last segment
                    let last = stem.rsplit(|c: char| c == '-' || c == '_').next().unwrap_or(stem);
                    let found = [stem, last].into_iter().find_map(|candidate| {
                        if is_known_point(candidate) {
                            Some(ChartToken::Body(canonical_point(candidate)))
                        } else {
                            find_sign(candidate)
                                .map(|(i, _)| ChartToken::Sign(sign_meta(i).name.clone()))
                        }
                    });
                    found
                }),
            ResolutionStrategy::VocabularySubstring => {
                names(element.attr("id"), element.attr("class"))
                    .into_iter()
                    .find_map(vocabulary_match)
                    .map(|token| ChartToken::Body(token.to_string()))
            }
        }
    }
}

fn names<'a>(id: Option<&'a str>, class: Option<&'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = id.into_iter().collect();
    out.extend(class.unwrap_or("").split_whitespace());
    out
}

/// Try every strategy, in order, on the element itself.
pub fn resolve_element(doc: &Document, node: NodeId) -> Option<Resolution> {
    STRATEGIES.iter().find_map(|strategy| {
        strategy.apply(doc, node).map(|token| Resolution {
            token,
            strategy: *strategy,
            node,
        })
    })
}

/// Resolve the element, then each ancestor up to and including `stop`.
pub fn resolve_with_ancestors(doc: &Document, node: NodeId, stop: NodeId) -> Option<Resolution> {
    if let Some(found) = resolve_element(doc, node) {
        return Some(found);
    }
    if node == stop {
        return None;
    }
    for ancestor in doc.ancestors(node) {
        if let Some(found) = resolve_element(doc, ancestor) {
            return Some(found);
        }
        if ancestor == stop {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_child(markup: &str) -> (Document, NodeId) {
        let doc = Document::parse(markup).unwrap();
        let child = doc.children(doc.root())[0];
        (doc, child)
    }

    #[test]
    fn test_strategies_in_order() {
        let (doc, n) = first_child(r#"<svg><g data-planet="True_Node" id="planet-moon"/></svg>"#);
        let r = resolve_element(&doc, n).unwrap();
        assert_eq!(r.token, ChartToken::Body("north_node".into()));
        assert_eq!(r.strategy, ResolutionStrategy::ExplicitAttribute);

        let (doc, n) = first_child(r#"<svg><g id="chart-planet-moon"/></svg>"#);
        assert_eq!(resolve_element(&doc, n).unwrap().strategy, ResolutionStrategy::StructuredId);

        let (doc, n) = first_child(r#"<svg><path class="glyph mars-symbol"/></svg>"#);
        let r = resolve_element(&doc, n).unwrap();
        assert_eq!(r.token, ChartToken::Body("mars".into()));
        assert_eq!(r.strategy, ResolutionStrategy::SuffixPattern);

        let (doc, n) = first_child(r#"<svg><path id="wheel-venus-x"/></svg>"#);
        let r = resolve_element(&doc, n).unwrap();
        assert_eq!(r.token, ChartToken::Body("venus".into()));
        assert_eq!(r.strategy, ResolutionStrategy::VocabularySubstring);
    }

    #[test]
    fn test_suffix_names_body_or_sign() {
        let (doc, n) = first_child(r#"<svg><path id="planet-sun-glyph"/></svg>"#);
        let r = resolve_element(&doc, n).unwrap();
        assert_eq!(r.token, ChartToken::Body("sun".into()));
        assert_eq!(r.strategy, ResolutionStrategy::SuffixPattern);

        let (doc, n) = first_child(r#"<svg><text class="Leo_Symbol">L</text></svg>"#);
        let r = resolve_element(&doc, n).unwrap();
        assert_eq!(r.token, ChartToken::Sign("Leo".into()));
        assert_eq!(r.strategy, ResolutionStrategy::SuffixPattern);
    }

    #[test]
    fn test_signs_houses_and_angles() {
        let (doc, n) = first_child(r#"<svg><path id="sign_aries"/></svg>"#);
        assert_eq!(resolve_element(&doc, n).unwrap().token, ChartToken::Sign("Aries".into()));
        let (doc, n) = first_child(r#"<svg><path id="house-7"/></svg>"#);
        assert_eq!(resolve_element(&doc, n).unwrap().token, ChartToken::House(7));
        let (doc, n) = first_child(r#"<svg><text data-point="asc">AC</text></svg>"#);
        assert_eq!(resolve_element(&doc, n).unwrap().token, ChartToken::Body("ascendant".into()));
        let (doc, n) = first_child(r#"<svg><rect id="background"/></svg>"#);
        assert_eq!(resolve_element(&doc, n), None);
    }
}
