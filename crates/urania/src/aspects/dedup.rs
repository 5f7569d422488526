use crate::aspects::types::Aspect;
use crate::points::canonical_point;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    low: String,
    high: String,
    kind: &'static str,
    /// exact degree in hundredths
    degree: i64,
}

impl GroupKey {
    fn of(aspect: &Aspect) -> Option<Self> {
        let a = canonical_point(&aspect.p1);
        let b = canonical_point(&aspect.p2);
        if a == b {
            return None;
        }
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Some(Self {
            low,
            high,
            kind: aspect.kind.as_str(),
            degree: (aspect.exact_degree() * 100.0).round() as i64,
        })
    }
}

/// Collapse duplicate aspects.
///
/// Records are grouped by unordered endpoint pair, kind and exact degree; the
/// smallest orb survives. Self-pairs (including node-variant aliases of the same
/// point) are dropped. Survivors keep the position of their group's first record.
pub fn dedupe_aspects(aspects: Vec<Aspect>) -> Vec<Aspect> {
    let mut slots: Vec<Aspect> = Vec::with_capacity(aspects.len());
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for aspect in aspects {
        let Some(key) = GroupKey::of(&aspect) else {
            log::debug!(
                "dropping self-pair aspect {} {} {}",
                aspect.p1,
                aspect.kind.as_str(),
                aspect.p2
            );
            continue;
        };
        match index.get(&key) {
            Some(&slot) => {
                if aspect.orb < slots[slot].orb {
                    slots[slot] = aspect;
                }
            }
            None => {
                index.insert(key, slots.len());
                slots.push(aspect);
            }
        }
    }

    slots
}
