//! Background knowledge
//!
//! The caller supplies world knowledge as a predicate-name → axiom-
//! string map; axiom strings are opaque solver-syntax text. Only
//! axioms whose key predicate actually occurs in a goal are conjoined
//! onto it. The map is read-only after construction and safely shared
//! across concurrent checks.

use std::collections::{BTreeSet, HashMap};

/// Predicate-indexed axiom store
#[derive(Debug, Clone, Default)]
pub struct BackgroundKnowledge {
    axioms: HashMap<String, String>,
}

impl BackgroundKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, predicate: impl Into<String>, axiom: impl Into<String>) {
        self.axioms.insert(predicate.into(), axiom.into());
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    /// Axioms for the predicates of one goal, in predicate-name order
    /// so goal texts are deterministic.
    pub fn axioms_for(&self, predicates: &BTreeSet<String>) -> Vec<String> {
        predicates
            .iter()
            .filter_map(|p| self.axioms.get(p).cloned())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BackgroundKnowledge {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = BackgroundKnowledge::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_occurring_predicates_contribute() {
        let kb: BackgroundKnowledge = [
            ("husband", "all x (husband(x) -> man(x))"),
            ("own", "all x y (own(x,y) -> have(x,y))"),
        ]
        .into_iter()
        .collect();

        let preds: BTreeSet<String> = ["husband", "walk"].iter().map(|s| s.to_string()).collect();
        let axioms = kb.axioms_for(&preds);
        assert_eq!(axioms, vec!["all x (husband(x) -> man(x))".to_string()]);
    }

    #[test]
    fn axioms_are_ordered_by_predicate() {
        let kb: BackgroundKnowledge =
            [("b", "axiom-b"), ("a", "axiom-a")].into_iter().collect();
        let preds: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(kb.axioms_for(&preds), vec!["axiom-a", "axiom-b"]);
    }
}
