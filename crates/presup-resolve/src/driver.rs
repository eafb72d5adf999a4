//! Fixpoint resolution search
//!
//! Generations form a search tree: probe depth-first for the first
//! pending marker, generate its readings, apply each to a deep copy,
//! recurse. Every application strictly removes one marker, so the
//! search terminates. Branch-local antecedent failures are collected,
//! not propagated; the call fails only when no branch finishes.

use crate::generator::generate;
use crate::reading::Reading;
use crate::trail::probe;
use crate::{Lexicon, PermissiveLexicon, ResolveError};
use presup_drs::{Condition, Drs, RefAlloc};
use std::sync::Arc;
use tracing::debug;

/// A finished generation: no presupposition markers remain
#[derive(Debug, Clone)]
pub struct ResolvedReading {
    pub drs: Drs,
    /// Creation order across the whole search. Per-node ranking is
    /// realized through application order, so this is the final
    /// preference order as well.
    pub order: usize,
}

/// Drives the resolution search over one discourse tree
pub struct Resolver {
    lexicon: Arc<dyn Lexicon>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            lexicon: Arc::new(PermissiveLexicon),
        }
    }

    pub fn with_lexicon(lexicon: Arc<dyn Lexicon>) -> Self {
        Resolver { lexicon }
    }

    /// Resolve every pending presupposition of `root`.
    ///
    /// Returns the finished generations in creation order. When every
    /// branch fails, the error aggregates each branch's failure text.
    pub fn resolve(
        &self,
        root: &Drs,
        alloc: &mut RefAlloc,
    ) -> Result<Vec<ResolvedReading>, ResolveError> {
        let mut finished = Vec::new();
        let mut failures = Vec::new();
        self.resolve_rec(root.clone(), alloc, &mut finished, &mut failures)?;
        if finished.is_empty() {
            return Err(ResolveError::AllBranchesFailed(failures.join("; ")));
        }
        debug!(
            readings = finished.len(),
            failed_branches = failures.len(),
            "resolution search complete"
        );
        Ok(finished)
    }

    fn resolve_rec(
        &self,
        generation: Drs,
        alloc: &mut RefAlloc,
        finished: &mut Vec<ResolvedReading>,
        failures: &mut Vec<String>,
    ) -> Result<(), ResolveError> {
        let Some(trail) = probe(&generation) else {
            finished.push(ResolvedReading {
                order: finished.len(),
                drs: generation,
            });
            return Ok(());
        };

        let readings: Vec<Reading> = match generate(&generation, &trail, self.lexicon.as_ref()) {
            Ok(readings) => readings,
            Err(err @ ResolveError::NoAntecedent { .. }) => {
                debug!(%err, "branch discarded");
                failures.push(err.to_string());
                return Ok(());
            }
            Err(fatal) => return Err(fatal),
        };

        let before = marker_count(&generation);
        for reading in readings {
            let mut next = generation.clone();
            reading.apply(&mut next, &trail, alloc)?;
            if marker_count(&next) >= before {
                return Err(ResolveError::InvariantViolation(
                    "reading application did not consume a presupposition marker".into(),
                ));
            }
            self.resolve_rec(next, alloc, finished, failures)?;
        }
        Ok(())
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

fn marker_count(d: &Drs) -> usize {
    d.conditions
        .iter()
        .map(|c| {
            let own = usize::from(matches!(c, Condition::Presup(_)));
            own + c.sub_boxes().into_iter().map(marker_count).sum::<usize>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use presup_drs::{PresupBox, PresupKind, PronounKind, RefKind, Referent};

    fn pronoun(alloc: &mut RefAlloc, feature: &str) -> (Condition, Referent) {
        let u = alloc.fresh(RefKind::Individual);
        let mut content = Drs::new(alloc);
        content.push_referent(u.clone());
        content.push_condition(Condition::pred(feature, &[&u]));
        (
            Condition::Presup(PresupBox::new(
                PresupKind::Pronoun(PronounKind::Personal),
                u.clone(),
                content,
            )),
            u,
        )
    }

    #[test]
    fn resolved_input_is_returned_unchanged() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let x = d.bind_fresh(RefKind::Individual, &mut alloc);
        d.push_condition(Condition::pred("woman", &[&x]));

        let out = Resolver::new().resolve(&d, &mut alloc).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].drs.alpha_eq(&d));
        assert_eq!(out[0].order, 0);
    }

    #[test]
    fn single_candidate_yields_single_reading() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let x = d.bind_fresh(RefKind::Individual, &mut alloc);
        let e = d.bind_fresh(RefKind::Event, &mut alloc);
        d.push_condition(Condition::pred("woman", &[&x]));
        let (marker, u) = pronoun(&mut alloc, "female");
        d.push_condition(marker);
        d.push_condition(Condition::pred("walk", &[&e]));
        d.push_condition(Condition::pred("agent", &[&e, &u]));

        let out = Resolver::new().resolve(&d, &mut alloc).unwrap();
        assert_eq!(out.len(), 1);
        assert!(!out[0].drs.has_presupposition());
        assert!(out[0].drs.to_string().contains("agent(e2,x1)"));
    }

    #[test]
    fn two_candidates_fork_two_generations() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let a = d.bind_fresh(RefKind::Individual, &mut alloc);
        let b = d.bind_fresh(RefKind::Individual, &mut alloc);
        let e = d.bind_fresh(RefKind::Event, &mut alloc);
        d.push_condition(Condition::pred("man", &[&a]));
        d.push_condition(Condition::pred("man", &[&b]));
        let (marker, u) = pronoun(&mut alloc, "male");
        d.push_condition(marker);
        d.push_condition(Condition::pred("walk", &[&e]));
        d.push_condition(Condition::pred("agent", &[&e, &u]));

        let out = Resolver::new().resolve(&d, &mut alloc).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].order, 0);
        assert_eq!(out[1].order, 1);
        let rendered: Vec<String> = out.iter().map(|r| r.drs.to_string()).collect();
        assert!(rendered.iter().any(|s| s.contains("agent(e3,x1)")));
        assert!(rendered.iter().any(|s| s.contains("agent(e3,x2)")));
    }

    #[test]
    fn failure_is_aggregated_when_no_branch_finishes() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let e = d.bind_fresh(RefKind::Event, &mut alloc);
        let (marker, u) = pronoun(&mut alloc, "male");
        d.push_condition(marker);
        d.push_condition(Condition::pred("walk", &[&e]));
        d.push_condition(Condition::pred("agent", &[&e, &u]));

        let err = Resolver::new().resolve(&d, &mut alloc).unwrap_err();
        match err {
            ResolveError::AllBranchesFailed(msg) => {
                assert!(msg.contains("no antecedent"), "{}", msg);
            }
            other => panic!("expected aggregate failure, got {other}"),
        }
    }

    #[test]
    fn multiple_markers_resolve_in_sequence() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let a = d.bind_fresh(RefKind::Individual, &mut alloc);
        let e1 = d.bind_fresh(RefKind::Event, &mut alloc);
        let e2 = d.bind_fresh(RefKind::Event, &mut alloc);
        d.push_condition(Condition::pred("woman", &[&a]));
        let (m1, u1) = pronoun(&mut alloc, "female");
        d.push_condition(m1);
        d.push_condition(Condition::pred("sing", &[&e1]));
        d.push_condition(Condition::pred("agent", &[&e1, &u1]));
        let (m2, u2) = pronoun(&mut alloc, "female");
        d.push_condition(m2);
        d.push_condition(Condition::pred("dance", &[&e2]));
        d.push_condition(Condition::pred("agent", &[&e2, &u2]));

        let out = Resolver::new().resolve(&d, &mut alloc).unwrap();
        assert_eq!(out.len(), 1);
        let s = out[0].drs.to_string();
        assert!(s.contains("agent(e2,x1)"), "{}", s);
        assert!(s.contains("agent(e3,x1)"), "{}", s);
    }
}
