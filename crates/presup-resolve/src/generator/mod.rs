//! Reading generation
//!
//! One generator per presupposition kind, dispatched by tag. All of
//! them share the candidate scan: walk the trail's boxes for
//! unary-predicate introductions of individual referents, filter
//! through the lexicon, then rank by thematic-role overlap with the
//! trigger, proximity, and discovery order.

mod definite;
mod pronoun;
mod proper_name;

use crate::reading::Reading;
use crate::trail::{probe, Trail};
use crate::{Lexicon, ResolveError};
use indexmap::IndexMap;
use presup_drs::{BoxId, Condition, Drs, PresupKind, RefKind, Referent};

/// Generate the ranked readings for the presupposition at the trail
/// tip.
pub fn generate(
    root: &Drs,
    trail: &Trail,
    lexicon: &dyn Lexicon,
) -> Result<Vec<Reading>, ResolveError> {
    let presup = trail.presup(root).ok_or_else(|| {
        ResolveError::InvariantViolation("trail tip does not address a presupposition".into())
    })?;
    match presup.kind {
        PresupKind::Pronoun(pk) => pronoun::readings(root, trail, presup, pk, lexicon),
        PresupKind::ProperName => proper_name::readings(root, trail, presup),
        PresupKind::Definite => definite::readings(root, trail, presup, lexicon),
    }
}

/// Probe-then-generate; an already-resolved tree yields no readings.
pub fn readings_for(root: &Drs, lexicon: &dyn Lexicon) -> Result<Vec<Reading>, ResolveError> {
    match probe(root) {
        None => Ok(Vec::new()),
        Some(trail) => generate(root, &trail, lexicon),
    }
}

/// A possible antecedent discovered on the trail
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub referent: Referent,
    /// Unary predications introducing the referent, in surface order
    pub heads: Vec<String>,
    /// Box binding the referent
    pub box_id: BoxId,
    /// 0 = innermost trail box
    pub proximity: usize,
    /// Discovery order across the whole scan
    pub order: usize,
}

/// Scan the accessible boxes, innermost first, for individual
/// referents introduced by unary predications earlier than the walk
/// position. Accessible boxes are the trail's boxes plus the
/// antecedent of any implication whose consequent the trail passes
/// through. `accept` is the per-kind lexical filter over introducing
/// heads.
pub(crate) fn scan_candidates(
    root: &Drs,
    trail: &Trail,
    trigger: &Referent,
    accept: &dyn Fn(&str) -> bool,
) -> Vec<Candidate> {
    let mut entries: Vec<(BoxId, usize)> = Vec::new();
    for site in trail.sites().iter().rev() {
        if let crate::trail::TrailEdge::ImpConsequent { antecedent } = site.edge {
            entries.push((antecedent, usize::MAX));
        }
        entries.push((site.box_id, site.cond_index));
    }

    let mut out = Vec::new();
    let mut order = 0;
    for (proximity, (box_id, limit)) in entries.into_iter().enumerate() {
        let Some(b) = root.find_box(box_id) else {
            continue;
        };
        // Collect heads per referent in discovery order.
        let mut heads: IndexMap<Referent, Vec<String>> = IndexMap::new();
        for (idx, c) in b.conditions.iter().enumerate() {
            if idx > limit {
                break;
            }
            if let Condition::Pred(p) = c {
                if p.is_unary()
                    && p.args[0].kind == RefKind::Individual
                    && p.args[0] != *trigger
                    && b.binds(&p.args[0])
                {
                    heads.entry(p.args[0].clone()).or_default().push(p.name.clone());
                }
            }
        }
        for (referent, heads) in heads {
            if heads.iter().any(|h| accept(h)) {
                out.push(Candidate {
                    referent,
                    heads,
                    box_id: b.id,
                    proximity,
                    order,
                });
                order += 1;
            }
        }
    }
    out
}
