//! Pronoun readings
//!
//! All three pronoun kinds share the candidate scan; they differ only
//! in how event participation constrains binding. A personal pronoun
//! may not corefer with a participant of its own events, a reflexive
//! must, a possessive ignores events entirely.

use super::{scan_candidates, Candidate};
use crate::reading::{Operation, Reading, ReadingRank, ReadingStep};
use crate::roles::RoleMap;
use crate::trail::Trail;
use crate::{Lexicon, ResolveError};
use presup_drs::{Drs, PresupBox, PronounKind, Referent};
use std::collections::BTreeSet;
use tracing::debug;

pub(crate) fn readings(
    root: &Drs,
    trail: &Trail,
    presup: &PresupBox,
    pk: PronounKind,
    lexicon: &dyn Lexicon,
) -> Result<Vec<Reading>, ResolveError> {
    let trigger = &presup.trigger;
    let head = presup.head().map(|p| p.name.clone());
    let mut candidates = scan_candidates(root, trail, trigger, &|h| {
        lexicon.agrees(head.as_deref(), h)
    });

    let roles = RoleMap::build_deep(root);
    match pk {
        PronounKind::Personal => {
            let trigger_events = extended_events(&roles, trigger);
            candidates.retain(|c| roles.events_of(&c.referent).is_disjoint(&trigger_events));
        }
        PronounKind::Reflexive => {
            let trigger_events = roles.events_of(trigger);
            candidates.retain(|c| !roles.events_of(&c.referent).is_disjoint(&trigger_events));
        }
        PronounKind::Possessive => {}
    }

    debug!(
        trigger = %trigger,
        kind = ?pk,
        candidates = candidates.len(),
        "pronoun candidate scan"
    );

    if candidates.is_empty() {
        return Err(ResolveError::NoAntecedent {
            kind: presup.kind.label().to_string(),
            trigger: trigger.name.clone(),
        });
    }

    let mut readings: Vec<Reading> = candidates
        .iter()
        .map(|c| binding_reading(root, trigger, c, &roles))
        .collect();
    readings.sort_by_key(|r| r.rank.key());
    Ok(readings)
}

/// The event set a personal pronoun must stay clear of. When the
/// trigger sits in exactly one event that has exactly one participant,
/// that event's own participations extend the set (chained events).
fn extended_events(roles: &RoleMap, trigger: &Referent) -> BTreeSet<Referent> {
    let mut events = roles.events_of(trigger);
    if events.len() == 1 {
        let e = events.iter().next().cloned().unwrap_or_else(|| trigger.clone());
        if roles.participants_of(&e).len() == 1 {
            events.extend(roles.events_of(&e));
        }
    }
    events
}

fn binding_reading(root: &Drs, trigger: &Referent, c: &Candidate, roles: &RoleMap) -> Reading {
    Reading {
        steps: vec![
            ReadingStep {
                target: c.box_id,
                op: Operation::Bind {
                    antecedent: c.referent.clone(),
                },
            },
            ReadingStep {
                target: root.id,
                op: Operation::InnerReplace {
                    old: trigger.clone(),
                    new: c.referent.clone(),
                },
            },
        ],
        rank: ReadingRank {
            role_overlap: roles.role_overlap(&c.referent, trigger),
            proximity: c.proximity,
            order: c.order,
        },
    }
}
