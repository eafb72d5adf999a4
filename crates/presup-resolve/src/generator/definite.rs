//! Definite-description readings
//!
//! The richest generator. For each accessible box, innermost to
//! outermost, the trigger is matched against every unconsumed
//! compatible candidate, subject to three vetoes: the candidate may not
//! share an event with the description's relative clause, no relational
//! condition may already link candidate and trigger in either
//! direction, and the lexicon must accept the head pairing. Levels
//! without a binding contribute an accommodation reading; a binding at
//! a level suppresses accommodation there and below it.

use super::scan_candidates;
use crate::reading::{AccommodationLevel, Operation, Reading, ReadingRank, ReadingStep};
use crate::roles::RoleMap;
use crate::trail::Trail;
use crate::{Lexicon, ResolveError};
use presup_drs::{BoxId, Condition, Drs, PresupBox, Referent};
use std::collections::BTreeSet;
use tracing::debug;

fn globality(level: AccommodationLevel) -> u8 {
    match level {
        AccommodationLevel::Local => 0,
        AccommodationLevel::Intermediate => 1,
        AccommodationLevel::Global => 2,
    }
}

pub(crate) fn readings(
    root: &Drs,
    trail: &Trail,
    presup: &PresupBox,
    lexicon: &dyn Lexicon,
) -> Result<Vec<Reading>, ResolveError> {
    let trigger = &presup.trigger;
    let head = presup
        .head()
        .map(|p| p.name.clone())
        .ok_or_else(|| {
            ResolveError::InvariantViolation(format!(
                "definite description on {} carries no head predication",
                trigger
            ))
        })?;

    let discourse_roles = RoleMap::build_deep(root);
    let clause_roles = RoleMap::build_deep(&presup.content);
    let clause_events = clause_roles.events_of(trigger);

    let candidates = scan_candidates(root, trail, trigger, &|h| lexicon.compatible(&head, h));

    // Binding attempts, innermost to outermost (the scan order).
    let mut readings = Vec::new();
    let mut consumed: BTreeSet<Referent> = BTreeSet::new();
    let mut highest_binding: Option<AccommodationLevel> = None;
    for c in &candidates {
        if consumed.contains(&c.referent) {
            continue;
        }
        if !discourse_roles
            .events_of(&c.referent)
            .is_disjoint(&clause_events)
        {
            debug!(candidate = %c.referent, "skipped: shares an event with the relative clause");
            continue;
        }
        if mutually_relational(root, presup, &c.referent, trigger) {
            debug!(candidate = %c.referent, "skipped: relational condition links candidate and trigger");
            continue;
        }
        consumed.insert(c.referent.clone());
        readings.push(Reading {
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
                role_overlap: discourse_roles.role_overlap(&c.referent, trigger),
                proximity: c.proximity,
                order: c.order,
            },
        });
        let lvl = level_of(c.box_id, trail);
        highest_binding = Some(match highest_binding {
            Some(h) if globality(h) >= globality(lvl) => h,
            _ => lvl,
        });
    }
    readings.sort_by_key(|r| r.rank.key());

    // Accommodation, most global level first; a binding at level L
    // suppresses accommodation at L and every more local level.
    let local_id = trail.local_id();
    let mut order = candidates.len();
    for (level, site) in accommodation_sites(trail) {
        if let Some(h) = highest_binding {
            if globality(h) >= globality(level) {
                continue;
            }
        }
        let mut steps = Vec::new();
        if site != local_id {
            steps.push(ReadingStep {
                target: local_id,
                op: Operation::MoveTemporalConditions,
            });
        }
        steps.push(ReadingStep {
            target: site,
            op: Operation::Accommodate { level },
        });
        readings.push(Reading {
            steps,
            rank: ReadingRank {
                role_overlap: 0,
                // Ranked after every binding; global accommodation
                // outranks the more local levels.
                proximity: trail.sites().len() + (2 - globality(level)) as usize,
                order,
            },
        });
        order += 1;
    }

    Ok(readings)
}

/// The distinct accommodation sites this trail offers, most global
/// first.
fn accommodation_sites(trail: &Trail) -> Vec<(AccommodationLevel, BoxId)> {
    let mut out = vec![(AccommodationLevel::Global, trail.outer_id())];
    if let Some(a) = trail.intermediate_id() {
        if out.iter().all(|(_, id)| *id != a) {
            out.push((AccommodationLevel::Intermediate, a));
        }
    }
    let local = trail.local_id();
    if out.iter().all(|(_, id)| *id != local) {
        out.push((AccommodationLevel::Local, local));
    }
    out
}

/// Accommodation level a binding inside `box_id` counts against
fn level_of(box_id: BoxId, trail: &Trail) -> AccommodationLevel {
    if box_id == trail.outer_id() {
        AccommodationLevel::Global
    } else if trail.intermediate_id() == Some(box_id) {
        AccommodationLevel::Intermediate
    } else {
        AccommodationLevel::Local
    }
}

/// True when some relational condition already links candidate and
/// trigger, in either direction, anywhere in the discourse or inside
/// the description itself. Binding them together would make the
/// relation reflexive ("her husband" can never be her).
fn mutually_relational(root: &Drs, presup: &PresupBox, candidate: &Referent, trigger: &Referent) -> bool {
    relational_in(root, candidate, trigger) || relational_in(&presup.content, candidate, trigger)
}

fn relational_in(d: &Drs, a: &Referent, b: &Referent) -> bool {
    for c in &d.conditions {
        if let Condition::Pred(p) = c {
            if p.args.len() == 2 {
                let (x, y) = (&p.args[0], &p.args[1]);
                if (x == a && y == b) || (x == b && y == a) {
                    return true;
                }
            }
        }
        for sub in c.sub_boxes() {
            if relational_in(sub, a, b) {
                return true;
            }
        }
    }
    false
}
