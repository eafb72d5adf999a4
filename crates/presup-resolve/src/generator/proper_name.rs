//! Proper-name readings
//!
//! A proper name yields exactly one reading. If the outer box already
//! introduces a referent under the same name predicate, the trigger
//! binds to it: the name predication is dropped and the remaining
//! presupposed conditions move to the local site (and to the binding
//! site too, when different). Otherwise the whole presupposed box is
//! accommodated globally.

use crate::reading::{AccommodationLevel, Operation, Reading, ReadingRank, ReadingStep};
use crate::trail::Trail;
use crate::ResolveError;
use presup_drs::{Condition, Drs, PresupBox, Referent};
use tracing::debug;

pub(crate) fn readings(
    root: &Drs,
    trail: &Trail,
    presup: &PresupBox,
) -> Result<Vec<Reading>, ResolveError> {
    let head = presup.head().ok_or_else(|| {
        ResolveError::InvariantViolation(format!(
            "proper name on {} carries no name predication",
            presup.trigger
        ))
    })?;

    let outer_id = trail.outer_id();
    let outer = root
        .find_box(outer_id)
        .ok_or(ResolveError::TargetNotFound(outer_id))?;
    let antecedent = find_named(outer, &head.name, &presup.trigger);
    let local_id = trail.local_id();

    let rank = ReadingRank {
        role_overlap: 0,
        proximity: 0,
        order: 0,
    };

    let steps = match antecedent {
        Some(ante) => {
            debug!(name = %head.name, antecedent = %ante, "proper name binds in the outer box");
            let mut steps = vec![
                ReadingStep {
                    target: presup.content.id,
                    op: Operation::RemoveCondition {
                        pred: head.name.clone(),
                    },
                },
                ReadingStep {
                    target: local_id,
                    op: Operation::Bind {
                        antecedent: ante.clone(),
                    },
                },
            ];
            if outer_id != local_id {
                steps.push(ReadingStep {
                    target: outer_id,
                    op: Operation::Bind {
                        antecedent: ante.clone(),
                    },
                });
            }
            steps.push(ReadingStep {
                target: root.id,
                op: Operation::InnerReplace {
                    old: presup.trigger.clone(),
                    new: ante,
                },
            });
            steps
        }
        None => {
            debug!(name = %head.name, "proper name accommodates globally");
            vec![ReadingStep {
                target: outer_id,
                op: Operation::Accommodate {
                    level: AccommodationLevel::Global,
                },
            }]
        }
    };

    Ok(vec![Reading { steps, rank }])
}

/// A referent of `outer` introduced under the same name predicate
fn find_named(outer: &Drs, name: &str, trigger: &Referent) -> Option<Referent> {
    outer.conditions.iter().find_map(|c| match c {
        Condition::Pred(p)
            if p.is_unary() && p.name == name && p.args[0] != *trigger && outer.binds(&p.args[0]) =>
        {
            Some(p.args[0].clone())
        }
        _ => None,
    })
}
