//! Readings and their application
//!
//! A reading is an ordered list of (target box, operation) pairs that,
//! applied to a fresh copy of the discourse, consumes exactly one
//! presupposition marker. Application first detaches the marker from
//! its parent, then plays the steps against the tree; splice positions
//! come from the trail's identity-keyed insertion points.

use crate::trail::Trail;
use crate::ResolveError;
use presup_drs::{is_temporal_predicate, take_condition, BoxId, Condition, Drs, RefAlloc, Referent};
use serde::Serialize;

/// Scope level for accommodated material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccommodationLevel {
    Local,
    Intermediate,
    Global,
}

/// One rewriting operation against a target box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operation {
    /// Splice the presupposed content into the target with the trigger
    /// identified with `antecedent`
    Bind { antecedent: Referent },
    /// Splice the presupposed content into the target unchanged
    Accommodate { level: AccommodationLevel },
    /// Rewrite occurrences of `old` to `new` inside the target box
    InnerReplace { old: Referent, new: Referent },
    /// Move the temporal relations of the presupposed content into the
    /// target (they anchor locally even when the rest accommodates
    /// globally)
    MoveTemporalConditions,
    /// Drop a predication by name from the presupposed content (a
    /// proper name bound in the outer box keeps a single name
    /// condition)
    RemoveCondition { pred: String },
}

/// A reading step: which box, which operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingStep {
    pub target: BoxId,
    pub op: Operation,
}

/// Ranking signals, compared lexicographically: more role overlap, then
/// closer, then earlier discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingRank {
    pub role_overlap: usize,
    pub proximity: usize,
    pub order: usize,
}

impl ReadingRank {
    pub fn key(&self) -> (std::cmp::Reverse<usize>, usize, usize) {
        (std::cmp::Reverse(self.role_overlap), self.proximity, self.order)
    }
}

/// One candidate resolution of one presupposition marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub steps: Vec<ReadingStep>,
    pub rank: ReadingRank,
}

impl Reading {
    /// Apply this reading to `root`, consuming the marker addressed by
    /// `trail`. The tree must be the same generation the trail was
    /// computed against; box identities mediate every lookup.
    pub fn apply(
        &self,
        root: &mut Drs,
        trail: &Trail,
        _alloc: &mut RefAlloc,
    ) -> Result<(), ResolveError> {
        let tip = trail.tip();
        let cond = take_condition(root, tip.box_id, tip.cond_index)?;
        let Condition::Presup(mut presup) = cond else {
            return Err(ResolveError::InvariantViolation(
                "trail tip does not address a presupposition marker".into(),
            ));
        };

        let points = trail.insertion_points();
        // Referents move once; later steps against further targets copy
        // conditions only.
        let mut referents_placed = false;

        for step in &self.steps {
            match &step.op {
                Operation::RemoveCondition { pred } => {
                    presup
                        .content
                        .conditions
                        .retain(|c| !matches!(c, Condition::Pred(p) if p.name == *pred));
                }
                Operation::MoveTemporalConditions => {
                    let (moved, kept): (Vec<Condition>, Vec<Condition>) = presup
                        .content
                        .conditions
                        .drain(..)
                        .partition(|c| {
                            matches!(c, Condition::Pred(p) if is_temporal_predicate(&p.name))
                        });
                    presup.content.conditions = kept;
                    splice(root, step.target, &points, tip, Vec::new(), moved)?;
                }
                Operation::Bind { antecedent } => {
                    let bound = presup.content.rename(&presup.trigger, antecedent);
                    let referents: Vec<Referent> = if referents_placed {
                        Vec::new()
                    } else {
                        bound
                            .referents
                            .iter()
                            .filter(|r| *r != antecedent)
                            .cloned()
                            .collect()
                    };
                    referents_placed = true;
                    splice(root, step.target, &points, tip, referents, bound.conditions)?;
                }
                Operation::Accommodate { .. } => {
                    let referents = if referents_placed {
                        Vec::new()
                    } else {
                        presup.content.referents.clone()
                    };
                    referents_placed = true;
                    splice(
                        root,
                        step.target,
                        &points,
                        tip,
                        referents,
                        presup.content.conditions.clone(),
                    )?;
                }
                Operation::InnerReplace { old, new } => {
                    let target = root
                        .find_box_mut(step.target)
                        .ok_or(ResolveError::TargetNotFound(step.target))?;
                    let rewritten = target.rename(old, new);
                    *target = rewritten;
                }
            }
        }
        Ok(())
    }
}

/// Insert referents and conditions into `target` at the trail's
/// insertion point for it (end of box when the trail never passed
/// through it). The index is adjusted for the marker already removed
/// from its parent box.
fn splice(
    root: &mut Drs,
    target: BoxId,
    points: &crate::trail::InsertionPoints,
    tip: &crate::trail::TrailSite,
    referents: Vec<Referent>,
    conditions: Vec<Condition>,
) -> Result<(), ResolveError> {
    let b = root
        .find_box_mut(target)
        .ok_or(ResolveError::TargetNotFound(target))?;
    let mut idx = points.get(target).unwrap_or(b.conditions.len());
    if target == tip.box_id && idx > tip.cond_index {
        idx -= 1;
    }
    let idx = idx.min(b.conditions.len());
    b.referents.extend(referents);
    for (k, c) in conditions.into_iter().enumerate() {
        b.conditions.insert(idx + k, c);
    }
    Ok(())
}
