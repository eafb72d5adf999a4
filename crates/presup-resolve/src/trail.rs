//! Ancestor trails
//!
//! The walk to a presupposition node accumulates an immutable stack of
//! sites: one per box on the path, recording which condition the walk
//! descended through and by which branch. Site classification (outer /
//! local / intermediate) and accommodation insertion points are both
//! derived from this stack, addressing boxes by identity.

use presup_drs::{BoxId, Condition, Drs, PresupBox};
use std::collections::HashMap;

/// The branch of a condition through which a walk descended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailEdge {
    /// Operand of a negation
    Neg,
    /// Left / right disjunct
    OrLeft,
    OrRight,
    /// Antecedent of an implication
    ImpAntecedent,
    /// Consequent of an implication; carries the antecedent's identity
    /// because the antecedent is an accommodation site for material
    /// found here
    ImpConsequent { antecedent: BoxId },
    /// Either side of a biconditional
    IffLeft,
    IffRight,
    /// New-information box
    New,
    /// Content of a presupposition box (the final site always carries
    /// this edge)
    Presup,
}

/// One step of the trail: a box, the condition index descended through,
/// and the branch taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailSite {
    pub box_id: BoxId,
    pub cond_index: usize,
    pub edge: TrailEdge,
}

/// The ancestor path from the outer box down to a presupposition node
#[derive(Debug, Clone)]
pub struct Trail {
    sites: Vec<TrailSite>,
}

impl Trail {
    pub fn sites(&self) -> &[TrailSite] {
        &self.sites
    }

    /// The site whose (box, condition index) addresses the
    /// presupposition marker itself
    pub fn tip(&self) -> &TrailSite {
        self.sites.last().expect("a trail is never empty")
    }

    /// The topmost box: the global accommodation site
    pub fn outer_id(&self) -> BoxId {
        self.sites[0].box_id
    }

    /// The nearest enclosing box, skipping through negation: a box
    /// entered via a negation edge defers to the box holding the
    /// negation.
    pub fn local_id(&self) -> BoxId {
        for i in (0..self.sites.len()).rev() {
            let entered_via_neg = i > 0 && self.sites[i - 1].edge == TrailEdge::Neg;
            if !entered_via_neg {
                return self.sites[i].box_id;
            }
        }
        self.sites[0].box_id
    }

    /// The antecedent of the innermost enclosing implication whose
    /// consequent the trail passes through, when present
    pub fn intermediate_id(&self) -> Option<BoxId> {
        self.sites.iter().rev().find_map(|s| match s.edge {
            TrailEdge::ImpConsequent { antecedent } => Some(antecedent),
            _ => None,
        })
    }

    /// The presupposition box the trail tip addresses
    pub fn presup<'a>(&self, root: &'a Drs) -> Option<&'a PresupBox> {
        let tip = self.tip();
        let parent = root.find_box(tip.box_id)?;
        match parent.conditions.get(tip.cond_index) {
            Some(Condition::Presup(p)) => Some(p),
            _ => None,
        }
    }

    /// Trail boxes outermost-first, resolved against `root`
    pub fn boxes<'a>(&self, root: &'a Drs) -> Vec<&'a Drs> {
        self.sites
            .iter()
            .filter_map(|s| root.find_box(s.box_id))
            .collect()
    }

    /// Accommodation insertion points, one per trail box: the position
    /// immediately after the condition the walk descended through, so
    /// accommodated material lands next to the presupposition it came
    /// from and proximity ranking keeps working downstream.
    pub fn insertion_points(&self) -> InsertionPoints {
        let mut map = HashMap::new();
        for s in &self.sites {
            // Innermost occurrence wins when a box repeats (it cannot,
            // ids are unique, but entry API keeps this cheap anyway).
            map.insert(s.box_id, s.cond_index + 1);
        }
        InsertionPoints { map }
    }
}

/// Cached identity-keyed insertion indices for one trail
#[derive(Debug, Clone)]
pub struct InsertionPoints {
    map: HashMap<BoxId, usize>,
}

impl InsertionPoints {
    pub fn get(&self, id: BoxId) -> Option<usize> {
        self.map.get(&id).copied()
    }
}

/// Depth-first search for the first pending presupposition, in surface
/// order, descending into presupposition content before accepting the
/// marker itself so nested triggers resolve innermost-first.
pub fn probe(root: &Drs) -> Option<Trail> {
    let mut sites = Vec::new();
    if probe_box(root, &mut sites) {
        Some(Trail { sites })
    } else {
        None
    }
}

fn probe_box(d: &Drs, sites: &mut Vec<TrailSite>) -> bool {
    for (i, c) in d.conditions.iter().enumerate() {
        let descend: Vec<(&Drs, TrailEdge)> = match c {
            Condition::Pred(_) | Condition::Eq(_, _) => continue,
            Condition::Not(inner) => vec![(inner, TrailEdge::Neg)],
            Condition::New(inner) => vec![(inner, TrailEdge::New)],
            Condition::Or(a, b) => vec![(a, TrailEdge::OrLeft), (b, TrailEdge::OrRight)],
            Condition::Iff(a, b) => vec![(a, TrailEdge::IffLeft), (b, TrailEdge::IffRight)],
            Condition::Imp(k, l) => vec![
                (k, TrailEdge::ImpAntecedent),
                (l, TrailEdge::ImpConsequent { antecedent: k.id }),
            ],
            Condition::Presup(p) => {
                sites.push(TrailSite {
                    box_id: d.id,
                    cond_index: i,
                    edge: TrailEdge::Presup,
                });
                // Nested triggers first; without one, the site just
                // pushed addresses this marker itself.
                probe_box(&p.content, sites);
                return true;
            }
        };
        for (sub, edge) in descend {
            sites.push(TrailSite {
                box_id: d.id,
                cond_index: i,
                edge,
            });
            if probe_box(sub, sites) {
                return true;
            }
            sites.pop();
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use presup_drs::{PresupKind, PronounKind, RefAlloc, RefKind};

    fn pronoun_presup(alloc: &mut RefAlloc) -> Condition {
        let x = alloc.fresh(RefKind::Individual);
        let mut content = Drs::new(alloc);
        content.push_referent(x.clone());
        content.push_condition(Condition::pred("male", &[&x]));
        Condition::Presup(PresupBox::new(
            PresupKind::Pronoun(PronounKind::Personal),
            x,
            content,
        ))
    }

    #[test]
    fn probe_finds_first_marker_in_surface_order() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        d.push_condition(Condition::pred("rain", &[]));
        d.push_condition(pronoun_presup(&mut alloc));
        d.push_condition(pronoun_presup(&mut alloc));

        let trail = probe(&d).unwrap();
        assert_eq!(trail.sites().len(), 1);
        assert_eq!(trail.tip().box_id, d.id);
        assert_eq!(trail.tip().cond_index, 1);
        assert!(trail.presup(&d).is_some());
    }

    #[test]
    fn probe_returns_none_when_resolved() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        d.push_condition(Condition::pred("rain", &[]));
        assert!(probe(&d).is_none());
    }

    #[test]
    fn local_site_skips_negation() {
        let mut alloc = RefAlloc::new();
        let mut outer = Drs::new(&mut alloc);
        let mut inner = Drs::new(&mut alloc);
        inner.push_condition(pronoun_presup(&mut alloc));
        outer.push_condition(Condition::Not(inner));

        let trail = probe(&outer).unwrap();
        assert_eq!(trail.outer_id(), outer.id);
        assert_eq!(trail.local_id(), outer.id);
    }

    #[test]
    fn intermediate_site_is_the_antecedent() {
        let mut alloc = RefAlloc::new();
        let mut outer = Drs::new(&mut alloc);
        let mut ant = Drs::new(&mut alloc);
        ant.push_condition(Condition::pred("rain", &[]));
        let ant_id = ant.id;
        let mut cons = Drs::new(&mut alloc);
        let cons_id = cons.id;
        cons.push_condition(pronoun_presup(&mut alloc));
        outer.push_condition(Condition::Imp(ant, cons));

        let trail = probe(&outer).unwrap();
        assert_eq!(trail.intermediate_id(), Some(ant_id));
        assert_eq!(trail.local_id(), cons_id);
        assert_eq!(trail.outer_id(), outer.id);
    }

    #[test]
    fn no_intermediate_inside_antecedent() {
        let mut alloc = RefAlloc::new();
        let mut outer = Drs::new(&mut alloc);
        let mut ant = Drs::new(&mut alloc);
        ant.push_condition(pronoun_presup(&mut alloc));
        let cons = Drs::new(&mut alloc);
        outer.push_condition(Condition::Imp(ant, cons));

        let trail = probe(&outer).unwrap();
        assert_eq!(trail.intermediate_id(), None);
    }

    #[test]
    fn insertion_point_follows_the_entered_condition() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        d.push_condition(Condition::pred("rain", &[]));
        d.push_condition(pronoun_presup(&mut alloc));
        d.push_condition(Condition::pred("snow", &[]));

        let trail = probe(&d).unwrap();
        let points = trail.insertion_points();
        assert_eq!(points.get(d.id), Some(2));
        assert_eq!(points.get(9999), None);
    }

    #[test]
    fn nested_triggers_probe_innermost_first() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        // A definite whose content holds a possessive trigger.
        let x = alloc.fresh(RefKind::Individual);
        let mut content = Drs::new(&mut alloc);
        content.push_referent(x.clone());
        content.push_condition(Condition::pred("donkey", &[&x]));
        content.push_condition(pronoun_presup(&mut alloc));
        let content_id = content.id;
        d.push_condition(Condition::Presup(PresupBox::new(
            PresupKind::Definite,
            x,
            content,
        )));

        let trail = probe(&d).unwrap();
        assert_eq!(trail.tip().box_id, content_id);
        assert_eq!(trail.tip().cond_index, 1);
        assert_eq!(trail.sites().len(), 2);
    }
}
