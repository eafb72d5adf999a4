//! Capture-avoiding substitution, alpha-equality, merging
//!
//! The rewrite discipline mirrors a kernel-style term walk: every
//! operation returns a fresh tree, box identities are preserved, and a
//! bound referent that would capture incoming material is renamed away
//! before recursion ever reaches it.

use crate::drs::{BoxId, Condition, Drs, Predicate, PresupBox, RefAlloc, Referent};
use std::collections::BTreeSet;

impl Drs {
    /// Substitute free occurrences of `old` by `new`.
    ///
    /// If this box binds `old` itself, the substitution stops here
    /// unless `replace_bound` is set, in which case the binding
    /// occurrence is rewritten as well. A bound referent of this box
    /// equal to `new` is alpha-renamed first throughout the box, so the
    /// incoming referent is never captured.
    pub fn replace(
        &self,
        old: &Referent,
        new: &Referent,
        replace_bound: bool,
        alloc: &mut RefAlloc,
    ) -> Drs {
        if old == new {
            return self.clone();
        }
        if self.binds(old) && !replace_bound {
            return self.clone();
        }
        let mut this = self.clone();
        if this.binds(new) {
            let fresh = alloc.fresh(new.kind);
            this = this.rename(new, &fresh);
        }
        let referents = this
            .referents
            .iter()
            .map(|r| if r == old { new.clone() } else { r.clone() })
            .collect();
        let conditions = this
            .conditions
            .iter()
            .map(|c| replace_in_condition(c, old, new, replace_bound, alloc))
            .collect();
        Drs {
            id: this.id,
            referents,
            conditions,
        }
    }

    /// Unconditional renaming of every occurrence of `old` to `new`,
    /// binding occurrences included, with no capture protection.
    ///
    /// Callers either pass an allocator-fresh `new` (alpha-renaming) or
    /// deliberately identify `old` with a referent bound elsewhere in
    /// the tree (binding substitution).
    pub fn rename(&self, old: &Referent, new: &Referent) -> Drs {
        let referents = self
            .referents
            .iter()
            .map(|r| if r == old { new.clone() } else { r.clone() })
            .collect();
        let conditions = self
            .conditions
            .iter()
            .map(|c| rename_in_condition(c, old, new))
            .collect();
        Drs {
            id: self.id,
            referents,
            conditions,
        }
    }

    /// Free referents of this box, in first-occurrence order.
    ///
    /// A referent is free when some condition mentions it, no enclosing
    /// box on the path to that mention binds it, and it is not owned by
    /// a pending presupposition sub-box. Presupposition-owned referents
    /// stay visible to ancestors until a reading resolves them, so they
    /// never count as free.
    pub fn free(&self) -> Vec<Referent> {
        let mut presup_owned = BTreeSet::new();
        self.collect_presup_owned(&mut presup_owned);
        let mut bound = Vec::new();
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        self.free_into(&mut bound, &presup_owned, &mut seen, &mut out);
        out
    }

    fn collect_presup_owned(&self, out: &mut BTreeSet<Referent>) {
        for c in &self.conditions {
            if let Condition::Presup(p) = c {
                out.extend(p.content.referents.iter().cloned());
            }
            for sub in c.sub_boxes() {
                sub.collect_presup_owned(out);
            }
        }
    }

    fn free_into(
        &self,
        bound: &mut Vec<Referent>,
        presup_owned: &BTreeSet<Referent>,
        seen: &mut BTreeSet<Referent>,
        out: &mut Vec<Referent>,
    ) {
        let mark = bound.len();
        bound.extend(self.referents.iter().cloned());

        for c in &self.conditions {
            match c {
                Condition::Pred(p) => {
                    for a in &p.args {
                        note_free(a, bound, presup_owned, seen, out);
                    }
                }
                Condition::Eq(a, b) => {
                    note_free(a, bound, presup_owned, seen, out);
                    note_free(b, bound, presup_owned, seen, out);
                }
                Condition::Not(d) | Condition::New(d) => {
                    d.free_into(bound, presup_owned, seen, out);
                }
                Condition::Or(a, b) | Condition::Iff(a, b) => {
                    a.free_into(bound, presup_owned, seen, out);
                    b.free_into(bound, presup_owned, seen, out);
                }
                Condition::Imp(k, l) => {
                    // The antecedent's referents scope over the consequent.
                    k.free_into(bound, presup_owned, seen, out);
                    let inner_mark = bound.len();
                    bound.extend(k.referents.iter().cloned());
                    l.free_into(bound, presup_owned, seen, out);
                    bound.truncate(inner_mark);
                }
                Condition::Presup(p) => {
                    p.content.free_into(bound, presup_owned, seen, out);
                }
            }
        }
        bound.truncate(mark);
    }

    /// Structural equality modulo consistent renaming of bound
    /// referents. Box identities are ignored; free referents must match
    /// exactly.
    pub fn alpha_eq(&self, other: &Drs) -> bool {
        let mut map = Vec::new();
        alpha_push_boxes(self, other, &mut map)
    }

    /// Concatenate two boxes.
    ///
    /// Any referent of `other` whose name already occurs in `self` is
    /// alpha-renamed (occurrences rewritten in `other`) before the
    /// referent and condition lists are appended. The result keeps
    /// `self`'s identity; a presuppositional tag, when merging tagged
    /// boxes, is chosen by [`crate::drs::merge_kinds`] at the call
    /// site.
    pub fn merge(self, other: Drs, alloc: &mut RefAlloc) -> Drs {
        let taken: BTreeSet<String> = self.all_names();
        let mut b = other;
        let b_bound: Vec<Referent> = b.all_bound().into_iter().collect();
        for r in b_bound {
            if taken.contains(&r.name) {
                let fresh = alloc.fresh(r.kind);
                b = b.rename(&r, &fresh);
            }
        }
        let mut merged = self;
        merged.referents.extend(b.referents);
        merged.conditions.extend(b.conditions);
        merged
    }

    /// Every referent name occurring anywhere in the tree, bound or
    /// free.
    fn all_names(&self) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = self.all_bound().into_iter().map(|r| r.name).collect();
        for r in self.free() {
            out.insert(r.name);
        }
        out
    }
}

fn note_free(
    r: &Referent,
    bound: &[Referent],
    presup_owned: &BTreeSet<Referent>,
    seen: &mut BTreeSet<Referent>,
    out: &mut Vec<Referent>,
) {
    if !bound.contains(r) && !presup_owned.contains(r) && seen.insert(r.clone()) {
        out.push(r.clone());
    }
}

/// Box equality is alpha-equality; identities and referent spellings
/// are representation detail.
impl PartialEq for Drs {
    fn eq(&self, other: &Self) -> bool {
        self.alpha_eq(other)
    }
}

impl Eq for Drs {}

fn replace_in_condition(
    c: &Condition,
    old: &Referent,
    new: &Referent,
    replace_bound: bool,
    alloc: &mut RefAlloc,
) -> Condition {
    let sub = |r: &Referent| if r == old { new.clone() } else { r.clone() };
    match c {
        Condition::Pred(p) => Condition::Pred(Predicate {
            name: p.name.clone(),
            args: p.args.iter().map(sub).collect(),
        }),
        Condition::Eq(a, b) => Condition::Eq(sub(a), sub(b)),
        Condition::Not(d) => Condition::Not(d.replace(old, new, replace_bound, alloc)),
        Condition::New(d) => Condition::New(d.replace(old, new, replace_bound, alloc)),
        Condition::Or(a, b) => Condition::Or(
            a.replace(old, new, replace_bound, alloc),
            b.replace(old, new, replace_bound, alloc),
        ),
        Condition::Imp(k, l) => {
            let k2 = k.replace(old, new, replace_bound, alloc);
            // The antecedent binds into the consequent: when it binds
            // `old` and bound occurrences are off-limits, the consequent
            // is shielded too.
            let l2 = if k.binds(old) && !replace_bound {
                l.clone()
            } else {
                l.replace(old, new, replace_bound, alloc)
            };
            Condition::Imp(k2, l2)
        }
        Condition::Iff(a, b) => Condition::Iff(
            a.replace(old, new, replace_bound, alloc),
            b.replace(old, new, replace_bound, alloc),
        ),
        Condition::Presup(p) => {
            let content = p.content.replace(old, new, replace_bound, alloc);
            let trigger = if p.trigger == *old && (replace_bound || !p.content.binds(old)) {
                new.clone()
            } else {
                p.trigger.clone()
            };
            Condition::Presup(PresupBox {
                kind: p.kind,
                trigger,
                content,
            })
        }
    }
}

fn rename_in_condition(c: &Condition, old: &Referent, new: &Referent) -> Condition {
    let sub = |r: &Referent| if r == old { new.clone() } else { r.clone() };
    match c {
        Condition::Pred(p) => Condition::Pred(Predicate {
            name: p.name.clone(),
            args: p.args.iter().map(sub).collect(),
        }),
        Condition::Eq(a, b) => Condition::Eq(sub(a), sub(b)),
        Condition::Not(d) => Condition::Not(d.rename(old, new)),
        Condition::New(d) => Condition::New(d.rename(old, new)),
        Condition::Or(a, b) => Condition::Or(a.rename(old, new), b.rename(old, new)),
        Condition::Imp(a, b) => Condition::Imp(a.rename(old, new), b.rename(old, new)),
        Condition::Iff(a, b) => Condition::Iff(a.rename(old, new), b.rename(old, new)),
        Condition::Presup(p) => Condition::Presup(PresupBox {
            kind: p.kind,
            trigger: sub(&p.trigger),
            content: p.content.rename(old, new),
        }),
    }
}

/// Push the referent pairing of `a`/`b` onto `map` and compare their
/// conditions under it. The pairing is left on the map so implication
/// consequents can see antecedent bindings; callers truncate.
fn alpha_push_boxes(a: &Drs, b: &Drs, map: &mut Vec<(Referent, Referent)>) -> bool {
    if a.referents.len() != b.referents.len() || a.conditions.len() != b.conditions.len() {
        return false;
    }
    for (x, y) in a.referents.iter().zip(&b.referents) {
        if x.kind != y.kind {
            return false;
        }
        map.push((x.clone(), y.clone()));
    }
    a.conditions
        .iter()
        .zip(&b.conditions)
        .all(|(ca, cb)| alpha_eq_condition(ca, cb, map))
}

fn ref_matches(a: &Referent, b: &Referent, map: &[(Referent, Referent)]) -> bool {
    // Innermost binding wins.
    for (x, y) in map.iter().rev() {
        if x == a || y == b {
            return x == a && y == b;
        }
    }
    a == b
}

fn alpha_eq_condition(a: &Condition, b: &Condition, map: &mut Vec<(Referent, Referent)>) -> bool {
    match (a, b) {
        (Condition::Pred(p), Condition::Pred(q)) => {
            p.name == q.name
                && p.args.len() == q.args.len()
                && p.args
                    .iter()
                    .zip(&q.args)
                    .all(|(x, y)| ref_matches(x, y, map))
        }
        (Condition::Eq(a1, a2), Condition::Eq(b1, b2)) => {
            ref_matches(a1, b1, map) && ref_matches(a2, b2, map)
        }
        (Condition::Not(x), Condition::Not(y)) | (Condition::New(x), Condition::New(y)) => {
            let mark = map.len();
            let ok = alpha_push_boxes(x, y, map);
            map.truncate(mark);
            ok
        }
        (Condition::Or(x1, x2), Condition::Or(y1, y2))
        | (Condition::Iff(x1, x2), Condition::Iff(y1, y2)) => {
            let mark = map.len();
            let left = alpha_push_boxes(x1, y1, map);
            map.truncate(mark);
            let right = left && {
                let ok = alpha_push_boxes(x2, y2, map);
                map.truncate(mark);
                ok
            };
            right
        }
        (Condition::Imp(k1, l1), Condition::Imp(k2, l2)) => {
            let mark = map.len();
            // Antecedent pairings stay in scope for the consequent.
            let ok = alpha_push_boxes(k1, k2, map) && alpha_push_boxes(l1, l2, map);
            map.truncate(mark);
            ok
        }
        (Condition::Presup(p), Condition::Presup(q)) => {
            if p.kind != q.kind {
                return false;
            }
            let mark = map.len();
            let ok =
                alpha_push_boxes(&p.content, &q.content, map) && ref_matches(&p.trigger, &q.trigger, map);
            map.truncate(mark);
            ok
        }
        _ => false,
    }
}

/// Remove the condition at `index` of the box `target`, returning it.
///
/// Used by reading application, which addresses conditions by (box id,
/// index) pairs recorded on the trail.
pub fn take_condition(
    root: &mut Drs,
    target: BoxId,
    index: usize,
) -> Result<Condition, crate::DrsError> {
    let b = root
        .find_box_mut(target)
        .ok_or(crate::DrsError::UnknownBox(target))?;
    if index < b.conditions.len() {
        Ok(b.conditions.remove(index))
    } else {
        Err(crate::DrsError::NoSuchCondition {
            box_id: target,
            index,
        })
    }
}
