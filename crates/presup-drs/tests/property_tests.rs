//! Property-based tests for the tree model
//!
//! The key algebraic laws: alpha-renaming bound referents never changes
//! a box up to alpha-equality, substitution of a fresh referent is
//! invertible, and merging never loses conditions.

use presup_drs::{Condition, Drs, RefAlloc, RefKind, Referent};
use proptest::prelude::*;

/// Build a flat box with `n` bound referents and a predication over
/// each, plus one shared binary condition when possible.
fn flat_box(n: usize) -> (Drs, RefAlloc) {
    let mut alloc = RefAlloc::new();
    let mut d = Drs::new(&mut alloc);
    let mut refs = Vec::new();
    for _ in 0..n {
        refs.push(d.bind_fresh(RefKind::Individual, &mut alloc));
    }
    for (i, r) in refs.iter().enumerate() {
        d.push_condition(Condition::pred(format!("p{}", i), &[r]));
    }
    if refs.len() >= 2 {
        d.push_condition(Condition::pred("rel", &[&refs[0], &refs[1]]));
    }
    (d, alloc)
}

proptest! {
    #[test]
    fn alpha_renaming_is_invisible(n in 1usize..6, which in 0usize..6) {
        let (d, mut alloc) = flat_box(n);
        let target = d.referents[which % n].clone();
        let fresh = alloc.fresh(RefKind::Individual);
        let renamed = d.rename(&target, &fresh);
        prop_assert!(d.alpha_eq(&renamed));
        prop_assert!(renamed.alpha_eq(&d));
    }

    #[test]
    fn renaming_all_referents_is_invisible(n in 1usize..6) {
        let (d, mut alloc) = flat_box(n);
        let mut renamed = d.clone();
        for r in d.referents.clone() {
            let fresh = alloc.fresh(RefKind::Individual);
            renamed = renamed.rename(&r, &fresh);
        }
        prop_assert!(d.alpha_eq(&renamed));
    }

    #[test]
    fn substitution_roundtrip(n in 1usize..6) {
        // Substituting a free referent and back restores the original.
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let free: Vec<Referent> = (0..n).map(|_| alloc.fresh(RefKind::Individual)).collect();
        for (i, r) in free.iter().enumerate() {
            d.push_condition(Condition::pred(format!("q{}", i), &[r]));
        }
        let fresh = alloc.fresh(RefKind::Individual);
        let there = d.replace(&free[0], &fresh, false, &mut alloc);
        let back = there.replace(&fresh, &free[0], false, &mut alloc);
        prop_assert!(back.alpha_eq(&d));
    }

    #[test]
    fn replace_never_touches_other_bindings(n in 2usize..6) {
        let (d, mut alloc) = flat_box(n);
        let outside = alloc.fresh(RefKind::Individual);
        let replacement = alloc.fresh(RefKind::Individual);
        // `outside` does not occur; substitution is the identity and in
        // particular leaves every binding referent in place.
        let out = d.replace(&outside, &replacement, false, &mut alloc);
        prop_assert_eq!(out.referents.clone(), d.referents.clone());
        prop_assert!(out.alpha_eq(&d));
    }

    #[test]
    fn merge_preserves_all_conditions(a in 0usize..5, b in 0usize..5) {
        let mut alloc = RefAlloc::new();
        let mut left = Drs::new(&mut alloc);
        for i in 0..a {
            let r = left.bind_fresh(RefKind::Individual, &mut alloc);
            left.push_condition(Condition::pred(format!("l{}", i), &[&r]));
        }
        let mut right = Drs::new(&mut alloc);
        for i in 0..b {
            let r = right.bind_fresh(RefKind::Individual, &mut alloc);
            right.push_condition(Condition::pred(format!("r{}", i), &[&r]));
        }
        let la = left.conditions.len();
        let lb = right.conditions.len();
        let merged = left.merge(right, &mut alloc);
        prop_assert_eq!(merged.conditions.len(), la + lb);
        prop_assert_eq!(merged.referents.len(), a + b);
    }

    #[test]
    fn merged_referents_are_distinct(n in 1usize..5) {
        // Even when both operands use identical referent objects.
        let mut alloc = RefAlloc::new();
        let shared: Vec<Referent> = (0..n).map(|_| alloc.fresh(RefKind::Individual)).collect();
        let mut left = Drs::new(&mut alloc);
        let mut right = Drs::new(&mut alloc);
        for r in &shared {
            left.push_referent(r.clone());
            left.push_condition(Condition::pred("a", &[r]));
            right.push_referent(r.clone());
            right.push_condition(Condition::pred("b", &[r]));
        }
        let merged = left.merge(right, &mut alloc);
        let mut names: Vec<&str> = merged.referents.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), merged.referents.len());
    }

    #[test]
    fn free_of_closed_box_is_empty(n in 0usize..6) {
        let (d, _) = flat_box(n);
        prop_assert!(d.free().is_empty());
    }
}
