//! Karttunen's local filters
//!
//! Residual connectives in an admitted-candidate discourse induce
//! (main, sub) pairs: the operand of a negation, each disjunct, and
//! for an implication both the antecedent and the antecedent-augmented
//! consequent, each paired against the discourse up to that point. A
//! reading is locally inadmissible when some main entails its sub or
//! the sub's negation.

use presup_drs::{Condition, Drs, RefAlloc};

/// A local-check pair: `main` is the accumulated context, `sub` the
/// branch it must not decide
#[derive(Debug, Clone)]
pub struct LocalPair {
    pub main: Drs,
    pub sub: Drs,
}

/// Gather every local-check pair of the tree, outermost first.
pub fn karttunen_pairs(d: &Drs, alloc: &mut RefAlloc) -> Vec<LocalPair> {
    let mut out = Vec::new();
    let empty = Drs::new(alloc);
    gather(d, &empty, alloc, &mut out);
    out
}

fn gather(d: &Drs, outer_ctx: &Drs, alloc: &mut RefAlloc, out: &mut Vec<LocalPair>) {
    let mut ctx = outer_ctx.clone();
    ctx.referents.extend(d.referents.iter().cloned());

    for c in &d.conditions {
        match c {
            Condition::Not(k) => {
                out.push(LocalPair {
                    main: ctx.clone(),
                    sub: k.clone(),
                });
                gather(k, &ctx, alloc, out);
            }
            Condition::Or(a, b) | Condition::Iff(a, b) => {
                out.push(LocalPair {
                    main: ctx.clone(),
                    sub: a.clone(),
                });
                out.push(LocalPair {
                    main: ctx.clone(),
                    sub: b.clone(),
                });
                gather(a, &ctx, alloc, out);
                gather(b, &ctx, alloc, out);
            }
            Condition::Imp(k, l) => {
                out.push(LocalPair {
                    main: ctx.clone(),
                    sub: k.clone(),
                });
                let mut augmented = k.clone();
                augmented.id = alloc.fresh_box();
                augmented.referents.extend(l.referents.iter().cloned());
                augmented.conditions.extend(l.conditions.iter().cloned());
                out.push(LocalPair {
                    main: ctx.clone(),
                    sub: augmented,
                });
                gather(k, &ctx, alloc, out);
                let mut ctx_k = ctx.clone();
                ctx_k.referents.extend(k.referents.iter().cloned());
                ctx_k.conditions.extend(k.conditions.iter().cloned());
                gather(l, &ctx_k, alloc, out);
            }
            Condition::New(n) => {
                // New boxes are spliced away before local checks run;
                // treat a straggler transparently.
                gather(n, &ctx, alloc, out);
            }
            Condition::Pred(_) | Condition::Eq(_, _) | Condition::Presup(_) => {}
        }
        ctx.push_condition(c.clone());
    }
}
