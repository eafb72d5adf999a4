//! Rendering goals into the solvers' input syntax
//!
//! Both tools read the same Otter-family first-order syntax, so one
//! rendering serves the prover and the builder: the axioms and the
//! goal formula in a `formula_list(usable)` block, with an automatic
//! search mode and a solver-side time bound slightly under the
//! adapter's own timeout.

use crate::traits::Goal;
use presup_drs::FolFormula;
use std::time::Duration;

/// Render a full input file for either engine.
pub fn render_goal(goal: &Goal, timeout: Duration) -> String {
    let mut out = String::new();
    out.push_str("set(auto).\n");
    out.push_str(&format!(
        "assign(max_seconds, {}).\n\n",
        timeout.as_secs().max(1)
    ));
    out.push_str("formula_list(usable).\n");
    for axiom in &goal.axioms {
        let axiom = axiom.trim();
        if axiom.is_empty() {
            continue;
        }
        out.push_str(axiom);
        if !axiom.ends_with('.') {
            out.push('.');
        }
        out.push('\n');
    }
    out.push_str(&render_formula(&goal.formula));
    out.push_str(".\nend_of_list.\n");
    out
}

/// Render one formula in Otter syntax.
pub fn render_formula(f: &FolFormula) -> String {
    match f {
        FolFormula::True => "$T".to_string(),
        FolFormula::Atom { pred, args } => {
            if args.is_empty() {
                pred.clone()
            } else {
                format!("{}({})", pred, args.join(","))
            }
        }
        FolFormula::Eq(a, b) => format!("({} = {})", a, b),
        FolFormula::Not(x) => format!("(-({}))", render_formula(x)),
        FolFormula::And(a, b) => format!("({} & {})", render_formula(a), render_formula(b)),
        FolFormula::Or(a, b) => format!("({} | {})", render_formula(a), render_formula(b)),
        FolFormula::Imp(a, b) => format!("({} -> {})", render_formula(a), render_formula(b)),
        FolFormula::Iff(a, b) => format!("({} <-> {})", render_formula(a), render_formula(b)),
        FolFormula::Exists(v, x) => format!("(exists {} {})", v, render_formula(x)),
        FolFormula::Forall(v, x) => format!("(all {} {})", v, render_formula(x)),
    }
}
