//! Translation into first-order logic
//!
//! A box translates into the existential closure of its conditions; an
//! implication universally closes the antecedent's referents over the
//! conditional. The output is a plain formula AST; rendering into a
//! concrete solver syntax happens in the prover crate.

use crate::drs::{Condition, Drs};
use crate::DrsError;
use serde::Serialize;
use std::fmt;

/// First-order formula over string-named constants and variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FolFormula {
    True,
    Atom { pred: String, args: Vec<String> },
    Eq(String, String),
    Not(Box<FolFormula>),
    And(Box<FolFormula>, Box<FolFormula>),
    Or(Box<FolFormula>, Box<FolFormula>),
    Imp(Box<FolFormula>, Box<FolFormula>),
    Iff(Box<FolFormula>, Box<FolFormula>),
    Exists(String, Box<FolFormula>),
    Forall(String, Box<FolFormula>),
}

impl FolFormula {
    pub fn and(a: FolFormula, b: FolFormula) -> FolFormula {
        match (a, b) {
            (FolFormula::True, x) | (x, FolFormula::True) => x,
            (x, y) => FolFormula::And(Box::new(x), Box::new(y)),
        }
    }

    pub fn not(a: FolFormula) -> FolFormula {
        FolFormula::Not(Box::new(a))
    }

    /// Conjunction of an ordered sequence
    pub fn conjoin(items: impl IntoIterator<Item = FolFormula>) -> FolFormula {
        items
            .into_iter()
            .fold(FolFormula::True, |acc, f| FolFormula::and(acc, f))
    }
}

impl fmt::Display for FolFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolFormula::True => f.write_str("true"),
            FolFormula::Atom { pred, args } => {
                if args.is_empty() {
                    f.write_str(pred)
                } else {
                    write!(f, "{}({})", pred, args.join(","))
                }
            }
            FolFormula::Eq(a, b) => write!(f, "{} = {}", a, b),
            FolFormula::Not(x) => write!(f, "-({})", x),
            FolFormula::And(a, b) => write!(f, "({} & {})", a, b),
            FolFormula::Or(a, b) => write!(f, "({} | {})", a, b),
            FolFormula::Imp(a, b) => write!(f, "({} -> {})", a, b),
            FolFormula::Iff(a, b) => write!(f, "({} <-> {})", a, b),
            FolFormula::Exists(v, x) => write!(f, "(exists {} {})", v, x),
            FolFormula::Forall(v, x) => write!(f, "(all {} {})", v, x),
        }
    }
}

impl Drs {
    /// Translate a fully resolved tree into a first-order formula.
    ///
    /// Fails on any surviving presupposition marker: unresolved content
    /// has no truth-conditional reading.
    pub fn to_fol(&self) -> Result<FolFormula, DrsError> {
        let body = conditions_to_fol(&self.conditions)?;
        Ok(close_existentially(&self.referents, body))
    }
}

fn close_existentially(referents: &[crate::drs::Referent], body: FolFormula) -> FolFormula {
    referents.iter().rev().fold(body, |acc, r| {
        FolFormula::Exists(r.name.clone(), Box::new(acc))
    })
}

fn conditions_to_fol(conditions: &[Condition]) -> Result<FolFormula, DrsError> {
    let mut parts = Vec::with_capacity(conditions.len());
    for c in conditions {
        parts.push(condition_to_fol(c)?);
    }
    Ok(FolFormula::conjoin(parts))
}

fn condition_to_fol(c: &Condition) -> Result<FolFormula, DrsError> {
    match c {
        Condition::Pred(p) => Ok(FolFormula::Atom {
            pred: p.name.clone(),
            args: p.args.iter().map(|r| r.name.clone()).collect(),
        }),
        Condition::Eq(a, b) => Ok(FolFormula::Eq(a.name.clone(), b.name.clone())),
        Condition::Not(d) => Ok(FolFormula::not(d.to_fol()?)),
        Condition::New(d) => d.to_fol(),
        Condition::Or(a, b) => Ok(FolFormula::Or(Box::new(a.to_fol()?), Box::new(b.to_fol()?))),
        Condition::Iff(a, b) => Ok(FolFormula::Iff(
            Box::new(a.to_fol()?),
            Box::new(b.to_fol()?),
        )),
        Condition::Imp(k, l) => {
            // all x1..xn (K-conditions -> L)
            let k_body = conditions_to_fol(&k.conditions)?;
            let l_fol = l.to_fol()?;
            let imp = FolFormula::Imp(Box::new(k_body), Box::new(l_fol));
            Ok(k.referents.iter().rev().fold(imp, |acc, r| {
                FolFormula::Forall(r.name.clone(), Box::new(acc))
            }))
        }
        Condition::Presup(p) => Err(DrsError::UnresolvedPresupposition {
            kind: p.kind.label().to_string(),
            trigger: p.trigger.name.clone(),
        }),
    }
}
