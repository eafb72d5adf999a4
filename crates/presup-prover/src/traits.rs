//! Oracle trait and shared result types

use crate::model::Valuation;
use async_trait::async_trait;
use presup_drs::FolFormula;
use serde::Serialize;
use thiserror::Error;

/// Errors from the external tooling layer
#[derive(Debug, Error)]
pub enum OracleError {
    /// A required binary could not be located or is not executable.
    /// Configuration, not logic: never conflate with a rejection.
    #[error("external tool unavailable: {0}")]
    Unavailable(String),

    /// Both engines failed at the process level (I/O, spawn failure).
    #[error("process failure: {0}")]
    Process(String),
}

/// A first-order goal to be checked for satisfiability, optionally
/// conjoined with background axioms supplied as opaque strings in the
/// tools' input syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub formula: FolFormula,
    pub axioms: Vec<String>,
}

impl Goal {
    pub fn new(formula: FolFormula) -> Self {
        Goal {
            formula,
            axioms: Vec::new(),
        }
    }

    pub fn with_axioms(formula: FolFormula, axioms: Vec<String>) -> Self {
        Goal { formula, axioms }
    }
}

/// Outcome of one satisfiability check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Decision {
    /// The model builder produced a finite model of the goal
    Satisfiable(Valuation),
    /// The refutation prover closed the goal: its negation is a theorem
    Unsatisfiable,
    /// Both engines were inconclusive within the timeout. Callers
    /// treat this as satisfiable; the permissive default weakens the
    /// consistency guarantee and is logged when it fires.
    Undetermined,
}

impl Decision {
    /// Whether the goal passes a satisfiability gate under the
    /// permissive default
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Decision::Unsatisfiable)
    }

    pub fn valuation(&self) -> Option<&Valuation> {
        match self {
            Decision::Satisfiable(v) => Some(v),
            _ => None,
        }
    }
}

/// A decision procedure for first-order goals
///
/// Implemented by [`crate::RaceOracle`] in production and by scripted
/// mocks in checker tests.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn decide(&self, goal: &Goal) -> Result<Decision, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undetermined_counts_as_accepted() {
        assert!(Decision::Undetermined.is_accepted());
        assert!(Decision::Satisfiable(Valuation::default()).is_accepted());
        assert!(!Decision::Unsatisfiable.is_accepted());
    }

    #[test]
    fn valuation_only_on_satisfiable() {
        assert!(Decision::Satisfiable(Valuation::default()).valuation().is_some());
        assert!(Decision::Undetermined.valuation().is_none());
    }
}
