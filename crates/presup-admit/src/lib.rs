//! Admissibility checking
//!
//! A resolved reading is admitted into the discourse only when it is
//! consistent, informative, and clean of local entailment violations.
//! The checker is a state machine over an [`presup_prover::Oracle`]:
//! consistency first, then innermost-first informativity of every
//! new-information sub-box (spliced into its surroundings as it
//! passes), then Karttunen's local filters over the residual
//! connectives. Each terminal rejection carries the offending box for
//! diagnosis.

pub mod checker;
pub mod filters;
pub mod knowledge;

pub use checker::{AdmissibilityChecker, AdmitVerdict};
pub use filters::{karttunen_pairs, LocalPair};
pub use knowledge::BackgroundKnowledge;

use presup_drs::DrsError;
use presup_prover::OracleError;
use thiserror::Error;

/// Errors from the checking layer (as opposed to logical rejections,
/// which are verdicts)
#[derive(Debug, Error)]
pub enum AdmitError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Drs(#[from] DrsError),

    /// Malformed input, e.g. an unresolved presupposition reaching the
    /// checker
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
