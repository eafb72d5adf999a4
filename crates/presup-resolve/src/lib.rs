//! Presupposition resolution
//!
//! Finds pending presupposition markers in a discourse box, generates
//! ranked candidate readings for each (binding to an existing referent
//! or accommodating new material at some scope level), and drives a
//! depth-first fixpoint search that applies one reading at a time to a
//! deep copy of the discourse until no markers remain.
//!
//! The search is single-threaded and purely functional across branches:
//! every branch owns its own copy, so the exponential fan-out needs no
//! synchronization.

pub mod driver;
pub mod generator;
pub mod reading;
pub mod roles;
pub mod trail;

pub use driver::{ResolvedReading, Resolver};
pub use generator::{generate, readings_for};
pub use reading::{AccommodationLevel, Operation, Reading, ReadingRank, ReadingStep};
pub use roles::RoleMap;
pub use trail::{probe, Trail, TrailEdge, TrailSite};

use presup_drs::{BoxId, DrsError};
use thiserror::Error;

/// Errors from reading generation and the search driver
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// A generator found no legal antecedent. Recovered per branch;
    /// surfaced only when every branch fails.
    #[error("no antecedent for {kind} '{trigger}'")]
    NoAntecedent { kind: String, trigger: String },

    /// Every branch of the search failed; the message aggregates each
    /// branch's failure text.
    #[error("resolution failed on all branches: {0}")]
    AllBranchesFailed(String),

    /// A reading addressed a box that is not present in its generation.
    #[error("reading targets unknown box {0}")]
    TargetNotFound(BoxId),

    /// Malformed input or a broken internal invariant; fatal.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Drs(#[from] DrsError),
}

/// Lexical knowledge the generators consult
///
/// The real lexical oracle (WordNet-style) is an external collaborator;
/// this trait is the seam it plugs into. The default implementations
/// are deliberately permissive.
pub trait Lexicon: Send + Sync {
    /// Feature agreement between a trigger's head feature (e.g. a
    /// gender predicate), when one is present, and a candidate's
    /// introducing predicate.
    fn agrees(&self, trigger_head: Option<&str>, candidate_head: &str) -> bool {
        let _ = (trigger_head, candidate_head);
        true
    }

    /// Head-word compatibility for definite descriptions ("the tool"
    /// against "hammer"). Defaults to exact match.
    fn compatible(&self, trigger_head: &str, candidate_head: &str) -> bool {
        trigger_head == candidate_head
    }
}

/// Accepts any feature pairing and only exact head matches
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveLexicon;

impl Lexicon for PermissiveLexicon {}
