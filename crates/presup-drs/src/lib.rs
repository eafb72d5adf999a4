//! Discourse representation structures
//!
//! A discourse is modelled as a nested box: a list of typed discourse
//! referents together with an ordered list of conditions, some of which
//! embed further boxes. Presupposition triggers are carried as tagged
//! sub-boxes until a resolver binds or accommodates them.
//!
//! The crate provides:
//! - the box/condition/referent model (`drs`),
//! - capture-avoiding substitution, alpha-equality and box merging
//!   (`subst`),
//! - translation into a plain first-order formula AST (`fol`), which
//!   downstream crates render into concrete solver syntax.
//!
//! Condition order is semantically significant everywhere: proximity
//! ranking and accommodation insertion points depend on it, so no
//! operation in this crate reorders conditions.

pub mod drs;
pub mod fol;
pub mod subst;

pub use drs::{
    is_temporal_predicate, merge_kinds, BoxId, Condition, Drs, Predicate, PresupBox, PresupKind,
    PronounKind, RefAlloc, RefKind, Referent,
};
pub use fol::FolFormula;
pub use subst::take_condition;

use thiserror::Error;

/// Errors raised by the tree model
#[derive(Debug, Clone, Error)]
pub enum DrsError {
    /// A box still carrying a presupposition marker reached a context
    /// that requires fully resolved content (e.g. formula translation).
    #[error("unresolved {kind} presupposition on {trigger} cannot be translated")]
    UnresolvedPresupposition { kind: String, trigger: String },

    /// A box addressed by identity was not present in the tree.
    #[error("no box with id {0} in this tree")]
    UnknownBox(BoxId),

    /// A condition address ran past the end of its box.
    #[error("box {box_id} has no condition at index {index}")]
    NoSuchCondition { box_id: BoxId, index: usize },
}
