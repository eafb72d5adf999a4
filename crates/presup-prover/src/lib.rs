//! External prover / model-builder adapter
//!
//! Logical checks are mediated through two external command-line
//! tools: a refutation prover searching for a contradiction in the
//! goal and a finite model builder searching for a satisfying model.
//! [`RaceOracle`] runs both concurrently under one timeout and returns
//! as soon as either is conclusive; the loser is terminated
//! best-effort. When neither concludes, the goal is accepted without a
//! model: failure to prove inconsistency must never block discourse.
//!
//! Binaries are located through explicit configuration, the
//! `PRESUP_PROVER` / `PRESUP_BUILDER` environment variables, or the
//! search path; a missing binary is a configuration error, distinct
//! from any logical verdict.

pub mod builder;
pub mod model;
pub mod prover;
pub mod race;
pub mod traits;
pub mod translate;

pub use builder::{BuilderBackend, BuilderConfig, BuilderOutcome};
pub use model::{ModelValue, Valuation};
pub use prover::{ProverBackend, ProverConfig, ProverOutcome};
pub use race::{RaceConfig, RaceOracle};
pub use traits::{Decision, Goal, Oracle, OracleError};
pub use translate::render_goal;
