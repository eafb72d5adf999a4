//! Discourse interpretation pipeline
//!
//! Ties the resolution search and the admissibility checker together:
//! a parsed sentence is embedded into the running discourse as a
//! new-information box, every pending presupposition is resolved into
//! ranked readings, and each reading is checked for consistency,
//! informativity and local admissibility in preference order. The
//! caller receives every admitted reading (or the first, on request)
//! together with structured rejection diagnostics.
//!
//! ```no_run
//! use presup::Interpreter;
//! use presup_drs::{Drs, RefAlloc};
//! use presup_prover::RaceOracle;
//! use std::sync::Arc;
//!
//! # async fn example(discourse: Drs, sentence: Drs) -> Result<(), Box<dyn std::error::Error>> {
//! let mut alloc = RefAlloc::starting_at(1000);
//! let interpreter = Interpreter::new(Arc::new(RaceOracle::new()));
//! let admitted = interpreter.interpret(&discourse, sentence, &mut alloc).await?;
//! println!("{} admitted reading(s)", admitted.len());
//! # Ok(())
//! # }
//! ```

pub use presup_admit::{AdmissibilityChecker, AdmitError, AdmitVerdict, BackgroundKnowledge};
pub use presup_drs::{
    BoxId, Condition, Drs, DrsError, FolFormula, Predicate, PresupBox, PresupKind, PronounKind,
    RefAlloc, RefKind, Referent,
};
pub use presup_prover::{
    BuilderConfig, Decision, Goal, Oracle, OracleError, ProverConfig, RaceConfig, RaceOracle,
    Valuation,
};
pub use presup_resolve::{Lexicon, PermissiveLexicon, Reading, ResolveError, Resolver};

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the whole pipeline
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Admit(#[from] AdmitError),

    /// Every resolved reading was rejected; the message aggregates the
    /// per-reading rejection diagnostics.
    #[error("no admissible reading: {0}")]
    AllRejected(String),
}

/// One admitted interpretation of the incoming sentence
#[derive(Debug, Clone)]
pub struct Admitted {
    /// The updated discourse with the new information merged in
    pub discourse: Drs,
    /// Model of the merged discourse, when the builder produced one
    pub valuation: Option<Valuation>,
    /// Creation order of the originating reading in the search
    pub reading_order: usize,
}

/// Pipeline options
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpreterOptions {
    /// Stop at the first admitted reading instead of checking all
    pub first_only: bool,
}

/// The interpretation pipeline
pub struct Interpreter {
    resolver: Resolver,
    checker: AdmissibilityChecker,
    options: InterpreterOptions,
}

impl Interpreter {
    /// Pipeline with the permissive lexicon and no background
    /// knowledge.
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Interpreter {
            resolver: Resolver::new(),
            checker: AdmissibilityChecker::new(oracle),
            options: InterpreterOptions::default(),
        }
    }

    /// Fully configured pipeline.
    pub fn with_parts(
        lexicon: Arc<dyn Lexicon>,
        oracle: Arc<dyn Oracle>,
        knowledge: Arc<BackgroundKnowledge>,
        options: InterpreterOptions,
    ) -> Self {
        Interpreter {
            resolver: Resolver::with_lexicon(lexicon),
            checker: AdmissibilityChecker::with_knowledge(oracle, knowledge),
            options,
        }
    }

    /// Interpret one parsed sentence against the running discourse.
    pub async fn interpret(
        &self,
        discourse: &Drs,
        sentence: Drs,
        alloc: &mut RefAlloc,
    ) -> Result<Vec<Admitted>, InterpretError> {
        let combined = embed(discourse, sentence, alloc);
        let readings = self.resolver.resolve(&combined, alloc)?;
        info!(readings = readings.len(), "resolution produced readings");

        let mut admitted = Vec::new();
        let mut rejections = Vec::new();
        for reading in &readings {
            match self.checker.admit(&reading.drs, alloc).await? {
                AdmitVerdict::Admitted { merged, valuation } => {
                    admitted.push(Admitted {
                        discourse: merged,
                        valuation,
                        reading_order: reading.order,
                    });
                    if self.options.first_only {
                        break;
                    }
                }
                rejection => {
                    debug!(reading = reading.order, "reading rejected");
                    rejections.push(describe(&rejection));
                }
            }
        }

        if admitted.is_empty() {
            return Err(InterpretError::AllRejected(rejections.join("; ")));
        }
        Ok(admitted)
    }
}

/// Embed the sentence into the discourse as a new-information box,
/// alpha-renaming any referent the discourse already uses.
fn embed(discourse: &Drs, sentence: Drs, alloc: &mut RefAlloc) -> Drs {
    let mut wrapper = Drs::new(alloc);
    wrapper.push_condition(Condition::New(sentence));
    discourse.clone().merge(wrapper, alloc)
}

fn describe(verdict: &AdmitVerdict) -> String {
    match verdict {
        AdmitVerdict::Admitted { .. } => "admitted".to_string(),
        AdmitVerdict::Inconsistent { offending } => {
            format!("inconsistent: {}", offending)
        }
        AdmitVerdict::Uninformative { offending } => {
            format!("uninformative: {}", offending)
        }
        AdmitVerdict::Inadmissible { main, sub } => {
            format!("locally inadmissible: {} decides {}", main, sub)
        }
    }
}
