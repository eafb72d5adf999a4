//! Finite model builder backend
//!
//! Wraps a Mace-style model searcher reading the same input syntax as
//! the prover. A model of the goal set means it is satisfiable; the
//! interpretation records on stdout decode into a [`Valuation`].

use crate::model::Valuation;
use crate::prover::{locate, run_with_stdin};
use crate::traits::OracleError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the builder binary
pub const BUILDER_ENV: &str = "PRESUP_BUILDER";

const DEFAULT_BUILDER_BIN: &str = "mace";

/// Configuration for the model builder
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Explicit binary path; overrides the environment and PATH lookup
    pub path: Option<PathBuf>,
    /// Per-invocation wall-clock bound
    pub timeout: Duration,
    /// Largest domain size to search
    pub max_domain: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            path: None,
            timeout: Duration::from_secs(30),
            max_domain: 10,
        }
    }
}

/// What one builder run established
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderOutcome {
    /// A finite model was found: the input set is satisfiable
    ModelFound(Valuation),
    /// All domains up to the bound were searched without a model;
    /// evidence, not proof, of unsatisfiability
    Exhausted,
    /// Timeout or unparseable output
    Inconclusive,
}

/// Mace-style finite model builder
pub struct BuilderBackend {
    config: BuilderConfig,
}

impl Default for BuilderBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderBackend {
    pub fn new() -> Self {
        BuilderBackend {
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        BuilderBackend { config }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Locate the builder binary: explicit config path, then
    /// `PRESUP_BUILDER`, then PATH.
    pub fn detect(&self) -> Result<PathBuf, String> {
        locate(&self.config.path, BUILDER_ENV, DEFAULT_BUILDER_BIN)
    }

    /// Run the builder on the rendered goal text.
    pub async fn build(&self, path: &PathBuf, input: &str) -> Result<BuilderOutcome, OracleError> {
        let args = vec![
            "-P".to_string(),
            "-n".to_string(),
            self.config.max_domain.to_string(),
            "-t".to_string(),
            self.config.timeout.as_secs().max(1).to_string(),
        ];
        let output = run_with_stdin(path, &args, input, self.config.timeout).await?;
        let Some((stdout, _stderr)) = output else {
            debug!("builder timed out");
            return Ok(BuilderOutcome::Inconclusive);
        };
        debug!(bytes = stdout.len(), "builder finished");
        Ok(Self::parse_output(&stdout))
    }

    /// Classify builder stdout.
    pub fn parse_output(stdout: &str) -> BuilderOutcome {
        if let Some(valuation) = Valuation::parse(stdout) {
            return BuilderOutcome::ModelFound(valuation);
        }
        if stdout.contains("No models") || stdout.contains("search completed") {
            BuilderOutcome::Exhausted
        } else {
            BuilderOutcome::Inconclusive
        }
    }
}
