//! The prover/builder race
//!
//! Both engines run concurrently on the same goal under one deadline:
//! the prover hunting a refutation, the builder hunting a model. The
//! first conclusive answer wins and the loser's process is killed on
//! drop — best-effort, a failed kill is the caller's resource-leak
//! tolerance, not a correctness problem. A timed-out check is not
//! resumable; callers reissue it fresh.

use crate::builder::{BuilderBackend, BuilderConfig, BuilderOutcome};
use crate::prover::{ProverBackend, ProverConfig, ProverOutcome};
use crate::traits::{Decision, Goal, Oracle, OracleError};
use crate::translate::render_goal;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Race-level configuration
#[derive(Debug, Clone)]
pub struct RaceConfig {
    /// Shared deadline for both engines
    pub timeout: Duration,
    /// Slack on top of the deadline before the race itself gives up
    pub grace: Duration,
}

impl Default for RaceConfig {
    fn default() -> Self {
        RaceConfig {
            timeout: Duration::from_secs(30),
            grace: Duration::from_secs(3),
        }
    }
}

/// The production [`Oracle`]: a refutation prover raced against a
/// finite model builder
pub struct RaceOracle {
    prover: ProverBackend,
    builder: BuilderBackend,
    config: RaceConfig,
}

impl Default for RaceOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl RaceOracle {
    pub fn new() -> Self {
        RaceOracle {
            prover: ProverBackend::new(),
            builder: BuilderBackend::new(),
            config: RaceConfig::default(),
        }
    }

    pub fn with_config(
        prover: ProverConfig,
        builder: BuilderConfig,
        config: RaceConfig,
    ) -> Self {
        RaceOracle {
            prover: ProverBackend::with_config(prover),
            builder: BuilderBackend::with_config(builder),
            config,
        }
    }
}

#[async_trait]
impl Oracle for RaceOracle {
    async fn decide(&self, goal: &Goal) -> Result<Decision, OracleError> {
        // Both binaries must exist before anything races: a missing
        // tool is a configuration error, never a verdict.
        let prover_path = self.prover.detect().map_err(OracleError::Unavailable)?;
        let builder_path = self.builder.detect().map_err(OracleError::Unavailable)?;

        let input = render_goal(goal, self.config.timeout);
        debug!(
            axioms = goal.axioms.len(),
            input_bytes = input.len(),
            "racing prover and builder"
        );

        let prover_run = self.prover.prove(&prover_path, &input);
        let builder_run = self.builder.build(&builder_path, &input);
        tokio::pin!(prover_run, builder_run);

        let deadline = tokio::time::Instant::now() + self.config.timeout + self.config.grace;
        let mut prover_done = false;
        let mut builder_done = false;

        loop {
            tokio::select! {
                res = &mut prover_run, if !prover_done => {
                    prover_done = true;
                    match res {
                        Ok(ProverOutcome::ProofFound) => {
                            debug!("prover won: goal refuted");
                            return Ok(Decision::Unsatisfiable);
                        }
                        Ok(outcome) => debug!(?outcome, "prover inconclusive"),
                        // One engine failing at the process level must
                        // not block the other.
                        Err(e) => warn!(error = %e, "prover run failed"),
                    }
                    if builder_done {
                        warn!("both engines inconclusive; accepting without a model");
                        return Ok(Decision::Undetermined);
                    }
                }
                res = &mut builder_run, if !builder_done => {
                    builder_done = true;
                    match res {
                        Ok(BuilderOutcome::ModelFound(valuation)) => {
                            debug!(domain = valuation.domain_size, "builder won: model found");
                            return Ok(Decision::Satisfiable(valuation));
                        }
                        Ok(outcome) => debug!(?outcome, "builder inconclusive"),
                        Err(e) => warn!(error = %e, "builder run failed"),
                    }
                    if prover_done {
                        warn!("both engines inconclusive; accepting without a model");
                        return Ok(Decision::Undetermined);
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    warn!("race deadline passed; accepting without a model");
                    return Ok(Decision::Undetermined);
                }
            }
        }
    }
}
