//! Refutation prover backend
//!
//! Wraps an Otter-style resolution prover: goal text on stdin, proof
//! search output on stdout. A proof means the goal set is
//! unsatisfiable.

use crate::traits::OracleError;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Environment variable naming the prover binary
pub const PROVER_ENV: &str = "PRESUP_PROVER";

const DEFAULT_PROVER_BIN: &str = "otter";

/// Configuration for the refutation prover
#[derive(Debug, Clone)]
pub struct ProverConfig {
    /// Explicit binary path; overrides the environment and PATH lookup
    pub path: Option<PathBuf>,
    /// Per-invocation wall-clock bound
    pub timeout: Duration,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            path: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// What one prover run established
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProverOutcome {
    /// A refutation was found: the input set is unsatisfiable
    ProofFound,
    /// The search space was exhausted without a proof
    Exhausted,
    /// Timeout or unparseable output
    Inconclusive,
}

/// Otter-style refutation prover
pub struct ProverBackend {
    config: ProverConfig,
}

impl Default for ProverBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProverBackend {
    pub fn new() -> Self {
        ProverBackend {
            config: ProverConfig::default(),
        }
    }

    pub fn with_config(config: ProverConfig) -> Self {
        ProverBackend { config }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Locate the prover binary: explicit config path, then
    /// `PRESUP_PROVER`, then PATH.
    pub fn detect(&self) -> Result<PathBuf, String> {
        locate(&self.config.path, PROVER_ENV, DEFAULT_PROVER_BIN)
    }

    /// Run the prover on the rendered goal text.
    pub async fn prove(&self, path: &PathBuf, input: &str) -> Result<ProverOutcome, OracleError> {
        let output = run_with_stdin(path, &[], input, self.config.timeout).await?;
        let Some((stdout, stderr)) = output else {
            debug!("prover timed out");
            return Ok(ProverOutcome::Inconclusive);
        };
        if !stderr.is_empty() {
            debug!(stderr = %stderr.trim(), "prover stderr");
        }
        debug!(bytes = stdout.len(), "prover finished");
        Ok(Self::parse_output(&stdout))
    }

    /// Classify prover stdout.
    pub fn parse_output(stdout: &str) -> ProverOutcome {
        if stdout.contains("PROOF") || stdout.contains("proof found") {
            ProverOutcome::ProofFound
        } else if stdout.contains("sos list exhausted")
            || stdout.contains("Search stopped")
            || stdout.contains("search failed")
        {
            ProverOutcome::Exhausted
        } else {
            ProverOutcome::Inconclusive
        }
    }
}

/// Shared binary lookup for both engines.
pub(crate) fn locate(
    configured: &Option<PathBuf>,
    env_var: &str,
    default_bin: &str,
) -> Result<PathBuf, String> {
    let path = configured
        .clone()
        .or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .or_else(|| which::which(default_bin).ok())
        .ok_or_else(|| {
            format!(
                "{} not found: set {} or put it on PATH",
                default_bin, env_var
            )
        })?;
    if path.is_file() {
        Ok(path)
    } else if let Ok(resolved) = which::which(&path) {
        Ok(resolved)
    } else {
        Err(format!("{} is not an executable file", path.display()))
    }
}

/// Spawn `path` with `args`, feed `input` on stdin, wait for exit
/// within `timeout`. `Ok(None)` means the deadline passed; the child is
/// killed on drop, and a kill failure is deliberately swallowed.
pub(crate) async fn run_with_stdin(
    path: &PathBuf,
    args: &[String],
    input: &str,
    timeout: Duration,
) -> Result<Option<(String, String)>, OracleError> {
    let mut cmd = Command::new(path);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| OracleError::Process(format!("failed to spawn {}: {}", path.display(), e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        // A solver that exits before draining stdin still gets its
        // output read; the write failure itself is not decisive.
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            debug!(error = %e, "stdin write failed; reading output anyway");
        }
        // Closing stdin signals end of input.
        drop(stdin);
    }

    // Grace on top of the solver-side bound.
    let wait = tokio::time::timeout(timeout + Duration::from_secs(2), child.wait_with_output());
    match wait.await {
        Ok(Ok(output)) => Ok(Some((
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        ))),
        Ok(Err(e)) => Err(OracleError::Process(format!(
            "failed to read {} output: {}",
            path.display(),
            e
        ))),
        Err(_) => Ok(None),
    }
}
