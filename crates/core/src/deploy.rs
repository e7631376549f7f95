//! Deployment orchestration
//!
//! Runs one deployment strictly in sequence:
//!
//! ```text
//! resolve distribution -> sync -> parse transcript -> build batch -> submit | skip
//! ```
//!
//! Any failure aborts the run. A failed sync never leads to an invalidation, since
//! its transcript cannot be trusted to list every changed object.

use serde::Serialize;

use crate::distribution::{DistributionRef, DistributionResolver};
use crate::error::{Error, ExternalOperation, Result};
use crate::invalidation::{BatchLimits, build_batch};
use crate::path::{InvalidationPath, derive_invalidation_path};
use crate::traits::{CdnControlPlane, SyncOutcome, SyncRequest, SyncRunner};
use crate::transcript::{TransferEvent, parse_transcript};

/// Input for one deployment run
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    /// What to sync and where
    pub sync: SyncRequest,

    /// Distribution to invalidate
    pub distribution: DistributionRef,

    /// Paths to invalidate in addition to the derived ones (e.g. `/*`)
    pub extra_paths: Vec<InvalidationPath>,
}

/// What happened to the invalidation batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvalidationOutcome {
    /// Accepted by the provider
    Submitted {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<String>,
    },
    /// Accepted, but the request identifier could not be read
    SubmittedUnconfirmed,
    /// Nothing changed, no request was sent
    Skipped,
    /// Dry run, the batch was built but not sent
    DryRun,
}

/// Non-fatal conditions reported alongside a successful deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeploymentWarning {
    /// The batch is larger than the advisory threshold
    LargeBatch { count: usize, threshold: usize },
    /// The invalidation was accepted but its response could not be parsed
    ResultParseDegraded { reason: String },
}

impl std::fmt::Display for DeploymentWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LargeBatch { count, threshold } => write!(
                f,
                "{count} paths exceed the advisory threshold of {threshold}, the request may be billed"
            ),
            Self::ResultParseDegraded { reason } => {
                write!(f, "invalidation accepted but not confirmed: {reason}")
            }
        }
    }
}

/// Outcome of a successful deployment
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub distribution_id: String,
    pub target: String,
    /// Number of transfer events in the transcript
    pub events: usize,
    pub paths: Vec<InvalidationPath>,
    pub invalidation: InvalidationOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DeploymentWarning>,
}

/// Sequences a deployment over the sync and CDN collaborators
pub struct Deployer<'a, S: ?Sized, C: ?Sized> {
    sync: &'a S,
    cdn: &'a C,
    limits: BatchLimits,
}

impl<'a, S, C> Deployer<'a, S, C>
where
    S: SyncRunner + ?Sized,
    C: CdnControlPlane + ?Sized,
{
    pub fn new(sync: &'a S, cdn: &'a C) -> Self {
        Self {
            sync,
            cdn,
            limits: BatchLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Run the full pipeline
    pub async fn run(&self, request: DeploymentRequest) -> Result<DeploymentReport> {
        let DeploymentRequest {
            sync,
            distribution,
            extra_paths,
        } = request;
        let target = sync.target.clone();

        let distribution_id = DistributionResolver::new(self.cdn)
            .resolve(&distribution)
            .await?;

        tracing::info!(
            source = %sync.source.display(),
            %target,
            dry_run = sync.dry_run,
            "syncing"
        );
        let outcome = self.sync.sync(&sync).await?;
        ensure_synced(&outcome)?;

        let events: Vec<TransferEvent> =
            parse_transcript(&outcome.transcript).collect::<Result<_>>()?;
        tracing::info!(events = events.len(), "parsed sync transcript");

        let derived = events
            .iter()
            .map(|event| derive_invalidation_path(&event.target, &target))
            .collect::<Result<Vec<_>>>()?;
        let batch = build_batch(derived.into_iter().chain(extra_paths), &self.limits)?;

        let mut warnings = Vec::new();
        if batch.over_warn_threshold() {
            warnings.push(DeploymentWarning::LargeBatch {
                count: batch.len(),
                threshold: self.limits.warn_threshold,
            });
        }

        let invalidation = if batch.is_empty() {
            tracing::info!("no changed objects, skipping invalidation");
            InvalidationOutcome::Skipped
        } else if sync.dry_run {
            tracing::info!(paths = batch.len(), "dry run, invalidation not submitted");
            InvalidationOutcome::DryRun
        } else {
            tracing::info!(
                distribution_id = %distribution_id,
                paths = batch.len(),
                "submitting invalidation"
            );
            let receipt = self.cdn.create_invalidation(&distribution_id, &batch).await?;
            match receipt.id.filter(|id| !id.is_empty()) {
                Some(id) => {
                    tracing::info!(invalidation_id = %id, "invalidation submitted");
                    InvalidationOutcome::Submitted {
                        id,
                        state: receipt.status,
                    }
                }
                None => {
                    let reason = "response carried no invalidation identifier".to_string();
                    tracing::warn!(%reason, "invalidation result degraded");
                    warnings.push(DeploymentWarning::ResultParseDegraded { reason });
                    InvalidationOutcome::SubmittedUnconfirmed
                }
            }
        };

        Ok(DeploymentReport {
            distribution_id,
            target: target.to_string(),
            events: events.len(),
            paths: batch.into_paths(),
            invalidation,
            warnings,
        })
    }
}

/// Fail on a non-successful sync, quoting the last transcript line
fn ensure_synced(outcome: &SyncOutcome) -> Result<()> {
    if outcome.success {
        return Ok(());
    }

    let status = outcome
        .status_code
        .map(|code| format!("exit status {code}"))
        .unwrap_or_else(|| "terminated".to_string());
    let last_line = outcome
        .transcript
        .split(|byte| matches!(byte, b'\n' | b'\r'))
        .rev()
        .map(|line| String::from_utf8_lossy(line).trim().to_string())
        .find(|line| !line.is_empty());

    let message = match last_line {
        Some(line) => format!("{status}: {line}"),
        None => status,
    };
    Err(Error::external(ExternalOperation::Sync, message))
}
