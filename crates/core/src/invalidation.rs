//! Invalidation batch construction
//!
//! Derived paths are deduplicated into one batch per deployment. The batch is
//! never truncated: a batch over the provider ceiling fails the deployment, since
//! a partial invalidation would report success while serving stale objects.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::InvalidationPath;

/// Paths per month the provider invalidates without charge
pub const DEFAULT_WARN_THRESHOLD: usize = 1000;

/// Maximum paths the provider accepts in one invalidation request
pub const DEFAULT_MAX_PATHS: usize = 3000;

/// Size limits applied when building a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLimits {
    /// Advisory threshold, exceeding it is reported but allowed
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: usize,

    /// Hard ceiling, exceeding it fails the build
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
}

fn default_warn_threshold() -> usize {
    DEFAULT_WARN_THRESHOLD
}

fn default_max_paths() -> usize {
    DEFAULT_MAX_PATHS
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            warn_threshold: default_warn_threshold(),
            max_paths: default_max_paths(),
        }
    }
}

/// Duplicate-free set of paths, consumed once by the submission call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationBatch {
    paths: Vec<InvalidationPath>,
    #[serde(skip)]
    over_warn_threshold: bool,
}

impl InvalidationBatch {
    pub fn paths(&self) -> &[InvalidationPath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// An empty batch means no invalidation is necessary
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the batch exceeded the advisory threshold
    pub fn over_warn_threshold(&self) -> bool {
        self.over_warn_threshold
    }

    pub fn into_paths(self) -> Vec<InvalidationPath> {
        self.paths
    }
}

/// Build a batch from candidate paths
///
/// Duplicates are removed by exact string equality; first-seen order is kept so
/// logs and reports are deterministic.
pub fn build_batch(
    paths: impl IntoIterator<Item = InvalidationPath>,
    limits: &BatchLimits,
) -> Result<InvalidationBatch> {
    let mut seen = HashSet::new();
    let paths: Vec<InvalidationPath> = paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect();

    let count = paths.len();
    if count > limits.max_paths {
        return Err(Error::BatchTooLarge {
            count,
            max: limits.max_paths,
        });
    }

    let over_warn_threshold = count > limits.warn_threshold;
    if over_warn_threshold {
        tracing::warn!(
            count,
            threshold = limits.warn_threshold,
            "invalidation batch exceeds the advisory threshold"
        );
    }

    Ok(InvalidationBatch {
        paths,
        over_warn_threshold,
    })
}
