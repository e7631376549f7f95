//! External collaborator traits
//!
//! The core never talks to a provider directly. The bulk sync, the CDN control
//! plane and the bucket probe are traits implemented by the AWS adapter and
//! mocked in tests.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::invalidation::InvalidationBatch;
use crate::path::BucketTarget;

/// One CDN distribution as reported by the listing query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    /// Provider-assigned identifier
    pub id: String,

    /// Provider domain name (e.g. d111111abcdef8.cloudfront.net)
    pub domain_name: String,

    /// Deployment status reported by the provider
    pub status: String,

    /// Whether the distribution is enabled
    pub enabled: bool,

    /// Configured alternate domain names
    pub aliases: Vec<String>,
}

impl Distribution {
    /// Create a distribution record with just an id and aliases
    pub fn new(id: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            id: id.into(),
            domain_name: String::new(),
            status: String::new(),
            enabled: true,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Case-sensitive exact alias match
    pub fn serves(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }
}

/// Response to an accepted invalidation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReceipt {
    /// Provider-assigned request identifier, if it could be read from the response
    pub id: Option<String>,

    /// Request status, usually `InProgress`
    pub status: Option<String>,
}

/// Everything the bulk sync needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Local directory to upload
    pub source: PathBuf,

    /// Bucket and prefix to sync into
    pub target: BucketTarget,

    /// Remove remote objects that no longer exist locally
    pub delete: bool,

    /// Exclude patterns, passed through to the sync tool
    pub exclude: Vec<String>,

    /// Report planned operations without changing anything
    pub dry_run: bool,
}

impl SyncRequest {
    pub fn new(source: impl Into<PathBuf>, target: BucketTarget) -> Self {
        Self {
            source: source.into(),
            target,
            delete: false,
            exclude: Vec::new(),
            dry_run: false,
        }
    }
}

/// Result of running the bulk sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Whether the sync reported success
    pub success: bool,

    /// Exit status of the sync tool, when known
    pub status_code: Option<i32>,

    /// Merged stdout and stderr of the sync tool, undecoded
    pub transcript: Vec<u8>,
}

/// Bulk object sync, opaque apart from its transcript
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncRunner: Send + Sync {
    /// Sync a local tree into a bucket target
    async fn sync(&self, request: &SyncRequest) -> Result<SyncOutcome>;
}

/// CDN control plane operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CdnControlPlane: Send + Sync {
    /// List every distribution in the account
    ///
    /// Implementations must return the complete listing, following pagination
    /// if the provider pages results.
    async fn list_distributions(&self) -> Result<Vec<Distribution>>;

    /// Submit an invalidation for a non-empty batch
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        batch: &InvalidationBatch,
    ) -> Result<InvalidationReceipt>;
}

/// Bucket existence check run before a deployment
#[async_trait]
pub trait BucketProbe: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;
}
