//! cdeploy-core: Core library for the cdeploy deployment tool
//!
//! This crate provides the deployment pipeline, including:
//! - Sync transcript parsing
//! - Invalidation path derivation and batching
//! - Distribution alias resolution
//! - Deployment orchestration
//! - Configuration and named sites
//!
//! This crate is independent of any cloud SDK. The sync tool, the CDN control
//! plane and the bucket probe are traits implemented by the adapter crate.

pub mod config;
pub mod deploy;
pub mod distribution;
pub mod error;
pub mod invalidation;
pub mod path;
pub mod site;
pub mod traits;
pub mod transcript;

pub use config::{AwsSettings, Config, ConfigManager};
pub use deploy::{
    Deployer, DeploymentReport, DeploymentRequest, DeploymentWarning, InvalidationOutcome,
};
pub use distribution::{DistributionRef, DistributionResolver};
pub use error::{Error, ExternalOperation, Result};
pub use invalidation::{BatchLimits, InvalidationBatch, build_batch};
pub use path::{BucketTarget, InvalidationPath, RemoteLocator, derive_invalidation_path};
pub use site::{Site, SiteManager};
pub use traits::{
    BucketProbe, CdnControlPlane, Distribution, InvalidationReceipt, SyncOutcome, SyncRequest,
    SyncRunner,
};
pub use transcript::{TransferEvent, TransferOperation, parse_transcript};
