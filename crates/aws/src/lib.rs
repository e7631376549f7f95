//! cdeploy-aws: AWS adapters for cdeploy
//!
//! This crate implements the collaborator traits from cdeploy-core:
//! - `CdnControlPlane` over aws-sdk-cloudfront
//! - `BucketProbe` over aws-sdk-s3
//! - `SyncRunner` by driving `aws s3 sync` as a subprocess
//!
//! It is the only crate that directly depends on the AWS SDK.

pub mod bucket;
pub mod cloudfront;
pub mod sdk;
pub mod sync;

pub use bucket::S3BucketProbe;
pub use cloudfront::CloudFrontClient;
pub use sdk::load_sdk_config;
pub use sync::AwsCliSync;
