//! Bucket existence probe
//!
//! Wraps aws-sdk-s3 and implements the BucketProbe trait from cdeploy-core.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use cdeploy_core::{BucketProbe, Error, ExternalOperation, Result};

/// S3 client used to check the deployment bucket before syncing
pub struct S3BucketProbe {
    inner: aws_sdk_s3::Client,
}

impl S3BucketProbe {
    /// Create a probe from a loaded SDK configuration
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            inner: aws_sdk_s3::Client::new(config),
        }
    }
}

#[async_trait]
impl BucketProbe for S3BucketProbe {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.inner.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.as_service_error().is_some_and(|err| err.is_not_found()) {
                    return Ok(false);
                }
                Err(Error::external(
                    ExternalOperation::HeadBucket,
                    DisplayErrorContext(&e).to_string(),
                ))
            }
        }
    }
}
