//! CloudFront control plane
//!
//! Wraps aws-sdk-cloudfront and implements the CdnControlPlane trait from
//! cdeploy-core. The listing follows `NextMarker` until the provider reports the
//! list is complete, so alias resolution always sees every distribution.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{DistributionSummary, InvalidationBatch as SdkBatch, Paths};
use cdeploy_core::{
    CdnControlPlane, Distribution, Error, ExternalOperation, InvalidationBatch,
    InvalidationReceipt, Result,
};

/// CloudFront is a global service signed in this region
const CLOUDFRONT_REGION: &str = "us-east-1";

/// CloudFront client wrapper
pub struct CloudFrontClient {
    inner: aws_sdk_cloudfront::Client,
}

impl CloudFrontClient {
    /// Create a client from a loaded SDK configuration
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        let cf_config = aws_sdk_cloudfront::config::Builder::from(config)
            .region(Region::new(CLOUDFRONT_REGION))
            .build();

        Self {
            inner: aws_sdk_cloudfront::Client::from_conf(cf_config),
        }
    }
}

#[async_trait]
impl CdnControlPlane for CloudFrontClient {
    async fn list_distributions(&self) -> Result<Vec<Distribution>> {
        let mut distributions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .inner
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    Error::external(
                        ExternalOperation::ListDistributions,
                        DisplayErrorContext(&e).to_string(),
                    )
                })?;

            let Some(list) = response.distribution_list() else {
                break;
            };
            distributions.extend(list.items().iter().map(to_distribution));

            match list.next_marker() {
                Some(next) if list.is_truncated() && !next.is_empty() => {
                    marker = Some(next.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(count = distributions.len(), "listed distributions");
        Ok(distributions)
    }

    async fn create_invalidation(
        &self,
        distribution_id: &str,
        batch: &InvalidationBatch,
    ) -> Result<InvalidationReceipt> {
        let failed =
            |message: String| Error::external(ExternalOperation::CreateInvalidation, message);

        let items: Vec<String> = batch
            .paths()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        let quantity = i32::try_from(items.len())
            .map_err(|_| failed(format!("{} paths do not fit one request", items.len())))?;

        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(items))
            .build()
            .map_err(|e| failed(e.to_string()))?;
        let sdk_batch = SdkBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference(jiff::Timestamp::now(), batch.len()))
            .build()
            .map_err(|e| failed(e.to_string()))?;

        let response = self
            .inner
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(sdk_batch)
            .send()
            .await
            .map_err(|e| failed(DisplayErrorContext(&e).to_string()))?;

        let invalidation = response.invalidation();
        if invalidation.is_none() {
            tracing::warn!(
                location = response.location().unwrap_or_default(),
                "invalidation response carried no invalidation record"
            );
        }

        Ok(InvalidationReceipt {
            id: invalidation.map(|i| i.id().to_string()),
            status: invalidation.map(|i| i.status().to_string()),
        })
    }
}

fn to_distribution(summary: &DistributionSummary) -> Distribution {
    Distribution {
        id: summary.id().to_string(),
        domain_name: summary.domain_name().to_string(),
        status: summary.status().to_string(),
        enabled: summary.enabled(),
        aliases: summary
            .aliases()
            .map(|aliases| aliases.items().to_vec())
            .unwrap_or_default(),
    }
}

/// Unique token the provider uses to deduplicate invalidation requests
fn caller_reference(now: jiff::Timestamp, paths: usize) -> String {
    format!("cdeploy-{}-{paths}", now.as_millisecond())
}
