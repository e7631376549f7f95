//! Shared SDK configuration
//!
//! Profile and region come from the explicit [`AwsSettings`]; anything left unset
//! falls back to the SDK's default provider chain.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use cdeploy_core::AwsSettings;

/// Load an SDK configuration for the given settings
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }

    let config = loader.load().await;
    tracing::debug!(
        profile = settings.profile.as_deref().unwrap_or("default"),
        region = config.region().map(|r| r.as_ref()).unwrap_or("unset"),
        "loaded sdk configuration"
    );
    config
}
