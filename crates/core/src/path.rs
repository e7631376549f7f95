//! Path parsing and derivation
//!
//! Handles the three path shapes a deployment deals with:
//! - the bucket target being deployed to (`s3://bucket[/prefix]`)
//! - remote object locators reported by the sync transcript (`s3://bucket/key`)
//! - CDN-relative invalidation paths (`/key`)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// URL scheme used by bucket targets and object locators
pub const S3_SCHEME: &str = "s3://";

/// The bucket (and optional key prefix) a local tree is synced into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTarget {
    /// Bucket name
    pub bucket: String,
    /// Key prefix without leading or trailing slashes
    pub prefix: Option<String>,
}

impl BucketTarget {
    /// Create a new BucketTarget, normalizing the prefix
    pub fn new(bucket: impl Into<String>, prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self {
            bucket: bucket.into(),
            prefix,
        }
    }

    /// Parse a target in the form `s3://bucket[/prefix]` or `bucket[/prefix]`
    pub fn parse(target: &str) -> Result<Self> {
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::InvalidTarget("Bucket target cannot be empty".into()));
        }

        let rest = if target.contains("://") {
            let url = url::Url::parse(target)?;
            if url.scheme() != "s3" {
                return Err(Error::InvalidTarget(format!(
                    "Unsupported scheme '{}' in {target}, expected s3://",
                    url.scheme()
                )));
            }
            if url.query().is_some() || url.fragment().is_some() {
                return Err(Error::InvalidTarget(format!(
                    "Bucket target must not carry a query or fragment: {target}"
                )));
            }
            // Keys are taken verbatim, url would percent-encode them
            &target[S3_SCHEME.len()..]
        } else {
            target
        };

        let (bucket, prefix) = match rest.split_once('/') {
            Some((bucket, prefix)) => (bucket, Some(prefix)),
            None => (rest, None),
        };

        if bucket.is_empty() {
            return Err(Error::InvalidTarget(format!(
                "Bucket name cannot be empty: {target}"
            )));
        }

        Ok(Self::new(bucket, prefix))
    }

    /// Locator of the sync root, as handed to the sync tool
    pub fn to_locator(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{S3_SCHEME}{}/{prefix}", self.bucket),
            None => format!("{S3_SCHEME}{}", self.bucket),
        }
    }
}

impl fmt::Display for BucketTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_locator())
    }
}

/// A fully qualified remote object locator (bucket + key)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocator {
    pub bucket: String,
    pub key: String,
}

impl RemoteLocator {
    /// Parse `s3://bucket/key`. Returns None unless both bucket and key are present.
    pub fn parse(locator: &str) -> Option<Self> {
        let rest = locator.strip_prefix(S3_SCHEME)?;
        let (bucket, key) = rest.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for RemoteLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{S3_SCHEME}{}/{}", self.bucket, self.key)
    }
}

/// A CDN-relative path, always beginning with `/`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvalidationPath(String);

impl InvalidationPath {
    /// Validate a caller-supplied path such as `/index.html` or `/*`
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(format!(
                "Invalidation path must start with '/': {path}"
            )));
        }
        if path.contains("://") {
            return Err(Error::InvalidPath(format!(
                "Invalidation path must not contain a protocol or host: {path}"
            )));
        }
        if path.contains('?') {
            return Err(Error::InvalidPath(format!(
                "Invalidation path must not carry a query string: {path}"
            )));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvalidationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a synced object to the CDN path that serves it
///
/// The `bucket[/prefix]/` part is stripped and the remainder is returned with a
/// leading `/`, byte for byte. Objects outside the target abort the deployment.
pub fn derive_invalidation_path(
    locator: &RemoteLocator,
    target: &BucketTarget,
) -> Result<InvalidationPath> {
    let outside = || Error::KeyOutsideScope {
        locator: locator.to_string(),
        scope: target.to_string(),
    };

    if locator.bucket != target.bucket {
        return Err(outside());
    }

    let relative = match &target.prefix {
        Some(prefix) => locator
            .key
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(outside)?,
        None => locator.key.as_str(),
    };

    if relative.is_empty() {
        return Err(outside());
    }

    Ok(InvalidationPath(format!("/{relative}")))
}
