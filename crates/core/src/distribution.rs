//! Distribution references and alias resolution
//!
//! A deployment names its distribution either by provider identifier or by one
//! of the hostnames it serves. Aliases are resolved against a complete listing
//! and must match exactly one distribution.

use std::fmt;

use crate::error::{Error, Result};
use crate::traits::CdnControlPlane;

/// Minimum length of a provider distribution identifier
const MIN_ID_LEN: usize = 8;

/// How the caller named the distribution to invalidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionRef {
    /// Raw provider identifier, used as-is
    Id(String),
    /// Hostname to resolve through the listing query
    Alias(String),
}

impl DistributionRef {
    /// Classify a reference by the provider's identifier shape
    ///
    /// Identifiers are upper-case alphanumeric tokens such as `E2QWRUHAPOMQZL`;
    /// anything else is treated as an alias.
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(Error::InvalidTarget(
                "Distribution reference cannot be empty".into(),
            ));
        }

        if looks_like_distribution_id(reference) {
            Ok(Self::Id(reference.to_string()))
        } else {
            Ok(Self::Alias(reference.to_string()))
        }
    }
}

impl fmt::Display for DistributionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::Alias(alias) => f.write_str(alias),
        }
    }
}

fn looks_like_distribution_id(value: &str) -> bool {
    value.len() >= MIN_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Resolves aliases against the CDN control plane
pub struct DistributionResolver<'a, C: ?Sized> {
    control_plane: &'a C,
}

impl<'a, C: CdnControlPlane + ?Sized> DistributionResolver<'a, C> {
    pub fn new(control_plane: &'a C) -> Self {
        Self { control_plane }
    }

    /// Return the identifier of the one distribution serving `alias`
    ///
    /// No match fails with [`Error::NoDistributionForAlias`]; several matches fail
    /// with [`Error::AmbiguousAlias`] listing every matching identifier.
    pub async fn resolve_by_alias(&self, alias: &str) -> Result<String> {
        let distributions = self.control_plane.list_distributions().await?;
        tracing::debug!(
            alias,
            listed = distributions.len(),
            "resolving distribution alias"
        );

        let mut ids: Vec<String> = distributions
            .into_iter()
            .filter(|d| d.serves(alias))
            .map(|d| d.id)
            .collect();

        match ids.len() {
            0 => Err(Error::NoDistributionForAlias(alias.to_string())),
            1 => {
                let id = ids.remove(0);
                tracing::info!(alias, distribution_id = %id, "resolved distribution alias");
                Ok(id)
            }
            _ => Err(Error::AmbiguousAlias {
                alias: alias.to_string(),
                ids,
            }),
        }
    }

    /// Return the identifier for any reference, querying only for aliases
    pub async fn resolve(&self, reference: &DistributionRef) -> Result<String> {
        match reference {
            DistributionRef::Id(id) => Ok(id.clone()),
            DistributionRef::Alias(alias) => self.resolve_by_alias(alias).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExternalOperation;
    use crate::traits::{Distribution, MockCdnControlPlane};

    fn control_plane(distributions: Vec<Distribution>) -> MockCdnControlPlane {
        let mut mock = MockCdnControlPlane::new();
        mock.expect_list_distributions()
            .times(1)
            .returning(move || Ok(distributions.clone()));
        mock
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            DistributionRef::parse("E2QWRUHAPOMQZL").unwrap(),
            DistributionRef::Id("E2QWRUHAPOMQZL".into())
        );
        assert_eq!(
            DistributionRef::parse("www.example.com").unwrap(),
            DistributionRef::Alias("www.example.com".into())
        );
        assert_eq!(
            DistributionRef::parse("E2QW").unwrap(),
            DistributionRef::Alias("E2QW".into())
        );
        assert_eq!(
            DistributionRef::parse("e2qwruhapomqzl").unwrap(),
            DistributionRef::Alias("e2qwruhapomqzl".into())
        );
        assert!(DistributionRef::parse("  ").is_err());
    }

    #[tokio::test]
    async fn test_single_match() {
        let mock = control_plane(vec![
            Distribution::new("E1AAAAAAAAAAAA", &["blog.example.com"]),
            Distribution::new("E2BBBBBBBBBBBB", &["www.example.com", "example.com"]),
        ]);
        let id = DistributionResolver::new(&mock)
            .resolve_by_alias("www.example.com")
            .await
            .unwrap();
        assert_eq!(id, "E2BBBBBBBBBBBB");
    }

    #[tokio::test]
    async fn test_no_match() {
        let mock = control_plane(vec![Distribution::new(
            "E1AAAAAAAAAAAA",
            &["blog.example.com"],
        )]);
        let err = DistributionResolver::new(&mock)
            .resolve_by_alias("www.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoDistributionForAlias(alias) if alias == "www.example.com"));
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let mock = control_plane(Vec::new());
        let err = DistributionResolver::new(&mock)
            .resolve_by_alias("www.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoDistributionForAlias(_)));
    }

    #[tokio::test]
    async fn test_ambiguous_alias_reports_all_ids() {
        let mock = control_plane(vec![
            Distribution::new("E1AAAAAAAAAAAA", &["www.example.com"]),
            Distribution::new("E3CCCCCCCCCCCC", &["static.example.com"]),
            Distribution::new("E2BBBBBBBBBBBB", &["www.example.com"]),
        ]);
        let err = DistributionResolver::new(&mock)
            .resolve_by_alias("www.example.com")
            .await
            .unwrap_err();
        match err {
            Error::AmbiguousAlias { alias, ids } => {
                assert_eq!(alias, "www.example.com");
                assert_eq!(ids, vec!["E1AAAAAAAAAAAA", "E2BBBBBBBBBBBB"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_match_is_case_sensitive() {
        let mock = control_plane(vec![Distribution::new(
            "E1AAAAAAAAAAAA",
            &["WWW.example.com"],
        )]);
        let result = DistributionResolver::new(&mock)
            .resolve_by_alias("www.example.com")
            .await;
        assert!(matches!(result, Err(Error::NoDistributionForAlias(_))));
    }

    #[tokio::test]
    async fn test_listing_failure_propagates() {
        let mut mock = MockCdnControlPlane::new();
        mock.expect_list_distributions().returning(|| {
            Err(Error::external(
                ExternalOperation::ListDistributions,
                "access denied",
            ))
        });
        let err = DistributionResolver::new(&mock)
            .resolve_by_alias("www.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExternalCallFailed { .. }));
    }

    #[tokio::test]
    async fn test_resolve_id_skips_listing() {
        let mut mock = MockCdnControlPlane::new();
        mock.expect_list_distributions().never();
        let id = DistributionResolver::new(&mock)
            .resolve(&DistributionRef::Id("E2QWRUHAPOMQZL".into()))
            .await
            .unwrap();
        assert_eq!(id, "E2QWRUHAPOMQZL");
    }
}
