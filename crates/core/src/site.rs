//! Site management
//!
//! A site is a named deployment recipe: which local tree goes to which bucket
//! target, and which distribution fronts it.

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::distribution::DistributionRef;
use crate::error::{Error, Result};
use crate::path::BucketTarget;

/// A named deployment target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Unique name for this site
    pub name: String,

    /// Local directory to deploy
    pub source: String,

    /// Bucket target, `s3://bucket[/prefix]`
    pub target: String,

    /// Distribution identifier or alias
    pub distribution: String,

    /// Remove remote objects missing locally
    #[serde(default)]
    pub delete: bool,

    /// Exclude patterns for the sync
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl Site {
    /// Create a new site with required fields
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        distribution: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            distribution: distribution.into(),
            delete: false,
            exclude: Vec::new(),
        }
    }

    /// Check that the stored target and distribution parse
    pub fn validate(&self) -> Result<()> {
        if !is_valid_site_name(&self.name) {
            return Err(Error::InvalidTarget(format!(
                "Invalid site name '{}'. Use letters, digits, '-' and '_'",
                self.name
            )));
        }
        BucketTarget::parse(&self.target)?;
        DistributionRef::parse(&self.distribution)?;
        Ok(())
    }
}

fn is_valid_site_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Manager for site operations
pub struct SiteManager {
    config_manager: ConfigManager,
}

impl SiteManager {
    /// Create a new SiteManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// List all configured sites
    pub fn list(&self) -> Result<Vec<Site>> {
        let config = self.config_manager.load()?;
        Ok(config.sites)
    }

    /// Get a site by name
    pub fn get(&self, name: &str) -> Result<Site> {
        let config = self.config_manager.load()?;
        config
            .sites
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SiteNotFound(name.to_string()))
    }

    /// Add or update a site
    pub fn set(&self, site: Site) -> Result<()> {
        site.validate()?;
        let mut config = self.config_manager.load()?;

        config.sites.retain(|s| s.name != site.name);
        config.sites.push(site);

        self.config_manager.save(&config)
    }

    /// Remove a site
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.sites.len();

        config.sites.retain(|s| s.name != name);

        if config.sites.len() == original_len {
            return Err(Error::SiteNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if a site exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.sites.iter().any(|s| s.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_site_manager() -> (SiteManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_manager = ConfigManager::in_dir(temp_dir.path());
        (SiteManager::with_config_manager(config_manager), temp_dir)
    }

    fn blog() -> Site {
        Site::new(
            "blog",
            "./public",
            "s3://blog-bucket/www",
            "blog.example.com",
        )
    }

    #[test]
    fn test_site_new() {
        let site = blog();
        assert_eq!(site.name, "blog");
        assert!(!site.delete);
        assert!(site.exclude.is_empty());
        assert!(site.validate().is_ok());
    }

    #[test]
    fn test_site_validation() {
        let mut site = blog();
        site.target = "https://bucket".into();
        assert!(site.validate().is_err());

        let mut site = blog();
        site.name = "my blog".into();
        assert!(site.validate().is_err());

        let mut site = blog();
        site.distribution = String::new();
        assert!(site.validate().is_err());
    }

    #[test]
    fn test_set_and_get() {
        let (manager, _temp_dir) = temp_site_manager();
        let mut site = blog();
        site.delete = true;
        site.exclude = vec!["*.map".into()];
        manager.set(site).unwrap();

        let retrieved = manager.get("blog").unwrap();
        assert_eq!(retrieved.target, "s3://blog-bucket/www");
        assert!(retrieved.delete);
        assert_eq!(retrieved.exclude, vec!["*.map"]);
    }

    #[test]
    fn test_set_replaces_existing() {
        let (manager, _temp_dir) = temp_site_manager();
        manager.set(blog()).unwrap();
        let mut updated = blog();
        updated.distribution = "E2QWRUHAPOMQZL".into();
        manager.set(updated).unwrap();

        let sites = manager.list().unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].distribution, "E2QWRUHAPOMQZL");
    }

    #[test]
    fn test_remove() {
        let (manager, _temp_dir) = temp_site_manager();
        manager.set(blog()).unwrap();
        assert!(manager.exists("blog").unwrap());

        manager.remove("blog").unwrap();
        assert!(!manager.exists("blog").unwrap());
    }

    #[test]
    fn test_missing_site() {
        let (manager, _temp_dir) = temp_site_manager();
        assert!(matches!(
            manager.get("nope").unwrap_err(),
            Error::SiteNotFound(_)
        ));
        assert!(matches!(
            manager.remove("nope").unwrap_err(),
            Error::SiteNotFound(_)
        ));
    }
}
