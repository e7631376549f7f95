//! Error types for cdeploy-core
//!
//! Every terminal failure of a deployment is one variant of [`Error`]. The CLI
//! converts them to exit codes in a single place, so the core never exits.

use std::fmt;

use thiserror::Error;

/// Result type alias for cdeploy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// External collaborator whose call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalOperation {
    /// Bulk object sync
    Sync,
    /// Distribution listing query
    ListDistributions,
    /// Invalidation submission
    CreateInvalidation,
    /// Bucket existence probe
    HeadBucket,
}

impl fmt::Display for ExternalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExternalOperation::Sync => "sync",
            ExternalOperation::ListDistributions => "list distributions",
            ExternalOperation::CreateInvalidation => "create invalidation",
            ExternalOperation::HeadBucket => "head bucket",
        };
        f.write_str(name)
    }
}

/// Error types for cdeploy-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A transcript line carries an operation tag but no usable locator
    #[error("Malformed transcript line {line}: {content}")]
    MalformedTranscriptLine { line: usize, content: String },

    /// A synced object lies outside the deployment target
    #[error("Object {locator} is outside the deployment target {scope}")]
    KeyOutsideScope { locator: String, scope: String },

    /// More paths than a single invalidation request may carry
    #[error("Invalidation batch has {count} paths, the maximum is {max}")]
    BatchTooLarge { count: usize, max: usize },

    /// No distribution serves the alias
    #[error("No distribution found for alias: {0}")]
    NoDistributionForAlias(String),

    /// Several distributions serve the alias
    #[error("Alias {alias} is served by several distributions: {}", .ids.join(", "))]
    AmbiguousAlias { alias: String, ids: Vec<String> },

    /// A sync, listing, invalidation or probe call failed
    #[error("{operation} failed: {message}")]
    ExternalCallFailed {
        operation: ExternalOperation,
        message: String,
    },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid bucket target or distribution reference
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Invalid invalidation path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Named site not found
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    /// Bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for an [`Error::ExternalCallFailed`]
    pub fn external(operation: ExternalOperation, message: impl Into<String>) -> Self {
        Error::ExternalCallFailed {
            operation,
            message: message.into(),
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidTarget(_)
            | Error::InvalidPath(_)
            | Error::Config(_)
            | Error::InvalidUrl(_)
            | Error::TomlParse(_) => 2, // UsageError
            Error::ExternalCallFailed { .. } => 3, // ExternalError
            Error::NoDistributionForAlias(_)
            | Error::SiteNotFound(_)
            | Error::BucketNotFound(_) => 4, // NotFound
            Error::AmbiguousAlias { .. } => 5, // Ambiguous
            Error::MalformedTranscriptLine { .. } | Error::KeyOutsideScope { .. } => 6, // TranscriptRejected
            Error::BatchTooLarge { .. } => 7, // BatchTooLarge
            _ => 1,                           // GeneralError
        }
    }
}
