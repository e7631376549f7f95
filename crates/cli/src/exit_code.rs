//! Exit code definitions for the cdeploy CLI
//!
//! Scripts branch on these values, so existing codes keep their meaning.

use cdeploy_core::Error;

/// Exit codes for the cdeploy CLI application.
///
/// These codes follow a consistent convention to allow scripts and automation
/// to handle different failure scenarios appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, target, path or configuration
    UsageError = 2,

    /// A sync, listing, invalidation or bucket probe call failed
    ExternalError = 3,

    /// Distribution alias, site or bucket does not exist
    NotFound = 4,

    /// Alias is served by more than one distribution
    AmbiguousAlias = 5,

    /// Sync transcript could not be turned into invalidation paths
    TranscriptRejected = 6,

    /// More changed paths than one invalidation request may carry
    BatchTooLarge = 7,

    /// Interrupted by Ctrl+C; a running sync is killed
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::ExternalError),
            4 => Some(Self::NotFound),
            5 => Some(Self::AmbiguousAlias),
            6 => Some(Self::TranscriptRejected),
            7 => Some(Self::BatchTooLarge),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Map a core error to its exit code
    pub fn from_error(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::ExternalError => "External call failed",
            Self::NotFound => "Resource not found",
            Self::AmbiguousAlias => "Alias matches several distributions",
            Self::TranscriptRejected => "Sync transcript rejected",
            Self::BatchTooLarge => "Invalidation batch too large",
            Self::Interrupted => "Operation interrupted",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdeploy_core::ExternalOperation;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::ExternalError.as_i32(), 3);
        assert_eq!(ExitCode::NotFound.as_i32(), 4);
        assert_eq!(ExitCode::AmbiguousAlias.as_i32(), 5);
        assert_eq!(ExitCode::TranscriptRejected.as_i32(), 6);
        assert_eq!(ExitCode::BatchTooLarge.as_i32(), 7);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn test_exit_code_from_i32() {
        for code in [0, 1, 2, 3, 4, 5, 6, 7, 130] {
            assert_eq!(ExitCode::from_i32(code).map(ExitCode::as_i32), Some(code));
        }
        assert_eq!(ExitCode::from_i32(99), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::BatchTooLarge {
                count: 3001,
                max: 3000
            }),
            ExitCode::BatchTooLarge
        );
        assert_eq!(
            ExitCode::from_error(&Error::external(ExternalOperation::Sync, "exit status 1")),
            ExitCode::ExternalError
        );
        assert_eq!(
            ExitCode::from_error(&Error::KeyOutsideScope {
                locator: "s3://other/a".into(),
                scope: "s3://bucket".into()
            }),
            ExitCode::TranscriptRejected
        );
        assert_eq!(
            ExitCode::from_error(&Error::NoDistributionForAlias("a".into())),
            ExitCode::NotFound
        );
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::Success);
        assert!(display.contains("0"));
        assert!(display.contains("successfully"));

        let display = format!("{}", ExitCode::AmbiguousAlias);
        assert!(display.contains("5"));
        assert!(display.contains("several distributions"));
    }
}
