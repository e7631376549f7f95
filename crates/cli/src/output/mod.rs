//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats, and the spinner shown while a sync runs.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::ProgressBar;

use cdeploy_core::config::Defaults;

/// Output configuration derived from CLI flags and config defaults
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress spinner
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Apply config file defaults; flags given on the command line always win
    pub fn with_defaults(mut self, defaults: &Defaults) -> Self {
        self.json |= defaults.output == "json";
        self.no_color |= defaults.color == "never";
        self.no_progress |= !defaults.progress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults() {
        let defaults = Defaults {
            output: "json".into(),
            color: "never".into(),
            progress: false,
        };
        let config = OutputConfig::default().with_defaults(&defaults);
        assert!(config.json);
        assert!(config.no_color);
        assert!(config.no_progress);
        assert!(!config.quiet);

        let config = OutputConfig::default().with_defaults(&Defaults::default());
        assert!(!config.json);
        assert!(!config.no_color);
        assert!(!config.no_progress);
    }
}
