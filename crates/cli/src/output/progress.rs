//! Progress spinner for long-running external calls
//!
//! The sync runs as one opaque call, so progress is indeterminate.

use super::OutputConfig;

/// Spinner wrapper
///
/// In quiet or JSON mode, progress is suppressed.
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a spinner for indeterminate progress
    pub fn spinner(config: &OutputConfig, message: &str) -> Self {
        let bar = if config.quiet || config.json || config.no_progress {
            None
        } else {
            let bar = indicatif::ProgressBar::new_spinner();
            let style =
                indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
            if let Ok(style) = style {
                bar.set_style(style);
            }
            bar.set_message(message.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(bar)
        };

        Self { bar }
    }

    /// Finish and clear the spinner
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Check if the spinner is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_quiet_mode() {
        let config = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        assert!(!ProgressBar::spinner(&config, "Syncing").is_visible());
    }

    #[test]
    fn test_spinner_json_mode() {
        let config = OutputConfig {
            json: true,
            ..Default::default()
        };
        assert!(!ProgressBar::spinner(&config, "Syncing").is_visible());
    }

    #[test]
    fn test_spinner_no_progress() {
        let config = OutputConfig {
            no_progress: true,
            ..Default::default()
        };
        assert!(!ProgressBar::spinner(&config, "Syncing").is_visible());
    }

    #[test]
    fn test_spinner_normal() {
        let bar = ProgressBar::spinner(&OutputConfig::default(), "Syncing");
        assert!(bar.is_visible());
        bar.finish_and_clear();
    }
}
