//! Human and JSON rendering of command results
//!
//! Results go to stdout. Status marks, warnings and errors go to stderr, except
//! the success mark which heads a human report on stdout.

use console::style;
use serde::Serialize;

use super::OutputConfig;

/// Writes command output according to the global output flags
///
/// In JSON mode stdout carries exactly one JSON document per command and errors
/// become `{"error": ...}` objects on stderr.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    /// Styling is off for `--no-color` and for JSON output
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Headline of a finished deploy or site change
    pub fn success(&self, message: &str) {
        if self.human_visible() {
            println!("{} {message}", self.mark("✓", Mark::Ok));
        }
    }

    /// Fatal error, printed even with `--quiet`
    pub fn error(&self, message: &str) {
        if self.config.json {
            let payload = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{} {message}", self.mark("✗", Mark::Failed));
        }
    }

    /// Non-fatal condition such as a large batch or a degraded invalidation result
    pub fn warning(&self, message: &str) {
        if self.human_visible() {
            eprintln!("{} {message}", self.mark("⚠", Mark::Warn));
        }
    }

    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Plain report line, dropped with `--quiet`
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }

    fn human_visible(&self) -> bool {
        !self.config.quiet && !self.config.json
    }

    fn mark(&self, symbol: &'static str, kind: Mark) -> String {
        if !self.colors_enabled() {
            return symbol.to_string();
        }
        let styled = match kind {
            Mark::Ok => style(symbol).green(),
            Mark::Failed => style(symbol).red(),
            Mark::Warn => style(symbol).yellow(),
        };
        styled.to_string()
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Ok,
    Failed,
    Warn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_colored_human_output() {
        let formatter = Formatter::default();
        assert!(!formatter.is_json());
        assert!(!formatter.is_quiet());
        assert!(formatter.colors_enabled());
        assert!(formatter.human_visible());
    }

    #[test]
    fn test_json_disables_colors_and_human_lines() {
        let formatter = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(formatter.is_json());
        assert!(!formatter.colors_enabled());
        assert!(!formatter.human_visible());
    }

    #[test]
    fn test_plain_marks_without_color() {
        let formatter = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        assert_eq!(formatter.mark("✓", Mark::Ok), "✓");
        assert_eq!(formatter.mark("⚠", Mark::Warn), "⚠");
    }

    #[test]
    fn test_quiet_hides_human_lines() {
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        assert!(!formatter.human_visible());
        assert!(formatter.colors_enabled());
    }
}
