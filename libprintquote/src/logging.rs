//! Logging setup shared by the PrintQuote binaries
//!
//! All output goes to stderr so stdout stays clean for formatted amounts and
//! JSON. Format and level come from the command line or from
//! `PRINTQUOTE_LOG_FORMAT` / `PRINTQUOTE_LOG_LEVEL`; `RUST_LOG` wins over both.
//!
//! ```no_run
//! use libprintquote::logging::{LogFormat, LogSettings};
//!
//! LogSettings::from_env(false).with_format(LogFormat::Json).init();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Plain text without target names
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line colored output for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LogSettings {
    /// Settings from `PRINTQUOTE_LOG_FORMAT` and `PRINTQUOTE_LOG_LEVEL`
    ///
    /// The tools are quiet by default: only warnings and errors are shown.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var("PRINTQUOTE_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let level = std::env::var("PRINTQUOTE_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Self {
            format,
            level,
            verbose,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// The filter directive used when `RUST_LOG` is not set
    ///
    /// HTTP client internals are capped at `warn` unless asked for explicitly.
    pub fn directive(&self) -> String {
        let level = if self.verbose { "debug" } else { self.level.as_str() };
        format!("{},hyper=warn,reqwest=warn", level)
    }

    /// Install the global subscriber
    ///
    /// Returns `false` if a subscriber was already installed (for example by a
    /// test harness); logging then goes to the existing one.
    pub fn init(&self) -> bool {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()));

        let result = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };

        result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml"
            .parse::<LogFormat>()
            .unwrap_err()
            .contains("Invalid log format: 'xml'"));
    }

    #[test]
    fn test_log_format_display() {
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_directive_verbose_overrides_level() {
        let settings = LogSettings {
            format: LogFormat::Text,
            level: "error".to_string(),
            verbose: true,
        };
        assert_eq!(settings.directive(), "debug,hyper=warn,reqwest=warn");

        let quiet = LogSettings {
            verbose: false,
            ..settings
        };
        assert_eq!(quiet.directive(), "error,hyper=warn,reqwest=warn");
    }

    #[test]
    fn test_second_init_is_harmless() {
        let settings = LogSettings {
            format: LogFormat::Text,
            level: "warn".to_string(),
            verbose: false,
        };
        settings.init();
        assert!(!settings.init());
    }
}
