//! Logging setup for chatmem binaries and tests.
//!
//! # Noise Filtering
//!
//! Noisy library modules (hyper, reqwest, h2, tonic, redis, ...) are set to
//! `warn` so that business logs stay readable at `debug`.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default noisy modules that should be filtered to warn level.
pub const NOISY_MODULES: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "h2",
    "rustls",
    "tonic",
    "tower",
    "redis",
];

/// Build the filter directive string for `log_level` with noise suppression.
pub fn filter_directives(log_level: &str) -> String {
    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }
    directives
}

fn build_filter(log_level: &str) -> EnvFilter {
    // RUST_LOG wins when set
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(filter_directives(log_level))
}

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with span context
    Json,
    /// Human-readable single lines
    Pretty,
}

impl LogFormat {
    /// Parse a config value; anything other than `json` is pretty.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Initialize logging for `log_level` and `log_format` ("json" or "pretty").
///
/// Logs go to stderr; stdout is left to command output. Safe to call more
/// than once; later calls are no-ops.
pub fn init_logging(log_level: &str, log_format: &str) {
    let format = LogFormat::parse(log_format);
    let registry = tracing_subscriber::registry().with(build_filter(log_level));

    let installed = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(log_level, ?format, "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_include_noisy_modules() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("debug"));
        for module in NOISY_MODULES {
            assert!(directives.contains(&format!("{module}=warn")));
        }
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("whatever"), LogFormat::Pretty);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging("info", "pretty");
        init_logging("debug", "json");
    }
}
