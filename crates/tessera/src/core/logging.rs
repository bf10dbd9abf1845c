//! Opt-in `tracing` subscriber setup
//!
//! The library only emits spans and events; nothing is printed until a
//! caller installs a subscriber with [`init_logging`].
//!
//! ```rust,no_run
//! use tessera::core::logging::init_logging;
//!
//! init_logging(Some("tessera::core::command=trace"), Some("pretty")).unwrap();
//! ```
//!
//! Levels and formats fall back to `TESSERA_LOG_LEVEL` (then `RUST_LOG`)
//! and `TESSERA_LOG_FORMAT`, defaulting to `info` and `compact`.
//!
//! Spans follow the pipeline: `render_all` > `build_all` > `build_diagram` >
//! `parse_sequence` / `parse_timing` > `dispatch`, then `render_sequence` /
//! `render_timing` > `layout_sequence` / `layout_timing` > `solve_reals`.
//! Layout spans also contain `collect_constraints` and `place_bands`.
//!
//! ```bash
//! # why a line did not match
//! TESSERA_LOG_LEVEL="tessera::core::command=debug"
//!
//! # every deferred value as it is solved
//! TESSERA_LOG_LEVEL="info,tessera::core::real=trace"
//! ```

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{
    fmt::{format::FmtSpan, layer},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use super::error::{DiagramError, DiagramResult};

const LEVEL_VAR: &str = "TESSERA_LOG_LEVEL";
const FORMAT_VAR: &str = "TESSERA_LOG_FORMAT";

/// Output shape of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event, no span lifecycle
    #[default]
    Compact,
    /// Multi-line with source locations and span entry/exit
    Pretty,
    /// One JSON object per event, spans reported on close
    Json,
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        match self {
            LogFormat::Compact => layer()
                .compact()
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .boxed(),
            LogFormat::Pretty => layer()
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::ACTIVE)
                .boxed(),
            LogFormat::Json => layer()
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .boxed(),
        }
    }
}

impl FromStr for LogFormat {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(DiagramError::config_error(format!(
                "Unknown log format `{}`, expected one of {}",
                s,
                LogFormat::variants().join("|")
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        })
    }
}

/// Filter directives from the argument or the environment
///
/// Unparsable directives degrade to `info` rather than failing.
fn resolve_filter(level: Option<&str>) -> EnvFilter {
    let directives = level
        .map(str::to_string)
        .or_else(|| env::var(LEVEL_VAR).ok())
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn resolve_format(format: Option<&str>) -> DiagramResult<LogFormat> {
    match format.map(str::to_string).or_else(|| env::var(FORMAT_VAR).ok()) {
        Some(name) => name.parse(),
        None => Ok(LogFormat::default()),
    }
}

/// Install the global subscriber
///
/// `level` takes `EnvFilter` directives (`debug`, `info,tessera::core=trace`).
/// Fails on an unknown format or when a global subscriber already exists.
///
/// ```rust,no_run
/// use tessera::core::logging::init_logging;
///
/// init_logging(Some("debug"), Some("json")).unwrap();
/// ```
pub fn init_logging(level: Option<&str>, format: Option<&str>) -> DiagramResult<()> {
    let format = resolve_format(format)?;
    let filter = resolve_filter(level);

    Registry::default()
        .with(format.layer().with_filter(filter))
        .try_init()
        .map_err(|e| DiagramError::config_error(format!("Logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_format_names_are_case_insensitive() {
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }

    #[test]
    fn test_unknown_format_is_config_error() {
        let error = "xml".parse::<LogFormat>().unwrap_err();
        assert!(matches!(error, DiagramError::ConfigError { .. }));
        assert!(error.to_string().contains("compact|pretty|json"));
    }

    #[test]
    fn test_explicit_format_wins() {
        assert_eq!(resolve_format(Some("json")).unwrap(), LogFormat::Json);
        assert!(resolve_format(Some("yaml")).is_err());
    }

    #[test]
    fn test_bad_directive_falls_back_to_info() {
        let filter = resolve_filter(Some("tessera=loud"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        let filter = resolve_filter(Some("warn,tessera::core::real=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }
}
