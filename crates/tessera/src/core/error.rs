//! Core error types for diagram processing
//!
//! Every stage of the pipeline reports failures through [`DiagramError`].
//! Grammar and semantic errors are user input problems scoped to a single
//! diagram; layout errors are engine defects and abort the whole run.

use thiserror::Error;

use super::source::LineLocation;

/// Result alias used by the core pipeline
pub type DiagramResult<T> = Result<T, DiagramError>;

/// Core error types for diagram processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagramError {
    #[error("Syntax error at {location}: no command matches `{line}`")]
    GrammarMismatch { line: String, location: LineLocation },

    #[error("{message} at {location} (`{line}`)")]
    SemanticViolation {
        message: String,
        line: String,
        location: LineLocation,
    },

    #[error("Layout error: {message}")]
    LayoutUnresolvable { message: String },

    #[error("Measurement error: {message}")]
    MeasurementFailure { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Unknown diagram type: {diagram_type}")]
    UnknownDiagramType { diagram_type: String },
}

impl DiagramError {
    /// Create a new grammar mismatch for an unrecognized line
    pub fn grammar_mismatch(line: impl Into<String>, location: LineLocation) -> Self {
        Self::GrammarMismatch {
            line: line.into(),
            location,
        }
    }

    /// Create a new semantic violation raised by a command handler
    pub fn semantic(
        message: impl Into<String>,
        line: impl Into<String>,
        location: LineLocation,
    ) -> Self {
        Self::SemanticViolation {
            message: message.into(),
            line: line.into(),
            location,
        }
    }

    /// Create a new layout error
    pub fn layout_error(message: impl Into<String>) -> Self {
        Self::LayoutUnresolvable {
            message: message.into(),
        }
    }

    /// Create a new measurement error
    pub fn measurement_error(message: impl Into<String>) -> Self {
        Self::MeasurementFailure {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// True for errors that signal an engine defect rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::LayoutUnresolvable { .. })
    }

    /// Source location of the offending line, when the error has one
    pub fn location(&self) -> Option<&LineLocation> {
        match self {
            Self::GrammarMismatch { location, .. } | Self::SemanticViolation { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_mismatch() {
        let error = DiagramError::grammar_mismatch("bax \"X\"", LineLocation::new(0, 5));
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Syntax error"));
        assert!(error_msg.contains("bax \"X\""));
        assert!(error_msg.contains("line 5"));
    }

    #[test]
    fn test_semantic_violation() {
        let error = DiagramError::semantic("Box cannot be nested", "box", LineLocation::new(1, 3));
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Box cannot be nested"));
        assert!(error_msg.contains("line 3"));
        assert_eq!(error.location().map(|l| l.line), Some(3));
    }

    #[test]
    fn test_layout_error_is_internal() {
        let error = DiagramError::layout_error("cycle between reals 1, 2");
        assert!(error.is_internal());
        assert!(format!("{}", error).contains("Layout error"));
        assert!(error.location().is_none());
    }

    #[test]
    fn test_measurement_error() {
        let error = DiagramError::measurement_error("control character in text");
        assert!(!error.is_internal());
        assert!(format!("{}", error).contains("Measurement error"));
    }
}
