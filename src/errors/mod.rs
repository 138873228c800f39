//! Error types and result aliases for the Glow completion engine.
//!
//! All user-facing errors are variants of [`GlowError`], rendered via `miette`
//! diagnostics. Resolution-internal errors never cross the public completion
//! boundary: the engine catches them, logs at debug level, and returns an
//! empty suggestion list.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the Glow completion engine
#[derive(Error, Debug, Diagnostic)]
pub enum GlowError {
    #[error("failed to read {path}")]
    #[diagnostic(code(E0101))]
    IoError { path: PathBuf, message: String },

    #[error("position {line}:{column} is outside the document")]
    #[diagnostic(code(E0102), help("line and column are zero-based"))]
    InvalidPosition { line: usize, column: usize },

    #[error("invalid schema data")]
    #[diagnostic(
        code(E0201),
        help("the schema JSON does not match the expected layout: {message}")
    )]
    SchemaData { message: String },

    #[error("unknown variant type '{type_name}'")]
    #[diagnostic(
        code(E0301),
        help("the document selects a variant that the schema does not declare")
    )]
    UnknownVariant { type_name: String },

    #[error("unknown registry '{name}'")]
    #[diagnostic(
        code(E0302),
        help("a schema node references a registry missing from the lookup tables")
    )]
    UnknownRegistry { name: String },

    #[error("unexpected document shape")]
    #[diagnostic(code(E0303))]
    UnexpectedShape {
        expected: &'static str,
        at_segment: String,
    },
}

impl GlowError {
    pub fn io_error(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        GlowError::IoError {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type alias using [`GlowError`]
pub type GlowResult<T> = Result<T, GlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GlowError::UnknownVariant {
            type_name: "sawtooth".to_string(),
        };
        assert_eq!(err.to_string(), "unknown variant type 'sawtooth'");

        let err = GlowError::InvalidPosition { line: 4, column: 9 };
        assert!(err.to_string().contains("4:9"));
    }

    #[test]
    fn test_errors_render_as_reports() {
        let report = miette::Report::new(GlowError::SchemaData {
            message: "missing field `registry`".to_string(),
        });
        let rendered = format!("{:?}", report);
        assert!(rendered.contains("invalid schema data"), "{}", rendered);
    }
}
