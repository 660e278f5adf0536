//! Build description error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error raised while describing or rendering a build.
///
/// Every validation error is raised by the call that introduced the invalid
/// value. The only deferred case is [`BuildError::UnresolvedFamily`], which
/// is raised when a backend actually needs the family.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid {what} `{value}`, valid values: {}", .expected.join(", "))]
    InvalidChoice {
        what: &'static str,
        value: String,
        expected: Vec<String>,
    },

    #[error("malformed part `{part}`, expected {expected}")]
    MalformedPart { part: String, expected: String },

    #[error("`{operation}` is not supported by the {backend} backend")]
    UnsupportedOperation { backend: String, operation: String },

    #[error("could not resolve an FPGA family for part `{part}`")]
    UnresolvedFamily { part: String },

    #[error("missing {what}, expected {expected}")]
    MissingValue {
        what: &'static str,
        expected: String,
    },

    #[error("invalid file pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to load template `{}`", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Build an `InvalidChoice` error from any list of displayable choices.
    pub fn invalid_choice<T: std::fmt::Display>(
        what: &'static str,
        value: impl Into<String>,
        expected: &[T],
    ) -> Self {
        BuildError::InvalidChoice {
            what,
            value: value.into(),
            expected: expected.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Build an `UnsupportedOperation` error.
    pub fn unsupported(backend: impl std::fmt::Display, operation: impl Into<String>) -> Self {
        BuildError::UnsupportedOperation {
            backend: backend.to_string(),
            operation: operation.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::InvalidChoice {
                what,
                value,
                expected,
            } => Diagnostic::error(format!("invalid {} `{}`", what, value))
                .with_context(format!("valid values: {}", expected.join(", ")))
                .with_suggestion(format!("Use one of the listed {} names", what)),

            BuildError::MalformedPart { part, expected } => {
                Diagnostic::error(format!("malformed part `{}`", part))
                    .with_context(format!("expected {}", expected))
                    .with_suggestion("Check the part number in the vendor datasheet")
            }

            BuildError::UnsupportedOperation { backend, operation } => Diagnostic::error(
                format!("`{}` is not supported by the {} backend", operation, backend),
            )
            .with_suggestion("Run `fpgaforge backend show <name>` to see what a backend supports"),

            BuildError::UnresolvedFamily { part } => {
                Diagnostic::error(format!("unknown FPGA family for part `{}`", part))
                    .with_context("no family prefix table matched this part")
                    .with_suggestion("Run `fpgaforge part <PART>` to inspect how it resolves")
            }

            BuildError::MissingValue { what, expected } => {
                Diagnostic::error(format!("missing {}", what))
                    .with_context(format!("expected {}", expected))
            }

            BuildError::Pattern { pattern, source } => {
                Diagnostic::error(format!("invalid file pattern `{}`", pattern))
                    .with_context(source.to_string())
                    .with_suggestion("Quote the pattern so the shell does not expand it")
            }

            BuildError::Template { path, source } => {
                Diagnostic::error(format!("failed to load template `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_location(path.clone())
            }

            BuildError::Io { path, source } => {
                Diagnostic::error(format!("failed to write `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_location(path.clone())
            }
        }
    }
}
