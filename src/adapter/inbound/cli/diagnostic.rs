//! Miette-based error diagnostics for CLI error presentation.
//!
//! Configuration mistakes are reported against the file content, with the
//! offending span labelled when the TOML parser knows where it is.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError, Error};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(farewatch::config))]
pub struct ConfigDiagnostic {
    /// Human-readable error message.
    pub message: String,

    /// The configuration file.
    #[source_code]
    pub src: NamedSource<String>,

    /// Byte offset and length of the problematic region.
    #[label("here")]
    pub span: Option<SourceSpan>,

    /// Suggestion for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    /// Build a diagnostic for `error` raised while loading `content`.
    #[must_use]
    pub fn new(name: &str, content: &str, error: &ConfigError) -> Self {
        let (message, span, help) = match error {
            ConfigError::Parse(e) => (
                e.message().to_string(),
                e.span().map(|range| SourceSpan::from(range.start..range.end)),
                None,
            ),
            ConfigError::InvalidValue { field, .. } => {
                let key = field.rsplit('.').next().unwrap_or(field);
                (
                    error.to_string(),
                    find_key(content, key),
                    Some(format!("fix `{field}` or remove it to use the default")),
                )
            }
            ConfigError::InvalidRoute { name, .. } => (
                error.to_string(),
                content
                    .find(name.as_str())
                    .map(|offset| SourceSpan::from((offset, name.len()))),
                Some("see `farewatch route add --help` for the route rules".to_string()),
            ),
            other => (other.to_string(), None, None),
        };
        Self {
            message,
            src: NamedSource::new(name, content.to_string()),
            span,
            help,
        }
    }
}

/// Span of `key =` at the start of a line.
fn find_key(content: &str, key: &str) -> Option<SourceSpan> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(key) {
            if rest.trim_start().starts_with('=') {
                let start = offset + (line.len() - trimmed.len());
                return Some(SourceSpan::from((start, key.len())));
            }
        }
        offset += line.len();
    }
    None
}

/// Render an application error for the terminal.
///
/// Configuration errors carrying file content become rich diagnostics;
/// everything else is reported as plain text.
#[must_use]
pub fn report(error: Error, source: Option<(&str, &str)>) -> miette::Report {
    match (error, source) {
        (Error::Config(e), Some((name, content))) => {
            miette::Report::new(ConfigDiagnostic::new(name, content, &e))
        }
        (other, _) => miette::miette!("{other}"),
    }
}
