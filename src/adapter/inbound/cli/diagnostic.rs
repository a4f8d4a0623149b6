//! Miette-based error diagnostics for CLI error presentation.
//!
//! Every [`crate::error::Error`] maps to a diagnostic with a stable code
//! and, where useful, a help line. Configuration parse errors carry the
//! file content so the offending span is shown.

use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::error::{Error, ErrorKind};

/// Exit code for errors without a more specific code.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for rejected input.
pub const EXIT_INVALID: i32 = 2;
/// Exit code for requests that collide with current state.
pub const EXIT_CONFLICT: i32 = 3;
/// Exit code for unknown subjects or conversations.
pub const EXIT_NOT_FOUND: i32 = 4;

/// Process exit code for an error.
#[must_use]
pub const fn exit_code(error: &Error) -> i32 {
    match error.kind() {
        ErrorKind::InvalidInput => EXIT_INVALID,
        ErrorKind::Conflict => EXIT_CONFLICT,
        ErrorKind::NotFound => EXIT_NOT_FOUND,
        ErrorKind::Storage | ErrorKind::Config => EXIT_FAILURE,
    }
}

/// Configuration error with source location context.
///
/// Displays the configuration file content with a labeled span pointing
/// to the problematic location, along with an optional help message.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(qa_ledger::config))]
pub struct ConfigSourceError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub help: Option<String>,
}

impl ConfigSourceError {
    /// Create a new configuration error over a named file.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: impl AsRef<str>,
        src: impl Into<String>,
        span: Option<std::ops::Range<usize>>,
    ) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, src.into()),
            span: span.map(|range| (range.start, range.end - range.start).into()),
            help: None,
        }
    }

    /// Add a help suggestion to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// The request repeats what is already recorded.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(qa_ledger::conflict),
    help("nothing was changed; check the current vote with `qa-ledger show` before retrying")
)]
pub struct ConflictDiagnostic {
    pub message: String,
}

/// An id that does not resolve.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(qa_ledger::not_found),
    help("list known ids with `qa-ledger list` or `qa-ledger chat list --user <name>`")
)]
pub struct NotFoundDiagnostic {
    pub message: String,
}

/// Input rejected before anything was read or written.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(qa_ledger::invalid_input))]
pub struct InvalidInputDiagnostic {
    pub message: String,
}

/// Storage failure.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(qa_ledger::storage),
    help("check that the database path is writable and not held by another process")
)]
pub struct StorageDiagnostic {
    pub message: String,
}

/// Configuration error without source context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(qa_ledger::config),
    help("run `qa-ledger config validate` to check the effective configuration")
)]
pub struct ConfigDiagnostic {
    pub message: String,
}

/// Convert an error into a rendered report.
#[must_use]
pub fn report(error: &Error) -> Report {
    let message = error.to_string();
    match error.kind() {
        ErrorKind::Conflict => Report::new(ConflictDiagnostic { message }),
        ErrorKind::NotFound => Report::new(NotFoundDiagnostic { message }),
        ErrorKind::InvalidInput => Report::new(InvalidInputDiagnostic { message }),
        ErrorKind::Storage => Report::new(StorageDiagnostic { message }),
        ErrorKind::Config => Report::new(ConfigDiagnostic { message }),
    }
}
