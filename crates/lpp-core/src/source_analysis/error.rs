// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical error types and the diagnostics collector.
//!
//! Lexical errors are recoverable: the scanner records them through a
//! [`Diagnostics`] collector keyed by zero-based (line, column) and
//! keeps scanning where feasible. Fatal stages (parsing, linking,
//! context building) have their own error types and abort via `Result`.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use super::{Position, Span};

/// A lexical error with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct LexError {
    /// What went wrong.
    #[source]
    pub kind: LexErrorKind,

    /// Where in the source the error occurred.
    #[label("here")]
    pub span: Span,
}

impl LexError {
    /// Creates a new lexical error.
    #[must_use]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kinds of lexical error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("Invalid control character in input")]
    InvalidControlCharacter,

    #[error("Unknown escape character '\\{0}'")]
    InvalidEscape(char),

    #[error("End-of-file inside string")]
    UnterminatedString,

    #[error("Newline inside string")]
    NewlineInString,

    #[error("/* inside block comment")]
    NestedBlockComment,

    #[error("End-of-file inside block comment")]
    UnterminatedBlockComment,

    #[error("e must be followed by exponent")]
    MissingExponent,

    #[error("Need space between identifier and decimal point")]
    MissingSpaceBeforeDecimal,
}

/// Severity of a collected diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single collected diagnostic.
///
/// `pos` carries the zero-based line/column the message is keyed by;
/// `span` locates the same region in bytes for rendered reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: EcoString,
    pub span: Span,
    pub pos: Position,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, span: Span, pos: Position) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            pos,
        }
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<EcoString>, span: Span, pos: Position) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            pos,
        }
    }
}

/// Accumulates non-fatal errors and warnings across pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error at (line, column).
    pub fn add_error(&mut self, message: impl Into<EcoString>, span: Span, pos: Position) {
        let message = message.into();
        tracing::debug!(%pos, %message, "lexical error");
        self.entries.push(Diagnostic::error(message, span, pos));
    }

    /// Records a warning at (line, column).
    pub fn add_warning(&mut self, message: impl Into<EcoString>, span: Span, pos: Position) {
        let message = message.into();
        tracing::warn!(%pos, %message, "warning");
        self.entries.push(Diagnostic::warning(message, span, pos));
    }

    /// Returns `true` if any error-severity entry was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// All collected entries, in recording order.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of collected entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves all entries from `other` into this collector.
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.entries.append(&mut other.entries);
    }
}
