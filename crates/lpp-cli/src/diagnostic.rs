// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Rich diagnostics rendering using miette.
//!
//! Converts lpp-core diagnostics into miette-formatted reports with:
//! - Source code context
//! - Arrows pointing to the error location
//! - Support for multiple errors and warnings

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use lpp_core::source_analysis::{Diagnostic as CoreDiagnostic, Severity};
use miette::{Diagnostic, NamedSource, SourceSpan};

/// A compilation diagnostic with rich formatting.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(lpp::compile))]
pub struct CompileDiagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Source code for context.
    #[source_code]
    pub src: NamedSource<String>,
    /// Location of the problem.
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label for the span (interpolated by miette derive macro).
    pub label: String,
}

impl CompileDiagnostic {
    /// Creates a diagnostic from an lpp-core diagnostic.
    pub fn from_core_diagnostic(
        diagnostic: &CoreDiagnostic,
        source_path: &str,
        source: &str,
    ) -> Self {
        let label = match diagnostic.severity {
            Severity::Error => "error here",
            Severity::Warning => "warning here",
        };

        Self {
            severity: diagnostic.severity,
            message: diagnostic.message.to_string(),
            src: NamedSource::new(source_path, source.to_string()),
            span: (
                diagnostic.span.start() as usize,
                diagnostic.span.len() as usize,
            )
                .into(),
            label: label.to_string(),
        }
    }
}

/// Attaches the named source text to a fatal front-end error so miette
/// can render its span label in context.
pub fn with_source<E>(error: E, source_path: &str, source: &str) -> miette::Report
where
    E: miette::Diagnostic + Send + Sync + 'static,
{
    miette::Report::new(error).with_source_code(NamedSource::new(source_path, source.to_string()))
}
