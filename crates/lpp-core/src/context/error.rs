// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Context-building error types.
//!
//! Everything here is fatal: the builder stops at the first statement
//! it cannot turn into simulation structure. Shadowing assignments and
//! implied parameters are warnings and go through
//! [`Diagnostics`](crate::source_analysis::Diagnostics) instead.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::Span;

/// A fatal error encountered while building a simulation from an AST.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct BuildError {
    /// The kind of build error.
    #[source]
    pub kind: BuildErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl BuildError {
    /// Creates a new build error.
    #[must_use]
    pub fn new(kind: BuildErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of build error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildErrorKind {
    /// A count or parameter value did not reduce to a number.
    #[error("only literal number values are supported here")]
    NotANumber,

    /// A molecule assignment whose shape the builder does not accept.
    #[error("assignment target is not a molecule")]
    UnsupportedAssignment,

    /// A change point or interval bound before time zero.
    #[error("assignment to molecule '{molecule}' of count {value} has invalid negative time {time}")]
    NegativeTime {
        molecule: EcoString,
        value: f64,
        time: f64,
    },

    /// An interval whose end precedes its start.
    #[error("assignment to molecule '{molecule}' of count {value} has end time {end} less than start time {start}")]
    EndBeforeStart {
        molecule: EcoString,
        value: f64,
        start: f64,
        end: f64,
    },

    /// A flat reaction declaration with an empty parameter list.
    #[error("reaction '{0}' has no parameters")]
    NoParameters(EcoString),

    /// A reaction body item that is not a parameter assignment.
    #[error("reaction '{0}' has a malformed parameter list")]
    MalformedParameters(EcoString),

    /// A parameter outside the kinetic parameter set.
    #[error("reaction '{0}' has invalid parameter '{1}'")]
    InvalidParameter(EcoString, EcoString),

    /// The same parameter assigned twice in one reaction.
    #[error("reaction '{0}' has parameter '{1}' defined more than once")]
    DuplicateParameter(EcoString, EcoString),

    /// More than one `eq` in one reaction.
    #[error("reaction '{0}' has its equation defined more than once")]
    DuplicateEquation(EcoString),

    /// An equation whose arrow the builder does not support.
    #[error("reaction '{0}' must use a '-->' or '--|' equation")]
    UnsupportedArrow(EcoString),

    /// An equation side with a shape other than `+`/`*` over terms.
    #[error("equation of reaction '{0}' has an unsupported term")]
    MalformedEquation(EcoString),

    /// No candidate kinetic type matches the supplied parameters.
    #[error("kinetic type of reaction '{0}' cannot be determined; it has too few or conflicting parameters")]
    UndeterminedKinetics(EcoString),

    /// A regulation arrow pointing at a reaction that was never built.
    #[error("reaction '{0}' regulates reaction '{1}', but that reaction does not exist")]
    UnknownReaction(EcoString, EcoString),

    /// Regulation of a reaction that is not standard-unregulated.
    #[error("reaction '{0}' cannot be regulated; only standard unregulated reactions can be")]
    NotRegulatable(EcoString),

    /// A protein block containing something other than reactions.
    #[error("protein '{0}' contains a statement that is not a reaction")]
    NotAReaction(EcoString),

    /// A top-level declaration the simulation model has no place for.
    #[error("'{0}' declarations cannot be built into a simulation")]
    UnsupportedDeclaration(EcoString),
}

/// A time-bound failure from the fixed-count handler. Carries no
/// source context; the builder wraps it into a [`BuildError`] naming
/// the molecule and span.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntervalError {
    /// A negative change-point time or window bound.
    #[error("negative time {0}")]
    NegativeTime(f64),

    /// A window whose end precedes its start.
    #[error("end time before start time")]
    EndBeforeStart,
}
