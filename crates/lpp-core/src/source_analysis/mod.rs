// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for L++ source code.
//!
//! The [`Scanner`] converts source text into a sentinel-bounded
//! [`TokenStream`], classifying words into keyword, unit, parameter,
//! function, primitive, looping, import, and identifier subtypes. Each
//! token carries a byte [`Span`] and a zero-based line/column
//! [`Position`] (tab stops of 8).
//!
//! ```
//! use lpp_core::source_analysis::{scan, TokenKind};
//!
//! let (stream, diagnostics) = scan("reagent broth { 500 mL; }");
//! assert!(!diagnostics.has_errors());
//! ```
//!
//! Two post-lexical passes refine the stream: [`find_identifiers`]
//! collects declared names, and [`find_chemicals`] reclassifies the
//! remaining identifiers inside `reaction`/`reagent` regions as
//! chemical tokens (resolved to canonical formulas by
//! [`crate::chem`]).
//!
//! Lexical errors are recoverable and land in the [`Diagnostics`]
//! collector; scanning continues past them where feasible.

mod error;
mod identifiers;
mod lexer;
mod span;
mod token;

#[cfg(test)]
mod lexer_property_tests;

pub use error::{Diagnostic, Diagnostics, LexError, LexErrorKind, Severity};
pub use identifiers::{find_chemicals, find_identifiers};
pub use lexer::{scan, Scanner};
pub use span::{Position, Span, TAB_WIDTH};
pub use token::{
    classify_word, Function, Keyword, LoopKind, Param, Primitive, Symbol, Token, TokenKind,
    TokenStream,
};
