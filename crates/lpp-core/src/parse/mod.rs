// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing for L++ token streams.
//!
//! The [`parse`] entry point turns a scanned, linked, chemical-resolved
//! [`TokenStream`](crate::source_analysis::TokenStream) into a
//! [`Program`](crate::ast::Program), building the block-scope registry
//! as it goes and folding arithmetic inline through [`evaluate`].
//!
//! ```
//! use lpp_core::parse::parse;
//! use lpp_core::source_analysis::scan;
//!
//! let (stream, _diagnostics) = scan("int x = 2 + 3;");
//! let parsed = parse(&stream).unwrap();
//! assert_eq!(parsed.program.statements.len(), 1);
//! ```

mod error;
mod eval;
mod parser;
mod scope;

pub use error::{EvalError, EvalErrorKind, ParseError, ParseErrorKind};
pub use eval::evaluate;
pub use parser::{parse, BlockType, Parsed};
pub use scope::{Scope, ScopeId, ScopeRegistry, SymbolEntry, SymbolValue};
