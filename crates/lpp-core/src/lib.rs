// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! L++ compiler front-end.
//!
//! This crate contains the front half of the L++ compiler:
//! - Lexical analysis with identifier/chemical classification
//! - Import linking (recursive token-stream splicing)
//! - Chemical synonym resolution
//! - Parsing (AST construction with inline constant folding)
//! - Context building (AST to simulation graph)
//!
//! The stages compose as a pipeline: text → scan → link → resolve →
//! parse → build. Each stage is usable on its own; the CLI drives them
//! end to end.

#![doc = include_str!("../../../README.md")]

pub mod ast;
pub mod chem;
pub mod context;
pub mod imports;
pub mod parse;
pub mod source_analysis;
pub mod units;
