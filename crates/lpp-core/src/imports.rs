// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Import resolution and token-stream merging.
//!
//! An `import name;` statement pulls in `<directory>/<name>.lpp`.
//! Discovery walks the token stream, tokenizes each target (running the
//! identifier and chemical passes on it), and recurses depth-first with
//! a visited set so a file is expanded at most once. Merging then
//! splices each dependency's tokens ahead of the importer's own body —
//! the tokens following the last import's semicolon — so transitively
//! imported code comes first and the import statements themselves are
//! dropped.
//!
//! Only direct self-import is rejected as a circular dependency; a
//! longer cycle terminates through the visited set and inlines a single
//! copy of each file.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::{
    find_chemicals, find_identifiers, Diagnostics, Scanner, Span, Symbol, Token, TokenKind,
    TokenStream,
};

/// File extension for L++ sources.
pub const SOURCE_EXTENSION: &str = "lpp";

/// A fatal import-linking error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[diagnostic()]
pub enum LinkError {
    #[error("Tried to import yourself, creating circular dependency")]
    SelfImport {
        name: EcoString,
        #[label("self-import")]
        span: Span,
    },

    #[error("Semicolon not found after 'import {name}'")]
    MissingSemicolon {
        name: EcoString,
        #[label("expected ';' after this import")]
        span: Span,
    },

    #[error("Cannot read imported file '{path}': {message}")]
    Io { path: Utf8PathBuf, message: String },
}

/// Loads source text for import targets.
///
/// The filesystem implementation is [`FsLoader`]; tests use
/// [`MemoryLoader`].
pub trait SourceLoader {
    /// Reads the file at `path`.
    fn load(&self, path: &Utf8Path) -> Result<String, LinkError>;
}

/// Loads imports from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Utf8Path) -> Result<String, LinkError> {
        std::fs::read_to_string(path).map_err(|e| LinkError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        })
    }
}

/// Loads imports from an in-memory file map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: std::collections::HashMap<Utf8PathBuf, String>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    pub fn insert(&mut self, path: impl Into<Utf8PathBuf>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Utf8Path) -> Result<String, LinkError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LinkError::Io {
                path: path.to_owned(),
                message: "file not found".into(),
            })
    }
}

/// One source file's token stream plus its import dependencies.
#[derive(Debug, Clone)]
pub struct FileNode {
    path: Utf8PathBuf,
    stream: TokenStream,
    /// Index of the first token after the last import's semicolon.
    body_start: usize,
    dependencies: Vec<FileNode>,
}

impl FileNode {
    /// Wraps an already-tokenized file.
    #[must_use]
    pub fn new(path: Utf8PathBuf, stream: TokenStream) -> Self {
        Self {
            path,
            stream,
            body_start: 1, // after the Start sentinel
            dependencies: Vec::new(),
        }
    }

    /// The file's path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Direct dependencies, in discovery order.
    #[must_use]
    pub fn dependencies(&self) -> &[FileNode] {
        &self.dependencies
    }

    /// Appends this file's merged tokens (dependencies first, then own
    /// body, sentinels stripped) to `out`.
    fn append_merged(&self, out: &mut Vec<Token>) {
        for dependency in &self.dependencies {
            dependency.append_merged(out);
        }
        let end = self.stream.len().saturating_sub(1); // drop the End sentinel
        for token in &self.stream.tokens()[self.body_start..end] {
            out.push(token.clone());
        }
    }
}

/// Resolves all imports reachable from `root` and returns the merged
/// stream. Lexical diagnostics from dependency files are appended to
/// `diagnostics`.
pub fn link_imports(
    path: Utf8PathBuf,
    stream: TokenStream,
    loader: &dyn SourceLoader,
    diagnostics: &mut Diagnostics,
) -> Result<TokenStream, LinkError> {
    let mut root = FileNode::new(path, stream);
    let mut visited = HashSet::new();
    discover(&mut root, loader, &mut visited, diagnostics)?;

    let start = root.stream.tokens()[0].clone();
    let end = root.stream.tokens()[root.stream.len() - 1].clone();
    let mut tokens = vec![start];
    root.append_merged(&mut tokens);
    tokens.push(end);
    tracing::debug!(
        file = %root.path,
        dependencies = root.dependencies.len(),
        tokens = tokens.len(),
        "imports linked"
    );
    Ok(TokenStream::from_tokens(tokens))
}

/// Walks `node`'s stream for import statements, tokenizing and
/// recursively discovering each target, depth-first.
fn discover(
    node: &mut FileNode,
    loader: &dyn SourceLoader,
    visited: &mut HashSet<Utf8PathBuf>,
    diagnostics: &mut Diagnostics,
) -> Result<(), LinkError> {
    visited.insert(node.path.clone());
    let directory = node
        .path
        .parent()
        .map_or_else(Utf8PathBuf::new, Utf8Path::to_owned);

    let mut index = 0;
    while index < node.stream.len() {
        let token = &node.stream.tokens()[index];
        if token.kind != TokenKind::ImportName {
            index += 1;
            continue;
        }
        let name = token.text.clone();
        let span = token.span;
        let target = directory.join(format!("{name}.{SOURCE_EXTENSION}"));

        if target == node.path {
            return Err(LinkError::SelfImport { name, span });
        }
        let semicolon = node.stream.get(index + 1);
        if !semicolon.is_some_and(|t| t.kind.is_symbol(Symbol::Semicolon)) {
            return Err(LinkError::MissingSemicolon { name, span });
        }
        node.body_start = index + 2;

        if visited.contains(&target) {
            index += 1;
            continue;
        }
        tracing::debug!(importer = %node.path, target = %target, "resolving import");
        let source = loader.load(&target)?;
        let (mut stream, mut dependency_diagnostics) = Scanner::new(&source).scan();
        diagnostics.append(&mut dependency_diagnostics);
        let identifiers = find_identifiers(&stream);
        find_chemicals(&mut stream, &identifiers);

        let mut dependency = FileNode::new(target, stream);
        discover(&mut dependency, loader, visited, diagnostics)?;
        node.dependencies.push(dependency);
        index += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::scan;

    fn link(main: &str, files: &[(&str, &str)]) -> Result<TokenStream, LinkError> {
        let mut loader = MemoryLoader::new();
        for (path, source) in files {
            loader.insert(*path, *source);
        }
        let (stream, _) = scan(main);
        let mut diagnostics = Diagnostics::new();
        link_imports("main.lpp".into(), stream, &loader, &mut diagnostics)
    }

    fn texts(stream: &TokenStream) -> Vec<&str> {
        stream
            .tokens()
            .iter()
            .filter(|t| !matches!(t.kind, TokenKind::Start | TokenKind::End))
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn dependency_code_precedes_importer_body() {
        let merged = link(
            "import defs; water = 5;",
            &[("defs.lpp", "int base = 1;")],
        )
        .unwrap();
        assert_eq!(
            texts(&merged),
            vec!["int", "base", "=", "1", ";", "water", "=", "5", ";"]
        );
    }

    #[test]
    fn transitive_imports_are_inlined_depth_first() {
        let merged = link(
            "import a; x = 1;",
            &[("a.lpp", "import b; y = 2;"), ("b.lpp", "z = 3;")],
        )
        .unwrap();
        assert_eq!(
            texts(&merged),
            vec!["z", "=", "3", ";", "y", "=", "2", ";", "x", "=", "1", ";"]
        );
    }

    #[test]
    fn diamond_imports_expand_once() {
        let merged = link(
            "import a; import b; x = 1;",
            &[
                ("a.lpp", "import shared; y = 2;"),
                ("b.lpp", "import shared; z = 3;"),
                ("shared.lpp", "s = 0;"),
            ],
        )
        .unwrap();
        let all = texts(&merged);
        assert_eq!(all.iter().filter(|t| **t == "s").count(), 1);
        assert_eq!(
            all,
            vec!["s", "=", "0", ";", "y", "=", "2", ";", "z", "=", "3", ";", "x", "=", "1", ";"]
        );
    }

    #[test]
    fn self_import_is_fatal_before_splicing() {
        let err = link("import main; x = 1;", &[]).unwrap_err();
        assert!(matches!(err, LinkError::SelfImport { .. }));
    }

    #[test]
    fn missing_semicolon_is_fatal() {
        let err = link("import defs x = 1;", &[("defs.lpp", "y = 2;")]).unwrap_err();
        assert!(matches!(err, LinkError::MissingSemicolon { .. }));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = link("import nowhere; x = 1;", &[]).unwrap_err();
        assert!(matches!(err, LinkError::Io { .. }));
    }

    #[test]
    fn no_imports_passes_stream_through() {
        let merged = link("water = 5;", &[]).unwrap();
        assert_eq!(texts(&merged), vec!["water", "=", "5", ";"]);
    }
}
