// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration-block scopes.
//!
//! Scopes mirror the block nesting of declarations (`container`,
//! `reagent`, `protocol`, ...), not full lexical scoping of arbitrary
//! expressions. The parser opens a scope when a declaration block
//! begins and closes it at the closing brace; closed scopes stay
//! registered by name for later lookup by external tools.
//!
//! All scopes live in a [`ScopeRegistry`] arena owned by one parse
//! session; parent links are arena indices.

use std::collections::HashMap;

use ecow::EcoString;

/// A value bound to a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolValue {
    Number(f64),
    Text(EcoString),
}

/// A symbol-table entry: the declared kind's reserved word plus the
/// bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub declared_as: EcoString,
    pub value: SymbolValue,
}

/// One declaration block's symbol table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    name: EcoString,
    symbols: HashMap<EcoString, SymbolEntry>,
    parent: Option<usize>,
}

impl Scope {
    /// The block name this scope was opened for.
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    /// Index of the enclosing scope, if any.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Returns `true` if `symbol` is defined in this scope.
    #[must_use]
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    /// Looks up a symbol in this scope only.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&SymbolEntry> {
        self.symbols.get(symbol)
    }

    /// Defines or overwrites a symbol.
    pub fn put(
        &mut self,
        symbol: impl Into<EcoString>,
        declared_as: impl Into<EcoString>,
        value: SymbolValue,
    ) {
        self.symbols.insert(
            symbol.into(),
            SymbolEntry {
                declared_as: declared_as.into(),
                value,
            },
        );
    }
}

/// Handle to an open or closed scope.
pub type ScopeId = usize;

/// Arena of scopes for one parse session, with the open-scope stack and
/// the name registry of closed scopes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeRegistry {
    scopes: Vec<Scope>,
    by_name: HashMap<EcoString, ScopeId>,
    stack: Vec<ScopeId>,
}

impl ScopeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new scope named `name` under the current one.
    pub fn open(&mut self, name: impl Into<EcoString>) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            name: name.into(),
            symbols: HashMap::new(),
            parent: self.stack.last().copied(),
        });
        self.stack.push(id);
        id
    }

    /// Closes the current scope and registers it by name.
    pub fn close(&mut self) -> Option<ScopeId> {
        let id = self.stack.pop()?;
        let name = self.scopes[id].name.clone();
        self.by_name.insert(name, id);
        Some(id)
    }

    /// The innermost open scope.
    #[must_use]
    pub fn current(&self) -> Option<ScopeId> {
        self.stack.last().copied()
    }

    /// The scope with the given id.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Looks up a previously closed scope by its block name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Scope> {
        self.by_name.get(name).map(|id| &self.scopes[*id])
    }

    /// Defines a symbol in the current scope.
    pub fn define(
        &mut self,
        symbol: impl Into<EcoString>,
        declared_as: impl Into<EcoString>,
        value: SymbolValue,
    ) {
        if let Some(id) = self.current() {
            self.scopes[id].put(symbol, declared_as, value);
        }
    }

    /// Resolves a symbol starting from `scope` and walking outward
    /// through the parent chain.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, symbol: &str) -> Option<&SymbolEntry> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(entry) = self.scopes[id].get(symbol) {
                return Some(entry);
            }
            current = self.scopes[id].parent;
        }
        None
    }
}
