// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Chemical synonym resolution.
//!
//! The external chemical database sits behind the [`ChemicalResolver`]
//! trait: given an exact synonym, it reports a canonical formula and a
//! registry number, either of which may come back [`Lookup::Canonical`]
//! (the text is already canonical, keep it) or [`Lookup::Missing`]. A
//! missing formula for a synonym that is not itself valid formula
//! syntax is fatal.
//!
//! [`resolve_chemicals`] runs over the merged token stream and
//! overwrites each chemical token's arena slot in place with the
//! resolved formula and registry id.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use std::collections::HashMap;

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::{Span, Token, TokenKind, TokenStream};

/// One field of a synonym lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The database knows this synonym and maps it to the given text.
    Found(EcoString),
    /// The text is already canonical; keep it as-is.
    Canonical,
    /// The synonym is not in the database.
    Missing,
}

/// A synonym lookup result: canonical formula plus registry number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub formula: Lookup,
    pub registry: Lookup,
}

/// The external synonym-database boundary.
pub trait ChemicalResolver {
    /// Looks up an exact (uppercased) synonym.
    fn lookup(&self, synonym: &str) -> Resolution;
}

/// A fatal chemical-resolution error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("The formula synonym '{synonym}' is not supported by the chemical database; enter the compound in its chemical formula format")]
#[diagnostic()]
pub struct ResolveError {
    /// The unsupported synonym.
    pub synonym: EcoString,

    /// Where the synonym appears.
    #[label("unresolved synonym")]
    pub span: Span,
}

/// Returns `true` if `text` already reads as chemical formula syntax:
/// element symbols (capital letter, optional lowercase letter) each
/// followed by an optional count, e.g. `H2O`, `C6H12O6`, `NACL`.
///
/// Uppercased synonyms lose their lowercase letters, so a run of
/// capitals and digits starting with a letter is accepted.
#[must_use]
pub fn is_formula_syntax(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_uppercase() {
        return false;
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Resolves every chemical token in `stream` against `resolver`,
/// overwriting each token slot with the canonical formula and registry
/// id.
pub fn resolve_chemicals(
    stream: &mut TokenStream,
    resolver: &dyn ChemicalResolver,
) -> Result<(), ResolveError> {
    for index in 0..stream.len() {
        let token = &stream.tokens()[index];
        if !matches!(token.kind, TokenKind::Chemical { .. }) {
            continue;
        }
        let synonym = token.text.clone();
        let resolution = resolver.lookup(&synonym);

        let formula = match resolution.formula {
            Lookup::Found(formula) => {
                tracing::debug!(%synonym, %formula, "resolved chemical synonym");
                formula
            }
            Lookup::Canonical => synonym.clone(),
            Lookup::Missing => {
                if is_formula_syntax(&synonym) {
                    synonym.clone()
                } else {
                    return Err(ResolveError {
                        synonym,
                        span: token.span,
                    });
                }
            }
        };
        let registry = match resolution.registry {
            Lookup::Found(id) => Some(id),
            Lookup::Canonical | Lookup::Missing => None,
        };

        let replacement = Token::new(
            TokenKind::Chemical { registry },
            formula,
            token.span,
            token.pos,
        );
        stream.replace(index, replacement);
    }
    Ok(())
}

/// An in-memory synonym table, used by tests and the command-line
/// driver in place of the full chemical database.
#[derive(Debug, Clone, Default)]
pub struct TableResolver {
    entries: HashMap<EcoString, (EcoString, EcoString)>,
}

impl TableResolver {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table preloaded with a handful of common compounds.
    #[must_use]
    pub fn with_common_compounds() -> Self {
        let mut table = Self::new();
        table.insert("WATER", "H2O", "7732-18-5");
        table.insert("GLUCOSE", "C6H12O6", "50-99-7");
        table.insert("ETHANOL", "C2H6O", "64-17-5");
        table.insert("OXYGEN", "O2", "7782-44-7");
        table.insert("AMMONIA", "H3N", "7664-41-7");
        table.insert("PYRUVATE", "C3H4O3", "127-17-3");
        table.insert("LACTATE", "C3H6O3", "50-21-5");
        table
    }

    /// Adds a synonym mapping.
    pub fn insert(
        &mut self,
        synonym: impl Into<EcoString>,
        formula: impl Into<EcoString>,
        registry: impl Into<EcoString>,
    ) {
        self.entries
            .insert(synonym.into(), (formula.into(), registry.into()));
    }
}

impl ChemicalResolver for TableResolver {
    fn lookup(&self, synonym: &str) -> Resolution {
        match self.entries.get(synonym) {
            Some((formula, registry)) => Resolution {
                formula: Lookup::Found(formula.clone()),
                registry: Lookup::Found(registry.clone()),
            },
            None => Resolution {
                formula: Lookup::Missing,
                registry: Lookup::Missing,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{find_chemicals, find_identifiers, scan};

    fn chemical_stream(source: &str) -> TokenStream {
        let (mut stream, diagnostics) = scan(source);
        assert!(!diagnostics.has_errors());
        let identifiers = find_identifiers(&stream);
        find_chemicals(&mut stream, &identifiers);
        stream
    }

    #[test]
    fn formula_syntax_predicate() {
        assert!(is_formula_syntax("H2O"));
        assert!(is_formula_syntax("C6H12O6"));
        assert!(is_formula_syntax("NACL"));
        assert!(!is_formula_syntax("2H2O"));
        assert!(!is_formula_syntax(""));
        assert!(!is_formula_syntax("h2o"));
    }

    #[test]
    fn synonyms_resolve_to_formulas() {
        let mut stream = chemical_stream("reaction r1(eq = water --> ethanol)");
        resolve_chemicals(&mut stream, &TableResolver::with_common_compounds()).unwrap();

        let chemicals: Vec<_> = stream
            .tokens()
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Chemical { registry } => {
                    Some((t.text.as_str(), registry.as_ref().map(EcoString::as_str)))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            chemicals,
            vec![("H2O", Some("7732-18-5")), ("C2H6O", Some("64-17-5"))]
        );
    }

    #[test]
    fn formula_syntax_passes_without_database_entry() {
        let mut stream = chemical_stream("reaction r1(eq = H2O --> O2)");
        resolve_chemicals(&mut stream, &TableResolver::new()).unwrap();
        let texts: Vec<_> = stream
            .tokens()
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Chemical { .. }))
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["H2O", "O2"]);
    }

    #[test]
    fn unresolved_non_formula_synonym_is_fatal() {
        let mut stream = chemical_stream("reaction r1(eq = mystery_goo --> O2)");
        let err = resolve_chemicals(&mut stream, &TableResolver::new()).unwrap_err();
        assert_eq!(err.synonym, "MYSTERY_GOO");
    }
}
