// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Post-lexical identifier and chemical classification passes.
//!
//! Declared names ("true identifiers") are collected first: any
//! identifier token inside a declaration head — the window opened by a
//! keyword, primitive, or `return` token and closed by `,` `;` `(` `)`
//! `{` `}` — names something the program declares. The chemical pass
//! then reclassifies identifier tokens inside `reaction`/`reagent`
//! bodies that are NOT true identifiers as chemical references,
//! uppercasing their text. This is what tells `Water` the declared
//! variable apart from `H2O` (or `Water`) the chemical.

use std::collections::HashSet;

use ecow::EcoString;

use super::token::{Keyword, Symbol, Token, TokenKind, TokenStream};

/// Symbols that close a declaration-head window.
fn closes_declaration(symbol: Symbol) -> bool {
    matches!(
        symbol,
        Symbol::Comma
            | Symbol::Semicolon
            | Symbol::LeftParen
            | Symbol::RightParen
            | Symbol::LeftBrace
            | Symbol::RightBrace
    )
}

/// Collects the set of true identifiers declared anywhere in `stream`.
#[must_use]
pub fn find_identifiers(stream: &TokenStream) -> HashSet<EcoString> {
    let mut identifiers = HashSet::new();
    let mut in_declaration = false;
    for token in stream.tokens() {
        match &token.kind {
            TokenKind::Keyword(_) | TokenKind::Primitive(_) | TokenKind::Return => {
                in_declaration = true;
            }
            TokenKind::Symbol(s) if closes_declaration(*s) => {
                in_declaration = false;
            }
            TokenKind::Identifier if in_declaration => {
                tracing::debug!(name = %token.text, "located identifier");
                identifiers.insert(token.text.clone());
            }
            _ => {}
        }
    }
    identifiers
}

/// Reclassifies non-declared identifiers inside `reaction`/`reagent`
/// parameter regions as chemical tokens, uppercasing their text.
pub fn find_chemicals(stream: &mut TokenStream, identifiers: &HashSet<EcoString>) {
    let mut in_params = false;
    for index in 0..stream.len() {
        let token = &stream.tokens()[index];
        match &token.kind {
            TokenKind::Keyword(Keyword::Reaction | Keyword::Reagent) => {
                // The name sits between the keyword and its opener.
                let opener = stream.get(index + 2).map(|t| &t.kind);
                if matches!(
                    opener,
                    Some(TokenKind::Symbol(Symbol::LeftParen | Symbol::LeftBrace))
                ) {
                    in_params = true;
                }
            }
            TokenKind::Symbol(Symbol::RightParen | Symbol::RightBrace) => {
                in_params = false;
            }
            TokenKind::Identifier if in_params && !identifiers.contains(&token.text) => {
                let formula: EcoString = token.text.to_uppercase().into();
                tracing::debug!(synonym = %token.text, %formula, "reclassified as chemical");
                let replacement = Token::new(
                    TokenKind::Chemical { registry: None },
                    formula,
                    token.span,
                    token.pos,
                );
                stream.replace(index, replacement);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::scan;

    #[test]
    fn declared_names_are_true_identifiers() {
        let (stream, _) = scan("reagent broth { int count = 2; }");
        let identifiers = find_identifiers(&stream);
        assert!(identifiers.contains("broth"));
        assert!(identifiers.contains("count"));
    }

    #[test]
    fn window_closes_at_delimiters() {
        let (stream, _) = scan("container c1 { water = 5; }");
        let identifiers = find_identifiers(&stream);
        assert!(identifiers.contains("c1"));
        // `water` appears after `{` closed the declaration window.
        assert!(!identifiers.contains("water"));
    }

    #[test]
    fn unknown_names_in_reaction_params_become_chemicals() {
        let (mut stream, _) = scan("reaction r1(eq = Water --> Ethanol)");
        let identifiers = find_identifiers(&stream);
        find_chemicals(&mut stream, &identifiers);

        let chemicals: Vec<_> = stream
            .tokens()
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Chemical { .. }))
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(chemicals, vec!["WATER", "ETHANOL"]);
    }

    #[test]
    fn declared_names_are_not_reclassified() {
        let (mut stream, _) = scan("int speed = 3; reaction r2(eq = speed --> B)");
        let identifiers = find_identifiers(&stream);
        find_chemicals(&mut stream, &identifiers);

        let speed = stream
            .tokens()
            .iter()
            .find(|t| t.text.eq_ignore_ascii_case("speed"))
            .unwrap();
        assert_eq!(speed.kind, TokenKind::Identifier);
    }

    #[test]
    fn unit_words_in_reaction_params_stay_units() {
        // `A` is the ampere; only identifier tokens become chemicals.
        let (mut stream, _) = scan("reaction r3(eq = A --> B)");
        let identifiers = find_identifiers(&stream);
        find_chemicals(&mut stream, &identifiers);

        let ampere = stream.tokens().iter().find(|t| t.text == "A").unwrap();
        assert_eq!(ampere.kind, TokenKind::Unit);
        let b = stream.tokens().iter().find(|t| t.text == "B").unwrap();
        assert!(matches!(b.kind, TokenKind::Chemical { .. }));
    }

    #[test]
    fn identifiers_outside_reaction_untouched() {
        let (mut stream, _) = scan("water = 5;");
        let identifiers = find_identifiers(&stream);
        find_chemicals(&mut stream, &identifiers);
        assert_eq!(stream.get(1).unwrap().kind, TokenKind::Identifier);
    }
}
