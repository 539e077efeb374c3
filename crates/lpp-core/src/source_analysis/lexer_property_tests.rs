// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the L++ scanner.
//!
//! These tests use `proptest` to verify scanner invariants over
//! generated inputs:
//!
//! 1. **Scanner never panics** — arbitrary string input always scans
//! 2. **Token spans within input** — all spans satisfy `end <= input.len()`
//! 3. **Token spans are non-overlapping** — spans are ordered
//! 4. **Sentinels bound every stream** — Start first, End last
//! 5. **Symbol round-trip** — recognized symbol texts joined by single
//!    spaces reproduce the input when token texts are re-joined
//! 6. **Tab columns** — a consumed tab always lands the column on a
//!    multiple of 8
//! 7. **Reserved-set partition** — a word never classifies as both a
//!    keyword and a parameter, and identifiers sit in no reserved set

use proptest::prelude::*;

use super::lexer::scan;
use super::token::{classify_word, Keyword, Param, TokenKind};
use super::TAB_WIDTH;

/// Recognized symbol texts with canonical single-space separation.
const SYMBOL_TEXTS: &[&str] = &[
    "+", "-", "*", "/", "=", "!", ",", ".", ">=", "<=", ">", "<", "?", "%", "^", "|", "&", ":",
    ";", "(", ")", "{", "}", "[", "]",
];

fn symbol_sequence() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(SYMBOL_TEXTS), 1..20)
        .prop_map(|texts| texts.join(" "))
}

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,10}"
}

/// Default is 512 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Scanner never panics on arbitrary string input.
    #[test]
    fn scanner_never_panics(input in "\\PC{0,500}") {
        let _ = scan(&input);
    }

    /// Property 2: All token spans are within input bounds.
    #[test]
    fn token_spans_within_input(input in "\\PC{0,500}") {
        let (stream, _) = scan(&input);
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for token in stream.tokens() {
            prop_assert!(
                token.span.end() <= input_len,
                "Token {:?} span end {} exceeds input length {} for input {:?}",
                token.kind,
                token.span.end(),
                input_len,
                input,
            );
            prop_assert!(token.span.start() <= token.span.end());
        }
    }

    /// Property 3: Token spans are non-overlapping and ordered.
    #[test]
    fn token_spans_non_overlapping(input in "\\PC{0,500}") {
        let (stream, _) = scan(&input);
        for window in stream.tokens().windows(2) {
            prop_assert!(
                window[1].span.start() >= window[0].span.end(),
                "Overlapping spans: {:?} at {:?} and {:?} at {:?} for input {:?}",
                window[0].kind,
                window[0].span,
                window[1].kind,
                window[1].span,
                input,
            );
        }
    }

    /// Property 4: Start and End sentinels bound every stream.
    #[test]
    fn sentinels_bound_stream(input in "\\PC{0,500}") {
        let (stream, _) = scan(&input);
        prop_assert!(stream.len() >= 2);
        prop_assert_eq!(&stream.tokens()[0].kind, &TokenKind::Start);
        prop_assert_eq!(&stream.tokens()[stream.len() - 1].kind, &TokenKind::End);
    }

    /// Property 5: Symbol texts round-trip through the scanner.
    #[test]
    fn symbol_round_trip(input in symbol_sequence()) {
        let (stream, diagnostics) = scan(&input);
        prop_assert!(!diagnostics.has_errors());
        let joined = stream
            .tokens()
            .iter()
            .filter(|t| !matches!(t.kind, TokenKind::Start | TokenKind::End))
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(joined, input);
    }

    /// Property 6: After a tab, the next token's column is a multiple of 8.
    #[test]
    fn tab_columns_are_multiples_of_eight(words in prop::collection::vec(word(), 1..8)) {
        let input = words.join("\t");
        let (stream, _) = scan(&input);
        for token in stream.tokens().iter().skip(2) {
            if matches!(token.kind, TokenKind::Start | TokenKind::End) {
                continue;
            }
            prop_assert_eq!(
                token.pos.column % TAB_WIDTH,
                0,
                "column {} after tab not a tab stop for input {:?}",
                token.pos.column,
                input,
            );
        }
    }

    /// Property 7: No word is both a keyword and a parameter, and a word
    /// classified as an identifier appears in no reserved set.
    #[test]
    fn reserved_sets_partition(word in word()) {
        prop_assert!(
            !(Keyword::from_word(&word).is_some() && Param::from_word(&word).is_some()),
            "{:?} is both keyword and param",
            word,
        );
        if classify_word(&word, false) == TokenKind::Identifier {
            prop_assert!(Keyword::from_word(&word).is_none());
            prop_assert!(Param::from_word(&word).is_none());
        }
    }

    /// Scanner is deterministic: same input, same stream.
    #[test]
    fn scanner_deterministic(input in "\\PC{0,200}") {
        let (a, _) = scan(&input);
        let (b, _) = scan(&input);
        prop_assert_eq!(a, b);
    }
}
