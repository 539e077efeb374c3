// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Print the classified token stream for a source file.

use camino::Utf8PathBuf;
use lpp_core::source_analysis::{find_chemicals, find_identifiers, scan, TokenKind};
use miette::Result;
use tracing::instrument;

use super::{read_source, report_diagnostics};

/// Tokenize an L++ source file and print one token per line.
///
/// The stream is shown after word classification, so identifiers that
/// the reaction regions reclassify appear as chemical tokens.
#[instrument(skip_all, fields(path = %path))]
pub fn tokens(path: &str) -> Result<()> {
    let path = Utf8PathBuf::from(path);
    let source = read_source(&path)?;

    let (mut stream, diagnostics) = scan(&source);
    let identifiers = find_identifiers(&stream);
    find_chemicals(&mut stream, &identifiers);

    for token in stream.tokens() {
        if matches!(token.kind, TokenKind::Start | TokenKind::End) {
            continue;
        }
        println!("{} {:?} {:?}", token.pos, token.kind, token.text.as_str());
    }

    let errors = report_diagnostics(&diagnostics, path.as_str(), &source);
    if errors > 0 {
        miette::bail!("{errors} error(s) in '{path}'");
    }
    Ok(())
}
