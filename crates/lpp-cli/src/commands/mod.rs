// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Command implementations for the `lpp` CLI.

pub mod build;
pub mod check;
pub mod tokens;

use camino::Utf8Path;
use lpp_core::chem::{resolve_chemicals, TableResolver};
use lpp_core::context::{build_simulation, Simulation};
use lpp_core::imports::{link_imports, FsLoader};
use lpp_core::parse::parse;
use lpp_core::source_analysis::{find_chemicals, find_identifiers, scan, Diagnostics, Severity};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::debug;

use crate::diagnostic::{with_source, CompileDiagnostic};

/// Everything the front end produces for one root source file.
pub(crate) struct Compiled {
    pub simulation: Simulation,
    pub diagnostics: Diagnostics,
}

/// Reads a source file into memory.
pub(crate) fn read_source(path: &Utf8Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read '{path}'"))
}

/// Runs the full front end on one root file: scan, classify words,
/// link imports, resolve chemical synonyms, parse, and build the
/// simulation context.
pub(crate) fn compile(path: &Utf8Path, source: &str) -> Result<Compiled> {
    let path_str = path.as_str();
    let (mut stream, mut diagnostics) = scan(source);
    debug!(file = %path, tokens = stream.len(), "scanned");

    let identifiers = find_identifiers(&stream);
    find_chemicals(&mut stream, &identifiers);

    let mut stream = link_imports(path.to_owned(), stream, &FsLoader, &mut diagnostics)
        .map_err(|e| with_source(e, path_str, source))?;

    let resolver = TableResolver::with_common_compounds();
    resolve_chemicals(&mut stream, &resolver).map_err(|e| with_source(e, path_str, source))?;

    let mut parsed = parse(&stream).map_err(|e| with_source(e, path_str, source))?;
    diagnostics.append(&mut parsed.diagnostics);

    let name = path.file_stem().unwrap_or("simulation");
    let mut built =
        build_simulation(name, &parsed.program).map_err(|e| with_source(e, path_str, source))?;
    diagnostics.append(&mut built.diagnostics);

    Ok(Compiled {
        simulation: built.simulation,
        diagnostics,
    })
}

/// Renders every collected diagnostic and returns the number of errors
/// among them.
pub(crate) fn report_diagnostics(diagnostics: &Diagnostics, path: &str, source: &str) -> usize {
    let mut errors = 0;
    for entry in diagnostics.entries() {
        if entry.severity == Severity::Error {
            errors += 1;
        }
        let report =
            miette::Report::new(CompileDiagnostic::from_core_diagnostic(entry, path, source));
        eprintln!("{report:?}");
    }
    errors
}
