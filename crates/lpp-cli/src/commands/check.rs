// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Check a source file for errors without printing the built context.

use camino::Utf8PathBuf;
use miette::Result;
use tracing::{info, instrument};

use super::{compile, read_source, report_diagnostics};

/// Check an L++ source file.
///
/// Runs the full front end, including the context build, but discards
/// the simulation. Warnings are rendered; any error fails the check.
#[instrument(skip_all, fields(path = %path))]
pub fn check(path: &str) -> Result<()> {
    let path = Utf8PathBuf::from(path);
    let source = read_source(&path)?;
    let compiled = compile(&path, &source)?;

    let errors = report_diagnostics(&compiled.diagnostics, path.as_str(), &source);
    if errors > 0 {
        miette::bail!("{errors} error(s) in '{path}'");
    }

    info!(file = %path, "check passed");
    println!("{path}: ok");
    Ok(())
}
