// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! L++ compiler command-line interface.
//!
//! This is the main entry point for the `lpp` command.

use clap::{Parser, Subcommand};
use miette::Result;

mod commands;
mod diagnostic;

/// L++: a laboratory protocol language for biochemical simulation
#[derive(Debug, Parser)]
#[command(name = "lpp")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a source file for errors without building a simulation
    Check {
        /// Source file to check
        path: String,
    },

    /// Build the simulation context and print its contents
    Build {
        /// Source file to build
        path: String,
    },

    /// Print the classified token stream for a source file
    Tokens {
        /// Source file to tokenize
        path: String,
    },
}

/// Initialize logging, filtered by `RUST_LOG`.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() -> Result<()> {
    init_logging();

    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { path } => commands::check::check(&path),
        Command::Build { path } => commands::build::build(&path),
        Command::Tokens { path } => commands::tokens::tokens(&path),
    };

    // Exit with appropriate code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
