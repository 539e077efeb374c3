// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Build the simulation context and print its contents.

use camino::Utf8PathBuf;
use lpp_core::context::{Compartment, Reaction, RegulationKind};
use miette::Result;
use tracing::{info, instrument};

use super::{compile, read_source, report_diagnostics};

/// Build an L++ source file into a simulation context.
///
/// Prints every molecule with its scheduled counts and every reaction
/// with its inferred kinetic class.
#[instrument(skip_all, fields(path = %path))]
pub fn build(path: &str) -> Result<()> {
    let path = Utf8PathBuf::from(path);
    let source = read_source(&path)?;
    let mut compiled = compile(&path, &source)?;

    let errors = report_diagnostics(&compiled.diagnostics, path.as_str(), &source);
    if errors > 0 {
        miette::bail!("{errors} error(s) in '{path}'");
    }

    let simulation = &mut compiled.simulation;
    info!(
        simulation = %simulation.name(),
        molecules = simulation.global().molecules().len(),
        reactions = simulation.global().reactions().len(),
        "context built"
    );

    println!("simulation {}", simulation.name());
    print_molecules(simulation.global_mut());
    print_reactions(simulation.global());
    Ok(())
}

fn print_molecules(compartment: &mut Compartment) {
    for index in 0..compartment.molecules().len() {
        let molecule = compartment.molecule_mut(index);
        let name = molecule.name().clone();
        match molecule.initial_count() {
            Some(count) => println!("  molecule {name} = {count}"),
            None => println!("  molecule {name}"),
        }
        for (time, count) in molecule.change_points() {
            println!("    at {time}: {count}");
        }
        let points = molecule.interval_points().to_vec();
        for (start, count) in points {
            match count {
                Some(count) => println!("    from {start}: fixed at {count}"),
                None => println!("    from {start}: free"),
            }
        }
    }
}

fn print_reactions(compartment: &Compartment) {
    for reaction in compartment.reactions() {
        println!(
            "  reaction {} [{}] {}",
            reaction.name(),
            reaction.kinetics(),
            equation_text(compartment, reaction)
        );
        for (param, value) in reaction.parameters() {
            println!("    {} = {value}", param.as_str());
        }
        if let Some(enzyme) = reaction.protein() {
            println!("    enzyme {}", compartment.molecule(enzyme).name());
        }
        if let Some(regulation) = reaction.regulation() {
            let verb = match regulation.kind {
                RegulationKind::Activation => "activated by",
                RegulationKind::Inhibition => "inhibited by",
            };
            println!(
                "    {} {} (as {})",
                verb,
                compartment.molecule(regulation.regulator).name(),
                regulation.declared_as
            );
            for (param, value) in &regulation.parameters {
                println!("      {} = {value}", param.as_str());
            }
        }
    }
}

/// Renders a reaction's equation from its stoichiometry.
fn equation_text(compartment: &Compartment, reaction: &Reaction) -> String {
    let side = |molecules: &[usize]| {
        molecules
            .iter()
            .map(|&id| {
                let name = compartment.molecule(id).name();
                let coefficient = reaction.stoichiometric_coefficient(id).abs();
                if coefficient > 1 {
                    format!("{coefficient} {name}")
                } else {
                    name.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" + ")
    };
    format!("{} --> {}", side(reaction.reactants()), side(reaction.products()))
}
