// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic context building: AST to simulation graph.
//!
//! [`build_simulation`] walks a parsed [`Program`](crate::ast::Program)
//! and produces a [`Simulation`]: a compartment holding molecules with
//! count schedules and reactions with inferred kinetic types. See
//! [`intervals`] for how conflicting fixed-count windows are merged.

mod builder;
mod error;
mod intervals;
mod reaction;
mod simulation;

pub use builder::{build_simulation, Built};
pub use error::{BuildError, BuildErrorKind, IntervalError};
pub use intervals::{AddedInterval, FixedCountHandler};
pub use reaction::{
    is_kinetic_param, KineticType, Reaction, Regulation, RegulationKind, KINETIC_PARAMS,
};
pub use simulation::{
    Compartment, CompartmentKind, Molecule, MoleculeId, Simulation, DEFAULT_VOLUME,
};
