// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The simulation object graph: compartments, molecules, reactions.
//!
//! A [`Compartment`] owns its molecules and reactions in declaration
//! order, with name lookup maps alongside. Molecules are referred to by
//! [`MoleculeId`] (their index within the owning compartment) rather
//! than by reference, so reactions can point at them without borrow
//! entanglement. Molecules and reactions are created lazily the first
//! time an assignment or equation names them.

use std::collections::HashMap;

use ecow::EcoString;

use super::error::IntervalError;
use super::intervals::{AddedInterval, FixedCountHandler};
use super::reaction::Reaction;

/// Index of a molecule within its owning compartment.
pub type MoleculeId = usize;

/// Volume assumed for compartments that never declare one.
pub const DEFAULT_VOLUME: f64 = 1.0;

/// A chemical species within a compartment.
#[derive(Debug, Clone)]
pub struct Molecule {
    name: EcoString,
    index: MoleculeId,
    initial_count: Option<f64>,
    counts: FixedCountHandler,
}

impl Molecule {
    fn new(name: impl Into<EcoString>, index: MoleculeId) -> Self {
        Self {
            name: name.into(),
            index,
            initial_count: None,
            counts: FixedCountHandler::new(),
        }
    }

    /// The molecule's name (an identifier or a chemical formula).
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    /// The molecule's index within its compartment.
    #[must_use]
    pub fn index_in_compartment(&self) -> MoleculeId {
        self.index
    }

    /// The starting count, if one was assigned.
    #[must_use]
    pub fn initial_count(&self) -> Option<f64> {
        self.initial_count
    }

    /// Assigns the starting count.
    pub fn set_initial_count(&mut self, count: f64) {
        self.initial_count = Some(count);
    }

    /// The permanent fixed count, if one was declared.
    #[must_use]
    pub fn baseline(&self) -> Option<f64> {
        self.counts.baseline()
    }

    /// Pins the count permanently; also becomes the starting count.
    /// Returns the shadowed baseline, if any.
    pub fn set_baseline(&mut self, value: f64) -> Option<f64> {
        self.initial_count = Some(value);
        self.counts.set_baseline(value)
    }

    /// Records a discrete count change at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::NegativeTime`] when `time < 0`.
    pub fn add_change_point(&mut self, time: f64, value: f64) -> Result<Option<f64>, IntervalError> {
        self.counts.add_change_point(time, value)
    }

    /// Declares a fixed count over `[start, end)`. A `[0, ∞)` window
    /// becomes the baseline (and the starting count).
    ///
    /// # Errors
    ///
    /// Returns an error for negative bounds or `end < start`.
    pub fn add_interval(
        &mut self,
        value: f64,
        start: f64,
        end: f64,
    ) -> Result<AddedInterval, IntervalError> {
        let added = self.counts.add_interval(value, start, end)?;
        if matches!(added, AddedInterval::Baseline { .. }) {
            self.initial_count = Some(value);
        }
        Ok(added)
    }

    /// The discrete change points, sorted by time.
    #[must_use]
    pub fn change_points(&self) -> &[(f64, f64)] {
        self.counts.change_points()
    }

    /// The resolved window breakpoints; see
    /// [`FixedCountHandler::interval_points`].
    pub fn interval_points(&mut self) -> &[(f64, Option<f64>)] {
        self.counts.interval_points()
    }
}

/// Whether a compartment models a physical region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompartmentKind {
    NonSpatial,
    Container,
}

/// A nested region owning molecules, reactions, and child compartments.
#[derive(Debug, Clone)]
pub struct Compartment {
    name: EcoString,
    kind: CompartmentKind,
    volume: f64,
    children: Vec<Compartment>,
    molecules: Vec<Molecule>,
    molecule_index: HashMap<EcoString, MoleculeId>,
    reactions: Vec<Reaction>,
    reaction_index: HashMap<EcoString, usize>,
    /// Set when any molecule's count is pinned permanently.
    pub has_constant_molecules: bool,
    /// Set when any molecule has discrete change points.
    pub has_changed_molecules: bool,
    /// Set when any molecule has bounded fixed-count windows.
    pub has_fixed_molecules: bool,
}

impl Compartment {
    /// Creates an empty compartment.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, kind: CompartmentKind, volume: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            volume,
            children: Vec::new(),
            molecules: Vec::new(),
            molecule_index: HashMap::new(),
            reactions: Vec::new(),
            reaction_index: HashMap::new(),
            has_constant_molecules: false,
            has_changed_molecules: false,
            has_fixed_molecules: false,
        }
    }

    /// The compartment's name.
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    /// Whether the compartment is spatial.
    #[must_use]
    pub fn kind(&self) -> CompartmentKind {
        self.kind
    }

    /// The compartment's volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// The child compartments.
    #[must_use]
    pub fn children(&self) -> &[Compartment] {
        &self.children
    }

    /// Adds a child compartment.
    pub fn add_child(&mut self, child: Compartment) {
        self.children.push(child);
    }

    /// The molecules, in first-reference order.
    #[must_use]
    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    /// Returns `true` if a molecule named `name` exists.
    #[must_use]
    pub fn has_molecule(&self, name: &str) -> bool {
        self.molecule_index.contains_key(name)
    }

    /// Looks up a molecule by name.
    #[must_use]
    pub fn molecule_named(&self, name: &str) -> Option<MoleculeId> {
        self.molecule_index.get(name).copied()
    }

    /// The molecule with the given id.
    #[must_use]
    pub fn molecule(&self, id: MoleculeId) -> &Molecule {
        &self.molecules[id]
    }

    /// Mutable access to the molecule with the given id.
    pub fn molecule_mut(&mut self, id: MoleculeId) -> &mut Molecule {
        &mut self.molecules[id]
    }

    /// Looks up a molecule by name, creating it on first reference.
    pub fn intern_molecule(&mut self, name: &str) -> MoleculeId {
        if let Some(&id) = self.molecule_index.get(name) {
            return id;
        }
        let id = self.molecules.len();
        self.molecules.push(Molecule::new(name, id));
        self.molecule_index.insert(name.into(), id);
        id
    }

    /// The reactions, in declaration order.
    #[must_use]
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Returns `true` if a reaction named `name` exists.
    #[must_use]
    pub fn has_reaction(&self, name: &str) -> bool {
        self.reaction_index.contains_key(name)
    }

    /// Looks up a reaction by name.
    #[must_use]
    pub fn reaction_named(&self, name: &str) -> Option<&Reaction> {
        self.reaction_index
            .get(name)
            .map(|&index| &self.reactions[index])
    }

    /// Adds a reaction under its name.
    pub fn add_reaction(&mut self, reaction: Reaction) {
        self.reaction_index
            .insert(reaction.name().clone(), self.reactions.len());
        self.reactions.push(reaction);
    }

    /// Removes and returns the reaction named `name`, keeping the
    /// remaining reactions' declaration order and lookup indices
    /// consistent.
    pub fn remove_reaction(&mut self, name: &str) -> Option<Reaction> {
        let index = self.reaction_index.remove(name)?;
        let removed = self.reactions.remove(index);
        for slot in self.reaction_index.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(removed)
    }
}

/// A whole simulation: a named root compartment tree.
#[derive(Debug, Clone)]
pub struct Simulation {
    name: EcoString,
    global: Compartment,
}

impl Simulation {
    /// Creates an empty simulation with a non-spatial global
    /// compartment.
    #[must_use]
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            global: Compartment::new("global", CompartmentKind::NonSpatial, DEFAULT_VOLUME),
        }
    }

    /// The simulation's name.
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    /// The root compartment.
    #[must_use]
    pub fn global(&self) -> &Compartment {
        &self.global
    }

    /// Mutable access to the root compartment.
    pub fn global_mut(&mut self) -> &mut Compartment {
        &mut self.global
    }
}
