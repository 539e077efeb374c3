// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Reactions, kinetic types, and regulation overlays.
//!
//! A reaction starts with an undetermined kinetic type and a parameter
//! map; the builder infers the type by trying a fixed candidate list
//! and picking the first whose required parameters are exactly
//! satisfied. An activation or inhibition arrow re-wraps an existing
//! standard unregulated reaction with a [`Regulation`] carrying the
//! regulator molecule and a separate parameter map; type inference
//! then runs against that map instead.

use std::collections::BTreeMap;

use ecow::EcoString;

use crate::ast::ParamKind;

use super::simulation::MoleculeId;

/// The kinetic classes a reaction can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KineticType {
    Undetermined,
    StandardUnregulated,
    StandardAllostericInhibition,
    StandardAllostericActivation,
    EnzymaticStandardUnregulated,
    MichaelisMentenUnregulated,
    ReceptorBinding,
    CrossBoundaryStandardUnregulated,
    CrossBoundaryEnzymaticStandardUnregulated,
    CrossBoundaryMichaelisMentenUnregulated,
}

impl KineticType {
    /// The conventional acronym for the class.
    #[must_use]
    pub const fn acronym(self) -> &'static str {
        match self {
            Self::Undetermined => "undetermined",
            Self::StandardUnregulated => "SU",
            Self::StandardAllostericInhibition => "SAI",
            Self::StandardAllostericActivation => "SAA",
            Self::EnzymaticStandardUnregulated => "ESU",
            Self::MichaelisMentenUnregulated => "MMU",
            Self::ReceptorBinding => "RB",
            Self::CrossBoundaryStandardUnregulated => "CBSU",
            Self::CrossBoundaryEnzymaticStandardUnregulated => "CBESU",
            Self::CrossBoundaryMichaelisMentenUnregulated => "CBMMU",
        }
    }

    /// The parameters a reaction must supply to take this type.
    #[must_use]
    pub const fn required_params(self) -> &'static [ParamKind] {
        match self {
            Self::StandardUnregulated | Self::EnzymaticStandardUnregulated => {
                &[ParamKind::K, ParamKind::Krev]
            }
            Self::StandardAllostericInhibition => &[ParamKind::Ki, ParamKind::N],
            Self::StandardAllostericActivation => &[ParamKind::Ka, ParamKind::N],
            Self::MichaelisMentenUnregulated => &[ParamKind::Kcat, ParamKind::Km],
            _ => &[],
        }
    }
}

impl std::fmt::Display for KineticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.acronym())
    }
}

/// The parameters with kinetic meaning; anything else on a reaction is
/// rejected.
pub const KINETIC_PARAMS: &[ParamKind] = &[
    ParamKind::K,
    ParamKind::Krev,
    ParamKind::Kcat,
    ParamKind::Km,
    ParamKind::Ki,
    ParamKind::Ka,
    ParamKind::N,
];

/// Returns `true` if `param` is a kinetic reaction parameter.
#[must_use]
pub fn is_kinetic_param(param: ParamKind) -> bool {
    KINETIC_PARAMS.contains(&param)
}

/// The direction of a regulation overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulationKind {
    Activation,
    Inhibition,
}

impl RegulationKind {
    /// The kinetic types a regulated reaction may take, in trial order.
    #[must_use]
    pub const fn candidates(self) -> &'static [KineticType] {
        match self {
            Self::Activation => &[KineticType::StandardAllostericActivation],
            Self::Inhibition => &[KineticType::StandardAllostericInhibition],
        }
    }
}

/// A regulation overlay attached to a re-wrapped reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Regulation {
    /// Activation or inhibition.
    pub kind: RegulationKind,
    /// The name of the declaration that introduced the overlay (the
    /// wrapped reaction keeps its original name).
    pub declared_as: EcoString,
    /// The regulating molecule.
    pub regulator: MoleculeId,
    /// The overlay's own kinetic parameters.
    pub parameters: BTreeMap<ParamKind, f64>,
}

/// A reaction within a compartment.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    name: EcoString,
    kinetics: KineticType,
    reactants: Vec<MoleculeId>,
    products: Vec<MoleculeId>,
    /// Signed coefficients: negative for reactants, positive for
    /// products.
    stoichiometry: BTreeMap<MoleculeId, i32>,
    parameters: BTreeMap<ParamKind, f64>,
    protein: Option<MoleculeId>,
    regulation: Option<Regulation>,
}

impl Reaction {
    /// Creates an empty reaction with an undetermined kinetic type.
    #[must_use]
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            kinetics: KineticType::Undetermined,
            reactants: Vec::new(),
            products: Vec::new(),
            stoichiometry: BTreeMap::new(),
            parameters: BTreeMap::new(),
            protein: None,
            regulation: None,
        }
    }

    /// The reaction's name.
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    /// The resolved kinetic type, [`KineticType::Undetermined`] until
    /// inference runs.
    #[must_use]
    pub fn kinetics(&self) -> KineticType {
        self.kinetics
    }

    /// The reactant molecules, in equation order.
    #[must_use]
    pub fn reactants(&self) -> &[MoleculeId] {
        &self.reactants
    }

    /// The product molecules, in equation order.
    #[must_use]
    pub fn products(&self) -> &[MoleculeId] {
        &self.products
    }

    /// The signed stoichiometric coefficient of `molecule`, zero when
    /// the molecule takes no part in the reaction.
    #[must_use]
    pub fn stoichiometric_coefficient(&self, molecule: MoleculeId) -> i32 {
        self.stoichiometry.get(&molecule).copied().unwrap_or(0)
    }

    /// Adds a reactant with its (negative) coefficient.
    pub fn add_reactant(&mut self, molecule: MoleculeId, coefficient: i32) {
        self.reactants.push(molecule);
        self.stoichiometry.insert(molecule, coefficient);
    }

    /// Adds a product with its (positive) coefficient.
    pub fn add_product(&mut self, molecule: MoleculeId, coefficient: i32) {
        self.products.push(molecule);
        self.stoichiometry.insert(molecule, coefficient);
    }

    /// Returns `true` if `param` has been supplied.
    #[must_use]
    pub fn has_parameter(&self, param: ParamKind) -> bool {
        self.parameters.contains_key(&param)
    }

    /// The value of `param`, if supplied.
    #[must_use]
    pub fn parameter(&self, param: ParamKind) -> Option<f64> {
        self.parameters.get(&param).copied()
    }

    /// All supplied parameters.
    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<ParamKind, f64> {
        &self.parameters
    }

    /// Supplies a parameter value.
    pub fn add_parameter(&mut self, param: ParamKind, value: f64) {
        self.parameters.insert(param, value);
    }

    /// The bound enzyme, for reactions declared inside a protein block.
    #[must_use]
    pub fn protein(&self) -> Option<MoleculeId> {
        self.protein
    }

    /// Binds the reaction to its enzyme.
    pub fn set_protein(&mut self, molecule: MoleculeId) {
        self.protein = Some(molecule);
    }

    /// The regulation overlay, if the reaction has been re-wrapped.
    #[must_use]
    pub fn regulation(&self) -> Option<&Regulation> {
        self.regulation.as_ref()
    }

    /// Re-wraps this reaction under a regulation overlay. The wrapped
    /// reaction keeps its name, equation, and base parameters; its
    /// kinetic type is re-inferred against the overlay's parameters.
    #[must_use]
    pub fn into_regulated(
        mut self,
        kind: RegulationKind,
        declared_as: impl Into<EcoString>,
        regulator: MoleculeId,
        parameters: BTreeMap<ParamKind, f64>,
    ) -> Self {
        self.kinetics = KineticType::Undetermined;
        self.regulation = Some(Regulation {
            kind,
            declared_as: declared_as.into(),
            regulator,
            parameters,
        });
        self
    }

    /// Whether the supplied parameters satisfy `kinetics` exactly: no
    /// parameter outside the required set, and every required one
    /// present. A regulated reaction is judged on its overlay
    /// parameters. One special case: a plain reaction supplying only
    /// `k` qualifies as standard unregulated, with `krev` implied.
    #[must_use]
    pub fn can_have_type(&self, kinetics: KineticType) -> bool {
        let parameters = self
            .regulation
            .as_ref()
            .map_or(&self.parameters, |r| &r.parameters);
        if self.regulation.is_none()
            && kinetics == KineticType::StandardUnregulated
            && parameters.len() == 1
            && parameters.contains_key(&ParamKind::K)
        {
            return true;
        }
        let required = kinetics.required_params();
        parameters.len() <= required.len()
            && required.iter().all(|param| parameters.contains_key(param))
    }

    /// Assigns the kinetic type. Returns `true` when an implicit
    /// `krev = 0` was inserted for a `k`-only standard unregulated
    /// reaction, so the caller can warn.
    pub fn set_kinetics(&mut self, kinetics: KineticType) -> bool {
        let implied = kinetics == KineticType::StandardUnregulated
            && !self.parameters.contains_key(&ParamKind::Krev);
        if implied {
            self.parameters.insert(ParamKind::Krev, 0.0);
        }
        self.kinetics = kinetics;
        implied
    }

    /// Tries each candidate type in order and assigns the first match.
    /// Returns `Some(implied_krev)` on success, `None` when no
    /// candidate fits.
    pub fn infer_kinetics(&mut self, candidates: &[KineticType]) -> Option<bool> {
        for &candidate in candidates {
            if self.can_have_type(candidate) {
                return Some(self.set_kinetics(candidate));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_parameters_resolve_standard_unregulated() {
        let mut reaction = Reaction::new("decay");
        reaction.add_parameter(ParamKind::K, 0.1);
        reaction.add_parameter(ParamKind::Krev, 0.02);
        assert_eq!(
            reaction.infer_kinetics(&[KineticType::StandardUnregulated]),
            Some(false)
        );
        assert_eq!(reaction.kinetics(), KineticType::StandardUnregulated);
    }

    #[test]
    fn lone_k_implies_zero_krev() {
        let mut reaction = Reaction::new("decay");
        reaction.add_parameter(ParamKind::K, 0.1);
        assert_eq!(
            reaction.infer_kinetics(&[KineticType::StandardUnregulated]),
            Some(true)
        );
        assert_eq!(reaction.parameter(ParamKind::Krev), Some(0.0));
    }

    #[test]
    fn inhibition_parameters_have_no_plain_inference_path() {
        let mut reaction = Reaction::new("blocked");
        reaction.add_parameter(ParamKind::Ki, 2.0);
        reaction.add_parameter(ParamKind::N, 4.0);
        assert_eq!(
            reaction.infer_kinetics(&[KineticType::StandardUnregulated]),
            None
        );
        assert_eq!(reaction.kinetics(), KineticType::Undetermined);
    }

    #[test]
    fn extra_parameter_disqualifies_a_type() {
        let mut reaction = Reaction::new("mm");
        reaction.add_parameter(ParamKind::Kcat, 3.0);
        reaction.add_parameter(ParamKind::Km, 0.5);
        reaction.add_parameter(ParamKind::N, 1.0);
        assert!(!reaction.can_have_type(KineticType::MichaelisMentenUnregulated));
    }

    #[test]
    fn regulated_reaction_is_judged_on_overlay_parameters() {
        let mut reaction = Reaction::new("convert");
        reaction.add_parameter(ParamKind::K, 0.1);
        reaction.add_parameter(ParamKind::Krev, 0.0);
        reaction.set_kinetics(KineticType::StandardUnregulated);

        let overlay = BTreeMap::from([(ParamKind::Ki, 2.0), (ParamKind::N, 4.0)]);
        let mut wrapped = reaction.into_regulated(RegulationKind::Inhibition, "stop", 0, overlay);
        assert_eq!(
            wrapped.infer_kinetics(RegulationKind::Inhibition.candidates()),
            Some(false)
        );
        assert_eq!(
            wrapped.kinetics(),
            KineticType::StandardAllostericInhibition
        );
        // The base parameters survive the wrap.
        assert_eq!(wrapped.parameter(ParamKind::K), Some(0.1));
    }

    #[test]
    fn stoichiometry_defaults_to_zero() {
        let mut reaction = Reaction::new("burn");
        reaction.add_reactant(0, -2);
        reaction.add_product(1, 1);
        assert_eq!(reaction.stoichiometric_coefficient(0), -2);
        assert_eq!(reaction.stoichiometric_coefficient(1), 1);
        assert_eq!(reaction.stoichiometric_coefficient(7), 0);
    }
}
