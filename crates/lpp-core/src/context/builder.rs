// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Builds a [`Simulation`] from a parsed program.
//!
//! Top-level statements are dispatched in order: flat `reaction`
//! declarations and `protein` blocks become reactions, assignment
//! statements become molecule counts. A forward or inhibition arrow
//! whose right-hand side names an already-built reaction re-wraps that
//! reaction as a regulation overlay instead of declaring a new one.
//! Statements with no simulation-level meaning (calls, loops, scalar
//! declarations) are skipped; their effects were consumed at parse
//! time.

use std::collections::BTreeMap;

use ecow::EcoString;

use crate::ast::{BinaryOp, Node, ParamKind, Program};
use crate::source_analysis::{Diagnostics, Keyword, Position, Span};

use super::error::{BuildError, BuildErrorKind, IntervalError};
use super::intervals::AddedInterval;
use super::reaction::{is_kinetic_param, KineticType, Reaction, RegulationKind};
use super::simulation::Simulation;

/// A built simulation together with the warnings raised on the way.
#[derive(Debug)]
pub struct Built {
    pub simulation: Simulation,
    pub diagnostics: Diagnostics,
}

/// Builds the simulation graph for `program`.
///
/// # Errors
///
/// Returns the first statement the builder cannot turn into
/// simulation structure.
pub fn build_simulation(name: impl Into<EcoString>, program: &Program) -> Result<Built, BuildError> {
    let mut builder = Builder {
        simulation: Simulation::new(name),
        diagnostics: Diagnostics::new(),
    };
    tracing::debug!(
        statements = program.statements.len(),
        "building simulation"
    );
    for statement in &program.statements {
        builder.build_statement(statement)?;
    }
    Ok(Built {
        simulation: builder.simulation,
        diagnostics: builder.diagnostics,
    })
}

struct Builder {
    simulation: Simulation,
    diagnostics: Diagnostics,
}

impl Builder {
    fn build_statement(&mut self, statement: &Node) -> Result<(), BuildError> {
        match statement {
            Node::Declaration {
                keyword: Keyword::Reaction,
                name,
                body,
                span,
                ..
            } => self.build_reaction(name, body, None, *span),
            Node::Declaration {
                keyword: Keyword::Protein,
                name,
                body,
                span,
                ..
            } => self.build_protein(name, body, *span),
            Node::Declaration { keyword, span, .. } => Err(BuildError::new(
                BuildErrorKind::UnsupportedDeclaration(keyword.as_str().into()),
                *span,
            )),
            Node::Binary {
                op: BinaryOp::Assign,
                left,
                right,
                span,
            } => self.build_molecule_assignment(left, right, *span),
            _ => {
                tracing::debug!("statement has no simulation-level meaning; skipped");
                Ok(())
            }
        }
    }

    fn warn(&mut self, message: String, span: Span) {
        self.diagnostics
            .add_warning(message, span, Position::default());
    }

    // ------------------------------------------------------------------
    // molecule assignments

    fn build_molecule_assignment(
        &mut self,
        left: &Node,
        right: &Node,
        span: Span,
    ) -> Result<(), BuildError> {
        // Scalar declarations were folded into the scope at parse time.
        if let Node::Identifier {
            primitive: Some(_), ..
        } = left
        {
            tracing::debug!("scalar declaration; not a molecule");
            return Ok(());
        }

        let Node::Number { value, .. } = right else {
            return Err(BuildError::new(BuildErrorKind::NotANumber, right.span()));
        };
        let value = value.si_value();

        match left {
            Node::Identifier { name, .. } | Node::Chemical { formula: name, .. } => {
                let compartment = self.simulation.global_mut();
                let id = compartment.intern_molecule(name);
                compartment.molecule_mut(id).set_initial_count(value);
                self.warn(
                    format!(
                        "assignment of molecule {name} implicitly refers to its initial count; \
                         make it explicit with {name}[0], or use {name}[:] to keep it constant"
                    ),
                    span,
                );
                Ok(())
            }
            Node::Index { target, index, .. } => {
                let name = match target.as_ref() {
                    Node::Identifier { name, .. } | Node::Chemical { formula: name, .. } => {
                        name.clone()
                    }
                    _ => {
                        return Err(BuildError::new(
                            BuildErrorKind::UnsupportedAssignment,
                            target.span(),
                        ))
                    }
                };
                self.build_scheduled_count(&name, index, value, span)
            }
            _ => Err(BuildError::new(
                BuildErrorKind::UnsupportedAssignment,
                left.span(),
            )),
        }
    }

    /// `name[t] = value` and `name[a:b] = value`.
    fn build_scheduled_count(
        &mut self,
        name: &EcoString,
        index: &Node,
        value: f64,
        span: Span,
    ) -> Result<(), BuildError> {
        let compartment = self.simulation.global_mut();
        let id = compartment.intern_molecule(name);

        match index {
            Node::Number { value: time, .. } => {
                let time = time.si_value();
                match compartment.molecule_mut(id).add_change_point(time, value) {
                    Ok(None) => {}
                    Ok(Some(shadowed)) => self.warn(
                        format!(
                            "assignment to molecule {name} of count {value} at time {time} \
                             shadows previous assignment of count {shadowed}"
                        ),
                        span,
                    ),
                    Err(IntervalError::NegativeTime(time)) => {
                        return Err(BuildError::new(
                            BuildErrorKind::NegativeTime {
                                molecule: name.clone(),
                                value,
                                time,
                            },
                            span,
                        ))
                    }
                    Err(IntervalError::EndBeforeStart) => {
                        return Err(BuildError::new(BuildErrorKind::UnsupportedAssignment, span))
                    }
                }
                self.simulation.global_mut().has_changed_molecules = true;
                Ok(())
            }
            Node::Range { start, end, .. } => {
                let start = Self::window_bound(start.as_deref(), 0.0)?;
                let end = Self::window_bound(end.as_deref(), f64::INFINITY)?;
                match compartment.molecule_mut(id).add_interval(value, start, end) {
                    Ok(AddedInterval::Baseline { shadowed }) => {
                        compartment.has_constant_molecules = true;
                        if let Some(shadowed) = shadowed {
                            self.warn(
                                format!(
                                    "assignment to molecule {name} of fixed count {value} \
                                     shadows previous assignment of count {shadowed}"
                                ),
                                span,
                            );
                        }
                        Ok(())
                    }
                    Ok(AddedInterval::Scheduled) => {
                        compartment.has_fixed_molecules = true;
                        Ok(())
                    }
                    Err(IntervalError::NegativeTime(time)) => Err(BuildError::new(
                        BuildErrorKind::NegativeTime {
                            molecule: name.clone(),
                            value,
                            time,
                        },
                        span,
                    )),
                    Err(IntervalError::EndBeforeStart) => Err(BuildError::new(
                        BuildErrorKind::EndBeforeStart {
                            molecule: name.clone(),
                            value,
                            start,
                            end,
                        },
                        span,
                    )),
                }
            }
            _ => Err(BuildError::new(
                BuildErrorKind::UnsupportedAssignment,
                index.span(),
            )),
        }
    }

    /// A window bound: omitted bounds take `default`, present bounds
    /// must have folded to numbers.
    fn window_bound(bound: Option<&Node>, default: f64) -> Result<f64, BuildError> {
        match bound {
            None => Ok(default),
            Some(Node::Number { value, .. }) => Ok(value.si_value()),
            Some(other) => Err(BuildError::new(BuildErrorKind::NotANumber, other.span())),
        }
    }

    // ------------------------------------------------------------------
    // reactions

    fn build_protein(
        &mut self,
        name: &EcoString,
        body: &[Node],
        span: Span,
    ) -> Result<(), BuildError> {
        for statement in body {
            let Node::Declaration {
                keyword: Keyword::Reaction,
                name: reaction_name,
                body: reaction_body,
                span: reaction_span,
                ..
            } = statement
            else {
                return Err(BuildError::new(
                    BuildErrorKind::NotAReaction(name.clone()),
                    span,
                ));
            };
            self.build_reaction(reaction_name, reaction_body, Some(name), *reaction_span)?;
        }
        Ok(())
    }

    fn build_reaction(
        &mut self,
        name: &EcoString,
        body: &[Node],
        protein: Option<&EcoString>,
        span: Span,
    ) -> Result<(), BuildError> {
        if body.is_empty() {
            return Err(BuildError::new(
                BuildErrorKind::NoParameters(name.clone()),
                span,
            ));
        }

        let mut reaction = Reaction::new(name.clone());
        let mut has_equation = false;

        for (position, item) in body.iter().enumerate() {
            let (param, value, item_span) = Self::parameter_assignment(name, item)?;

            if param == ParamKind::Equation {
                if has_equation {
                    return Err(BuildError::new(
                        BuildErrorKind::DuplicateEquation(name.clone()),
                        item_span,
                    ));
                }
                has_equation = true;

                let Node::Binary {
                    op,
                    left: lhs,
                    right: rhs,
                    ..
                } = value
                else {
                    return Err(BuildError::new(
                        BuildErrorKind::UnsupportedArrow(name.clone()),
                        value.span(),
                    ));
                };
                match op {
                    BinaryOp::Forward => {
                        if let Some(target) = self.regulated_target(rhs) {
                            return self.build_regulation(
                                name,
                                &reaction,
                                RegulationKind::Activation,
                                lhs,
                                &target,
                                &body[position + 1..],
                                item_span,
                            );
                        }
                        Self::equation_side(&mut self.simulation, &mut reaction, lhs, -1, name)?;
                        Self::equation_side(&mut self.simulation, &mut reaction, rhs, 1, name)?;
                    }
                    BinaryOp::Inhibition => {
                        let Node::Identifier { name: target, .. } = rhs.as_ref() else {
                            return Err(BuildError::new(
                                BuildErrorKind::MalformedEquation(name.clone()),
                                rhs.span(),
                            ));
                        };
                        if !self.simulation.global().has_reaction(target) {
                            return Err(BuildError::new(
                                BuildErrorKind::UnknownReaction(name.clone(), target.clone()),
                                rhs.span(),
                            ));
                        }
                        let target = target.clone();
                        return self.build_regulation(
                            name,
                            &reaction,
                            RegulationKind::Inhibition,
                            lhs,
                            &target,
                            &body[position + 1..],
                            item_span,
                        );
                    }
                    _ => {
                        return Err(BuildError::new(
                            BuildErrorKind::UnsupportedArrow(name.clone()),
                            value.span(),
                        ))
                    }
                }
            } else {
                Self::check_kinetic_param(name, param, reaction.has_parameter(param), item_span)?;
                let Node::Number { value, .. } = value else {
                    return Err(BuildError::new(BuildErrorKind::NotANumber, value.span()));
                };
                reaction.add_parameter(param, value.si_value());
            }
        }

        let candidates: &[KineticType] = if protein.is_some() {
            &[
                KineticType::EnzymaticStandardUnregulated,
                KineticType::MichaelisMentenUnregulated,
            ]
        } else {
            &[KineticType::StandardUnregulated]
        };
        match reaction.infer_kinetics(candidates) {
            Some(true) => self.warn(
                format!("reaction {name} was assumed to have implicit parameter krev = 0"),
                span,
            ),
            Some(false) => {}
            None => {
                return Err(BuildError::new(
                    BuildErrorKind::UndeterminedKinetics(name.clone()),
                    span,
                ))
            }
        }

        let compartment = self.simulation.global_mut();
        if let Some(protein_name) = protein {
            let enzyme = compartment.intern_molecule(protein_name);
            reaction.set_protein(enzyme);
        }
        tracing::debug!(reaction = %name, kinetics = %reaction.kinetics(), "added reaction");
        compartment.add_reaction(reaction);
        Ok(())
    }

    /// Destructures a reaction body item into `(param, value, span)`.
    fn parameter_assignment<'a>(
        name: &EcoString,
        item: &'a Node,
    ) -> Result<(ParamKind, &'a Node, Span), BuildError> {
        let Node::Binary {
            op: BinaryOp::Assign,
            left,
            right,
            span,
        } = item
        else {
            return Err(BuildError::new(
                BuildErrorKind::MalformedParameters(name.clone()),
                item.span(),
            ));
        };
        let Node::Param { param, .. } = left.as_ref() else {
            return Err(BuildError::new(
                BuildErrorKind::MalformedParameters(name.clone()),
                left.span(),
            ));
        };
        Ok((*param, right.as_ref(), *span))
    }

    fn check_kinetic_param(
        name: &EcoString,
        param: ParamKind,
        duplicate: bool,
        span: Span,
    ) -> Result<(), BuildError> {
        if !is_kinetic_param(param) {
            return Err(BuildError::new(
                BuildErrorKind::InvalidParameter(name.clone(), param.as_str().into()),
                span,
            ));
        }
        if duplicate {
            return Err(BuildError::new(
                BuildErrorKind::DuplicateParameter(name.clone(), param.as_str().into()),
                span,
            ));
        }
        Ok(())
    }

    /// A forward arrow describes regulation when its right side is a
    /// lone identifier naming an already-built reaction and its left
    /// side is a single molecule term.
    fn regulated_target(&self, rhs: &Node) -> Option<EcoString> {
        let Node::Identifier { name, .. } = rhs else {
            return None;
        };
        if self.simulation.global().has_reaction(name) {
            Some(name.clone())
        } else {
            None
        }
    }

    /// Re-wraps the reaction named `target` under a regulation overlay
    /// declared by `overlay_name`. Parameters gathered before the
    /// equation, plus everything after it, become the overlay's own
    /// parameter map.
    #[allow(clippy::too_many_arguments)]
    fn build_regulation(
        &mut self,
        overlay_name: &EcoString,
        in_progress: &Reaction,
        kind: RegulationKind,
        regulator: &Node,
        target: &EcoString,
        rest: &[Node],
        span: Span,
    ) -> Result<(), BuildError> {
        let regulator_name = match regulator {
            Node::Identifier { name, .. } | Node::Chemical { formula: name, .. } => name.clone(),
            _ => {
                return Err(BuildError::new(
                    BuildErrorKind::MalformedEquation(overlay_name.clone()),
                    regulator.span(),
                ))
            }
        };

        let mut parameters: BTreeMap<ParamKind, f64> = in_progress.parameters().clone();
        for item in rest {
            let (param, value, item_span) = Self::parameter_assignment(overlay_name, item)?;
            if param == ParamKind::Equation {
                return Err(BuildError::new(
                    BuildErrorKind::DuplicateEquation(overlay_name.clone()),
                    item_span,
                ));
            }
            Self::check_kinetic_param(
                overlay_name,
                param,
                parameters.contains_key(&param),
                item_span,
            )?;
            let Node::Number { value, .. } = value else {
                return Err(BuildError::new(BuildErrorKind::NotANumber, value.span()));
            };
            parameters.insert(param, value.si_value());
        }

        let compartment = self.simulation.global_mut();
        let Some(old) = compartment.remove_reaction(target) else {
            return Err(BuildError::new(
                BuildErrorKind::UnknownReaction(overlay_name.clone(), target.clone()),
                span,
            ));
        };
        if old.kinetics() != KineticType::StandardUnregulated {
            return Err(BuildError::new(
                BuildErrorKind::NotRegulatable(target.clone()),
                span,
            ));
        }

        let regulator = compartment.intern_molecule(&regulator_name);
        let mut wrapped = old.into_regulated(kind, overlay_name.clone(), regulator, parameters);
        if wrapped.infer_kinetics(kind.candidates()).is_none() {
            return Err(BuildError::new(
                BuildErrorKind::UndeterminedKinetics(overlay_name.clone()),
                span,
            ));
        }
        tracing::debug!(
            overlay = %overlay_name,
            reaction = %target,
            kinetics = %wrapped.kinetics(),
            "reaction re-wrapped under a regulation overlay"
        );
        compartment.add_reaction(wrapped);
        Ok(())
    }

    /// Walks one side of a reaction equation: `+`-joined terms, each a
    /// molecule or `coefficient * molecule`. `sign` is -1 for
    /// reactants, +1 for products.
    fn equation_side(
        simulation: &mut Simulation,
        reaction: &mut Reaction,
        node: &Node,
        sign: i32,
        name: &EcoString,
    ) -> Result<(), BuildError> {
        match node {
            Node::Identifier { name: term, .. } | Node::Chemical { formula: term, .. } => {
                let id = simulation.global_mut().intern_molecule(term);
                if sign < 0 {
                    reaction.add_reactant(id, -1);
                } else {
                    reaction.add_product(id, 1);
                }
                Ok(())
            }
            Node::Binary {
                op: BinaryOp::Add,
                left,
                right,
                ..
            } => {
                Self::equation_side(simulation, reaction, left, sign, name)?;
                Self::equation_side(simulation, reaction, right, sign, name)
            }
            Node::Binary {
                op: BinaryOp::Multiply,
                left,
                right,
                ..
            } => {
                let Node::Number { value, .. } = left.as_ref() else {
                    return Err(BuildError::new(
                        BuildErrorKind::MalformedEquation(name.clone()),
                        left.span(),
                    ));
                };
                let term = match right.as_ref() {
                    Node::Identifier { name: term, .. }
                    | Node::Chemical { formula: term, .. } => term,
                    _ => {
                        return Err(BuildError::new(
                            BuildErrorKind::MalformedEquation(name.clone()),
                            right.span(),
                        ))
                    }
                };
                #[allow(clippy::cast_possible_truncation)]
                let coefficient = value.value.round() as i32 * sign;
                let id = simulation.global_mut().intern_molecule(term);
                if sign < 0 {
                    reaction.add_reactant(id, coefficient);
                } else {
                    reaction.add_product(id, coefficient);
                }
                Ok(())
            }
            _ => Err(BuildError::new(
                BuildErrorKind::MalformedEquation(name.clone()),
                node.span(),
            )),
        }
    }
}
