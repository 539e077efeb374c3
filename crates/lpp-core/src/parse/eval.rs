// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Constant evaluation of arithmetic expression trees.
//!
//! The parser folds arithmetic eagerly: any expression that is not an
//! equation and not a reaction arrow is reduced to a single
//! [`NumberValue`] at parse time. Evaluation is pure; it reads the
//! scope registry but never mutates it.

use crate::ast::{BinaryOp, Node, NumberKind, NumberValue};
use crate::units::{Prefix, Unit};

use super::error::{EvalError, EvalErrorKind};
use super::scope::{ScopeId, ScopeRegistry, SymbolValue};

/// Reduces `node` to a number, resolving identifiers through `scope`.
///
/// # Errors
///
/// Returns an error when the tree contains a non-arithmetic node, an
/// operator with no arithmetic meaning, or an identifier that is
/// undeclared or bound to a non-numeric value.
pub fn evaluate(
    node: &Node,
    registry: &ScopeRegistry,
    scope: ScopeId,
) -> Result<NumberValue, EvalError> {
    match node {
        Node::Number { value, .. } => Ok(value.clone()),
        Node::Identifier { name, span, .. } => match registry.lookup(scope, name) {
            Some(entry) => match &entry.value {
                SymbolValue::Number(n) => Ok(NumberValue::float(*n)),
                SymbolValue::Text(_) => Err(EvalError::new(
                    EvalErrorKind::NonNumericSymbol(name.clone()),
                    *span,
                )),
            },
            None => Err(EvalError::new(
                EvalErrorKind::UndefinedSymbol(name.clone()),
                *span,
            )),
        },
        Node::Binary {
            op,
            left,
            right,
            span,
        } => {
            let left = evaluate(left, registry, scope)?;
            let right = evaluate(right, registry, scope)?;
            apply(*op, &left, &right, *span)
        }
        other => Err(EvalError::new(EvalErrorKind::NotConstant, other.span())),
    }
}

fn apply(
    op: BinaryOp,
    left: &NumberValue,
    right: &NumberValue,
    span: crate::source_analysis::Span,
) -> Result<NumberValue, EvalError> {
    let value = match op {
        BinaryOp::Add => left.value + right.value,
        BinaryOp::Subtract => left.value - right.value,
        BinaryOp::Multiply => left.value * right.value,
        BinaryOp::Divide => left.value / right.value,
        BinaryOp::Power => left.value.powf(right.value),
        // Integer remainder, like the C family's int %.
        BinaryOp::Modulo => {
            if right.value as i64 == 0 {
                return Err(EvalError::new(EvalErrorKind::ModuloByZero, span));
            }
            ((left.value as i64) % (right.value as i64)) as f64
        }
        BinaryOp::LogicalOr => f64::from(left.value != 0.0 || right.value != 0.0),
        BinaryOp::LogicalAnd => f64::from(left.value != 0.0 && right.value != 0.0),
        BinaryOp::Equal => f64::from(left.value == right.value),
        BinaryOp::NotEqual => f64::from(left.value != right.value),
        BinaryOp::GreaterEqual => f64::from(left.value >= right.value),
        BinaryOp::Greater => f64::from(left.value > right.value),
        BinaryOp::LessEqual => f64::from(left.value <= right.value),
        BinaryOp::Less => f64::from(left.value < right.value),
        other => {
            return Err(EvalError::new(
                EvalErrorKind::UnsupportedOperator(other.to_string().into()),
                span,
            ));
        }
    };

    let mut result = NumberValue::float(value);
    if left.same_prefix_unit(right) {
        result.prefix = left.prefix;
        result.unit = left.unit;
    } else {
        // Infer the prefix and unit from whichever side carries them.
        result.prefix = if left.prefix == Prefix::None {
            right.prefix
        } else {
            left.prefix
        };
        result.unit = if left.unit == Unit::None {
            right.unit
        } else {
            left.unit
        };
    }
    debug_assert_eq!(result.kind, NumberKind::Float);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::Span;

    fn num(value: f64) -> Node {
        Node::Number {
            value: NumberValue::float(value),
            span: Span::new(0, 1),
        }
    }

    fn num_with(value: f64, prefix: Prefix, unit: Unit) -> Node {
        Node::Number {
            value: NumberValue::float(value).with_unit(prefix, unit),
            span: Span::new(0, 1),
        }
    }

    fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::new(0, 3),
        }
    }

    fn empty_registry() -> (ScopeRegistry, ScopeId) {
        let mut registry = ScopeRegistry::new();
        let id = registry.open("global");
        (registry, id)
    }

    #[test]
    fn arithmetic_folds_to_float() {
        let (registry, scope) = empty_registry();
        let tree = binary(BinaryOp::Add, num(2.0), num(3.0));
        let result = evaluate(&tree, &registry, scope).unwrap();
        assert_eq!(result.value, 5.0);
        assert_eq!(result.kind, NumberKind::Float);
    }

    #[test]
    fn modulo_truncates_to_integers() {
        let (registry, scope) = empty_registry();
        let tree = binary(BinaryOp::Modulo, num(7.9), num(3.0));
        assert_eq!(evaluate(&tree, &registry, scope).unwrap().value, 1.0);
    }

    #[test]
    fn modulo_by_zero_is_an_error() {
        let (registry, scope) = empty_registry();
        let tree = binary(BinaryOp::Modulo, num(7.0), num(0.0));
        let err = evaluate(&tree, &registry, scope).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::ModuloByZero);
    }

    #[test]
    fn modulo_by_a_fractional_divisor_that_truncates_to_zero_is_an_error() {
        let (registry, scope) = empty_registry();
        let tree = binary(BinaryOp::Modulo, num(7.0), num(0.4));
        let err = evaluate(&tree, &registry, scope).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::ModuloByZero);
    }

    #[test]
    fn power_uses_float_exponent() {
        let (registry, scope) = empty_registry();
        let tree = binary(BinaryOp::Power, num(2.0), num(0.5));
        let result = evaluate(&tree, &registry, scope).unwrap();
        assert!((result.value - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn matching_units_are_kept() {
        let (registry, scope) = empty_registry();
        let tree = binary(
            BinaryOp::Add,
            num_with(1.0, Prefix::Milli, Unit::Molar),
            num_with(2.0, Prefix::Milli, Unit::Molar),
        );
        let result = evaluate(&tree, &registry, scope).unwrap();
        assert_eq!(result.prefix, Prefix::Milli);
        assert_eq!(result.unit, Unit::Molar);
    }

    #[test]
    fn bare_side_inherits_unit_from_the_other() {
        let (registry, scope) = empty_registry();
        let tree = binary(
            BinaryOp::Multiply,
            num(2.0),
            num_with(5.0, Prefix::Micro, Unit::Liter),
        );
        let result = evaluate(&tree, &registry, scope).unwrap();
        assert_eq!(result.value, 10.0);
        assert_eq!(result.prefix, Prefix::Micro);
        assert_eq!(result.unit, Unit::Liter);
    }

    #[test]
    fn left_unit_wins_when_both_differ() {
        let (registry, scope) = empty_registry();
        let tree = binary(
            BinaryOp::Add,
            num_with(1.0, Prefix::None, Unit::Second),
            num_with(1.0, Prefix::None, Unit::Minute),
        );
        let result = evaluate(&tree, &registry, scope).unwrap();
        assert_eq!(result.unit, Unit::Second);
    }

    #[test]
    fn identifiers_resolve_through_scope() {
        let (mut registry, scope) = empty_registry();
        registry.define("volume", "vol", SymbolValue::Number(50.0));
        let tree = binary(
            BinaryOp::Divide,
            Node::Identifier {
                name: "volume".into(),
                primitive: None,
                span: Span::new(0, 6),
            },
            num(2.0),
        );
        assert_eq!(evaluate(&tree, &registry, scope).unwrap().value, 25.0);
    }

    #[test]
    fn undeclared_identifier_is_fatal() {
        let (registry, scope) = empty_registry();
        let tree = Node::Identifier {
            name: "ghost".into(),
            primitive: None,
            span: Span::new(0, 5),
        };
        let err = evaluate(&tree, &registry, scope).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::UndefinedSymbol("ghost".into()));
    }

    #[test]
    fn text_symbol_is_not_numeric() {
        let (mut registry, scope) = empty_registry();
        registry.define("label", "string", SymbolValue::Text("broth".into()));
        let tree = Node::Identifier {
            name: "label".into(),
            primitive: None,
            span: Span::new(0, 5),
        };
        let err = evaluate(&tree, &registry, scope).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::NonNumericSymbol("label".into()));
    }

    #[test]
    fn arrows_are_not_arithmetic() {
        let (registry, scope) = empty_registry();
        let tree = binary(BinaryOp::Forward, num(1.0), num(2.0));
        let err = evaluate(&tree, &registry, scope).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::UnsupportedOperator(_)));
    }
}
