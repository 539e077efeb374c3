// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract syntax tree for L++.
//!
//! The tree is a closed sum type: each [`Node`] variant carries exactly
//! the children its shape needs (leaf, unary, binary, or block forms)
//! plus a [`Span`]. Sibling statements within a block are an ordered
//! `Vec<Node>`. The parser folds constant arithmetic while building the
//! tree, so numeric subtrees usually arrive as a single
//! [`Node::Number`] carrying a [`NumberValue`] with its metric prefix
//! and unit.

use ecow::EcoString;

use crate::source_analysis::{Function, Keyword, LoopKind, Param, Primitive, Span};
use crate::units::{Prefix, Unit};

/// Whether a number was written as an integer or a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Float,
}

/// A numeric value with its metric prefix and unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberValue {
    pub value: f64,
    pub kind: NumberKind,
    pub prefix: Prefix,
    pub unit: Unit,
}

impl NumberValue {
    /// A bare integer value.
    #[must_use]
    pub fn integer(value: f64) -> Self {
        Self {
            value,
            kind: NumberKind::Integer,
            prefix: Prefix::None,
            unit: Unit::None,
        }
    }

    /// A bare float value.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self {
            value,
            kind: NumberKind::Float,
            prefix: Prefix::None,
            unit: Unit::None,
        }
    }

    /// Attaches a prefix and unit.
    #[must_use]
    pub fn with_unit(mut self, prefix: Prefix, unit: Unit) -> Self {
        self.prefix = prefix;
        self.unit = unit;
        self
    }

    /// The value scaled by its metric prefix.
    #[must_use]
    pub fn si_value(&self) -> f64 {
        self.value * self.prefix.scale()
    }

    /// Returns `true` if prefix and unit match `other`'s.
    #[must_use]
    pub fn same_prefix_unit(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.unit == other.unit
    }
}

/// Parameter kinds as they appear in the tree.
///
/// This is a superset of the reserved parameter words: `Mass` and
/// `Mols` only arise through unit-based inference of bare literals in
/// `container`/`reagent` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKind {
    Container,
    Time,
    Mass,
    Speed,
    Volume,
    Temp,
    Formula,
    Voltage,
    Config,
    Equation,
    Mols,
    Krev,
    Kcat,
    Km,
    K,
    Ki,
    N,
    Ka,
}

impl From<Param> for ParamKind {
    fn from(param: Param) -> Self {
        match param {
            Param::Ctr => Self::Container,
            Param::Time => Self::Time,
            Param::Spd => Self::Speed,
            Param::Vol => Self::Volume,
            Param::Temp => Self::Temp,
            Param::Form => Self::Formula,
            Param::Voltage => Self::Voltage,
            Param::Config => Self::Config,
            Param::Eq => Self::Equation,
            Param::Krev => Self::Krev,
            Param::Kcat => Self::Kcat,
            Param::Km => Self::Km,
            Param::K => Self::K,
            Param::Ki => Self::Ki,
            Param::N => Self::N,
            Param::Ka => Self::Ka,
        }
    }
}

impl ParamKind {
    /// The parameter's source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Container => "ctr",
            Self::Time => "time",
            Self::Mass => "mass",
            Self::Speed => "spd",
            Self::Volume => "vol",
            Self::Temp => "temp",
            Self::Formula => "form",
            Self::Voltage => "voltage",
            Self::Config => "config",
            Self::Equation => "eq",
            Self::Mols => "mols",
            Self::Krev => "krev",
            Self::Kcat => "kcat",
            Self::Km => "KM",
            Self::K => "k",
            Self::Ki => "Ki",
            Self::N => "n",
            Self::Ka => "Ka",
        }
    }

    /// Infers the parameter a bare unit-bearing literal stands for, per
    /// the unit last seen: `500 mL;` inside a `reagent` block is a
    /// volume.
    #[must_use]
    pub fn from_unit(unit: Unit) -> Option<Self> {
        match unit {
            Unit::Liter => Some(Self::Volume),
            Unit::Second | Unit::Minute | Unit::Hour => Some(Self::Time),
            Unit::Gram => Some(Self::Mass),
            Unit::Celsius | Unit::Fahrenheit | Unit::Kelvin => Some(Self::Temp),
            Unit::Volt | Unit::Ampere => Some(Self::Voltage),
            Unit::Mole | Unit::Molar => Some(Self::Mols),
            Unit::Rpm | Unit::Gforce => Some(Self::Speed),
            Unit::Meter | Unit::Candela | Unit::None => None,
        }
    }
}

/// Binary operators, including the reaction arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitAnd,
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
    LessEqual,
    Less,
    /// `-->`
    Forward,
    /// `<--`
    Backward,
    /// `<->`
    Reversible,
    /// `--|`
    Inhibition,
}

impl BinaryOp {
    /// Returns `true` for the reaction arrows.
    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(
            self,
            Self::Forward | Self::Backward | Self::Reversible | Self::Inhibition
        )
    }

    /// Returns `true` for operators the constant evaluator supports.
    #[must_use]
    pub const fn is_evaluable(self) -> bool {
        !matches!(self, Self::Assign) && !self.is_arrow()
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Assign => "=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "^",
            Self::LogicalOr => "||",
            Self::LogicalAnd => "&&",
            Self::BitOr => "|",
            Self::BitAnd => "&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterEqual => ">=",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::Less => "<",
            Self::Forward => "-->",
            Self::Backward => "<--",
            Self::Reversible => "<->",
            Self::Inhibition => "--|",
        };
        write!(f, "{text}")
    }
}

/// An AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A (possibly folded) numeric literal.
    Number { value: NumberValue, span: Span },

    /// A string literal.
    Text { value: EcoString, span: Span },

    /// A reference to a declared name.
    Identifier {
        name: EcoString,
        primitive: Option<Primitive>,
        span: Span,
    },

    /// A chemical reference carrying its canonical formula.
    Chemical { formula: EcoString, span: Span },

    /// A parameter name, the left side of a parameter assignment.
    Param { param: ParamKind, span: Span },

    /// An unresolved import statement (only present when parsing a
    /// stream that skipped the linker).
    Import { name: EcoString, span: Span },

    /// `return <expr>;`
    Return { value: Box<Node>, span: Span },

    /// A built-in function call, possibly with a receiver:
    /// `broth.mix(30 s)`.
    Call {
        receiver: Option<EcoString>,
        function: Function,
        arguments: Vec<Node>,
        span: Span,
    },

    /// An operator application, including assignments and arrows.
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },

    /// A slice `[start:end]`; either bound may be omitted.
    Range {
        start: Option<Box<Node>>,
        end: Option<Box<Node>>,
        span: Span,
    },

    /// An index expression `name[...]`.
    Index {
        target: Box<Node>,
        index: Box<Node>,
        span: Span,
    },

    /// A `for`/`while` loop. `for` carries its init assignment and
    /// increment; `while` only a condition and body.
    Looping {
        kind: LoopKind,
        init: Option<Box<Node>>,
        condition: Box<Node>,
        increment: Option<Box<Node>>,
        body: Vec<Node>,
        span: Span,
    },

    /// `if` with an optional `else` branch (empty when absent).
    If {
        condition: Box<Node>,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
        span: Span,
    },

    /// A keyword-led declaration block: `reagent broth { ... }` or the
    /// flat form `reaction r1(...);`.
    Declaration {
        keyword: Keyword,
        name: EcoString,
        body: Vec<Node>,
        flat: bool,
        span: Span,
    },
}

impl Node {
    /// Returns the source span of this node.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Number { span, .. }
            | Self::Text { span, .. }
            | Self::Identifier { span, .. }
            | Self::Chemical { span, .. }
            | Self::Param { span, .. }
            | Self::Import { span, .. }
            | Self::Return { span, .. }
            | Self::Call { span, .. }
            | Self::Binary { span, .. }
            | Self::Range { span, .. }
            | Self::Index { span, .. }
            | Self::Looping { span, .. }
            | Self::If { span, .. }
            | Self::Declaration { span, .. } => *span,
        }
    }

    /// Enumerates the node's direct children, in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::Number { .. }
            | Self::Text { .. }
            | Self::Identifier { .. }
            | Self::Chemical { .. }
            | Self::Param { .. }
            | Self::Import { .. } => Vec::new(),
            Self::Return { value, .. } => vec![value],
            Self::Call { arguments, .. } => arguments.iter().collect(),
            Self::Binary { left, right, .. } => vec![left, right],
            Self::Range { start, end, .. } => {
                start.iter().chain(end.iter()).map(Box::as_ref).collect()
            }
            Self::Index { target, index, .. } => vec![target, index],
            Self::Looping {
                init,
                condition,
                increment,
                body,
                ..
            } => init
                .iter()
                .map(Box::as_ref)
                .chain(std::iter::once(condition.as_ref()))
                .chain(body.iter())
                .chain(increment.iter().map(Box::as_ref))
                .collect(),
            Self::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => std::iter::once(condition.as_ref())
                .chain(then_branch.iter())
                .chain(else_branch.iter())
                .collect(),
            Self::Declaration { body, .. } => body.iter().collect(),
        }
    }

    /// Returns `true` if any node in this subtree is a chemical or a
    /// reaction arrow — the shapes that mark an expression as a
    /// reaction equation.
    #[must_use]
    pub fn is_equation_shaped(&self) -> bool {
        match self {
            Self::Chemical { .. } => true,
            Self::Binary { op, left, right, .. } => {
                op.is_arrow() || left.is_equation_shaped() || right.is_equation_shaped()
            }
            _ => self.children().iter().any(|c| c.is_equation_shaped()),
        }
    }
}

/// A parsed compilation unit: the chain of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Node>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: f64) -> Node {
        Node::Number {
            value: NumberValue::integer(value),
            span: Span::new(0, 1),
        }
    }

    #[test]
    fn si_value_applies_prefix() {
        let v = NumberValue::integer(500.0).with_unit(Prefix::Milli, Unit::Liter);
        assert!((v.si_value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unit_param_inference() {
        assert_eq!(ParamKind::from_unit(Unit::Liter), Some(ParamKind::Volume));
        assert_eq!(ParamKind::from_unit(Unit::Minute), Some(ParamKind::Time));
        assert_eq!(ParamKind::from_unit(Unit::Mole), Some(ParamKind::Mols));
        assert_eq!(ParamKind::from_unit(Unit::Rpm), Some(ParamKind::Speed));
        assert_eq!(ParamKind::from_unit(Unit::Meter), None);
    }

    #[test]
    fn children_enumeration() {
        let node = Node::Binary {
            op: BinaryOp::Add,
            left: Box::new(num(1.0)),
            right: Box::new(num(2.0)),
            span: Span::new(0, 5),
        };
        assert_eq!(node.children().len(), 2);
        assert!(num(1.0).children().is_empty());
    }

    #[test]
    fn equation_shape_detection() {
        let chem = Node::Chemical {
            formula: "H2O".into(),
            span: Span::new(0, 3),
        };
        let arrow = Node::Binary {
            op: BinaryOp::Forward,
            left: Box::new(chem.clone()),
            right: Box::new(num(2.0)),
            span: Span::new(0, 8),
        };
        assert!(chem.is_equation_shaped());
        assert!(arrow.is_equation_shaped());
        assert!(!num(1.0).is_equation_shaped());
    }
}
