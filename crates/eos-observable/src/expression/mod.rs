//! Arithmetic expressions over observables, parameters and kinematic variables.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := primary ('^' unary)?
//! primary := number | '(' sum ')' | function '(' sum ')'
//!          | '<<' observable-name '>>' kinematics?
//!          | '[[' parameter-name ']]'
//!          | '{' variable '}'
//! kinematics := '[' item (',' item)* ']'
//! item       := variable '=>' variable | variable '=' number
//! ```
//!
//! `a=>b` makes the referenced observable read its variable `a` from the
//! caller's variable `b`; `a=1.5` pins `a` to a fixed value.

mod observable;
mod parser;

use std::fmt::{self, Display};

use eos_core::{EosError, ErrorInfo, QualifiedName};

pub use observable::{ExpressionEntry, ExpressionObservable};

/// Binary operators in precedence classes `+ -`, `* /`, `^`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `^`, right associative.
    Power,
}

impl BinaryOperator {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOperator::Add => lhs + rhs,
            BinaryOperator::Subtract => lhs - rhs,
            BinaryOperator::Multiply => lhs * rhs,
            BinaryOperator::Divide => lhs / rhs,
            BinaryOperator::Power => lhs.powf(rhs),
        }
    }

    fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
            BinaryOperator::Power => '^',
        }
    }
}

/// Unary functions callable as `name(argument)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// `exp`
    Exp,
    /// natural `log`
    Log,
    /// `sqrt`
    Sqrt,
    /// `sin`
    Sin,
    /// `cos`
    Cos,
    /// `abs`
    Abs,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "exp" => Function::Exp,
            "log" => Function::Log,
            "sqrt" => Function::Sqrt,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "abs" => Function::Abs,
            _ => return None,
        })
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Function::Exp => x.exp(),
            Function::Log => x.ln(),
            Function::Sqrt => x.sqrt(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Abs => x.abs(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Abs => "abs",
        }
    }
}

/// Kinematic aliases and fixed values attached to an observable reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KinematicsSpecification {
    /// `(variable, source)` pairs: `variable` reads the caller's `source`.
    pub aliases: Vec<(String, String)>,
    /// `(variable, value)` pairs pinned for this reference.
    pub values: Vec<(String, f64)>,
}

impl KinematicsSpecification {
    /// Whether neither aliases nor values are given.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.values.is_empty()
    }

    fn alias_of(&self, variable: &str) -> Option<&str> {
        self.aliases.iter().find(|(v, _)| v == variable).map(|(_, source)| source.as_str())
    }

    fn is_fixed(&self, variable: &str) -> bool {
        self.values.iter().any(|(v, _)| v == variable)
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Numeric literal.
    Constant(f64),
    /// Binary operation.
    Binary {
        /// Operator.
        operator: BinaryOperator,
        /// Left operand.
        lhs: Box<Expression>,
        /// Right operand.
        rhs: Box<Expression>,
    },
    /// Unary minus.
    Negate(Box<Expression>),
    /// Function call.
    Call {
        /// Callee.
        function: Function,
        /// Argument.
        argument: Box<Expression>,
    },
    /// `<<name>>[...]`
    Observable {
        /// Referenced observable, possibly with embedded options.
        name: QualifiedName,
        /// Aliases and fixed values.
        kinematics: KinematicsSpecification,
    },
    /// `[[name]]`
    Parameter(String),
    /// `{name}`
    Kinematic(String),
}

impl Expression {
    /// Parses `input`; malformed input is a syntax error.
    pub fn parse(input: &str) -> Result<Expression, EosError> {
        parser::Parser::new(input).parse()
    }

    /// Visits every node in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        match self {
            Expression::Binary { lhs, rhs, .. } => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            Expression::Negate(inner) | Expression::Call { argument: inner, .. } => inner.walk(visit),
            Expression::Constant(_)
            | Expression::Observable { .. }
            | Expression::Parameter(_)
            | Expression::Kinematic(_) => {}
        }
    }

    /// Evaluates a tree without references; references are an internal error.
    pub fn evaluate_constant(&self) -> Result<f64, EosError> {
        match self {
            Expression::Constant(value) => Ok(*value),
            Expression::Binary { operator, lhs, rhs } => {
                Ok(operator.apply(lhs.evaluate_constant()?, rhs.evaluate_constant()?))
            }
            Expression::Negate(inner) => Ok(-inner.evaluate_constant()?),
            Expression::Call { function, argument } => Ok(function.apply(argument.evaluate_constant()?)),
            other => Err(EosError::Internal(
                ErrorInfo::new("eos_observable.unbound_expression", "expression references unbound values")
                    .with_context("expression", other.to_string()),
            )),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write!(f, "{value}"),
            Expression::Binary { operator, lhs, rhs } => write!(f, "({lhs} {} {rhs})", operator.symbol()),
            Expression::Negate(inner) => write!(f, "-{inner}"),
            Expression::Call { function, argument } => write!(f, "{}({argument})", function.name()),
            Expression::Observable { name, kinematics } => {
                write!(f, "<<{}>>", name.full())?;
                if !kinematics.is_empty() {
                    let items: Vec<String> = kinematics
                        .aliases
                        .iter()
                        .map(|(variable, source)| format!("{variable}=>{source}"))
                        .chain(kinematics.values.iter().map(|(variable, value)| format!("{variable}={value}")))
                        .collect();
                    write!(f, "[{}]", items.join(","))?;
                }
                Ok(())
            }
            Expression::Parameter(name) => write!(f, "[[{name}]]"),
            Expression::Kinematic(name) => write!(f, "{{{name}}}"),
        }
    }
}
