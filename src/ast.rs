//! The closed node set consumed by the evaluator.
//!
//! Every node is a variant of [`Statement`]; evaluation lives in
//! [`crate::interpreter`].  Nodes own their children and every piece of text
//! they need, so a parsed program outlives the token buffer it came from.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::value::Class;

/// A literal constant that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(i64),
    Str(String),
    Bool(bool),
    None,
}

/// The six comparison operators.  All of them reduce to the `Equal` and
/// `Less` primitives in [`crate::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::Less => "<",
            Comparator::Greater => ">",
            Comparator::LessOrEqual => "<=",
            Comparator::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// **Abstract‑Syntax‑Tree node**.  Mython does not separate statements from
/// expressions: every node evaluates to a handle, possibly `None`.
#[derive(Debug)]
pub enum Statement {
    /// A literal constant; each evaluation allocates a fresh value.
    Literal(LiteralValue),

    /// `name` or `a.b.c`, resolved segment by segment.
    VariableValue(Vec<String>),

    /// `name = value`
    Assignment {
        name: String,
        value: Box<Statement>,
    },

    /// `object.field = value`
    FieldAssignment {
        object: Box<Statement>,
        field: String,
        value: Box<Statement>,
    },

    /// `print a, b, …` (possibly with no arguments).
    Print(Vec<Statement>),

    /// `str(x)`
    Stringify(Box<Statement>),

    Add(Box<Statement>, Box<Statement>),
    Sub(Box<Statement>, Box<Statement>),
    Mult(Box<Statement>, Box<Statement>),
    Div(Box<Statement>, Box<Statement>),

    /// Non short‑circuiting boolean operators.
    And(Box<Statement>, Box<Statement>),
    Or(Box<Statement>, Box<Statement>),
    Not(Box<Statement>),

    Comparison {
        comparator: Comparator,
        lhs: Box<Statement>,
        rhs: Box<Statement>,
    },

    /// `ClassName(args…)`.  The class is held weakly: a method body may
    /// instantiate the very class it belongs to.
    NewInstance {
        class: Weak<Class>,
        args: Vec<Statement>,
    },

    /// `object.method(args…)`
    MethodCall {
        object: Box<Statement>,
        method: String,
        args: Vec<Statement>,
    },

    /// Installs a class into the enclosing scope under its own name.
    ClassDefinition(Rc<Class>),

    IfElse {
        condition: Box<Statement>,
        if_body: Box<Statement>,
        else_body: Option<Box<Statement>>,
    },

    /// A sequence of statements sharing one scope.
    Compound(Vec<Statement>),

    Return(Box<Statement>),
}

impl Statement {
    pub fn number(n: i64) -> Self {
        Statement::Literal(LiteralValue::Number(n))
    }

    pub fn string<S: Into<String>>(s: S) -> Self {
        Statement::Literal(LiteralValue::Str(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Statement::Literal(LiteralValue::Bool(b))
    }

    pub fn none() -> Self {
        Statement::Literal(LiteralValue::None)
    }

    /// Single‑segment variable reference.
    pub fn variable<S: Into<String>>(name: S) -> Self {
        Statement::VariableValue(vec![name.into()])
    }

    /// Dotted variable reference, e.g. `["self", "value"]`.
    pub fn dotted<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Statement::VariableValue(path.into_iter().map(Into::into).collect())
    }

    pub fn assign<S: Into<String>>(name: S, value: Statement) -> Self {
        Statement::Assignment {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn field_assign<S: Into<String>>(object: Statement, field: S, value: Statement) -> Self {
        Statement::FieldAssignment {
            object: Box::new(object),
            field: field.into(),
            value: Box::new(value),
        }
    }

    pub fn compare(comparator: Comparator, lhs: Statement, rhs: Statement) -> Self {
        Statement::Comparison {
            comparator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn new_instance(class: &Rc<Class>, args: Vec<Statement>) -> Self {
        Statement::NewInstance {
            class: Rc::downgrade(class),
            args,
        }
    }

    pub fn method_call<S: Into<String>>(object: Statement, method: S, args: Vec<Statement>) -> Self {
        Statement::MethodCall {
            object: Box::new(object),
            method: method.into(),
            args,
        }
    }

    pub fn if_else(condition: Statement, if_body: Statement, else_body: Option<Statement>) -> Self {
        Statement::IfElse {
            condition: Box::new(condition),
            if_body: Box::new(if_body),
            else_body: else_body.map(Box::new),
        }
    }

    pub fn ret(value: Statement) -> Self {
        Statement::Return(Box::new(value))
    }
}
