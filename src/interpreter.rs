//! Tree‑walking evaluation of the [`Statement`] node set.
//!
//! Every node evaluates against a flat [`Closure`] and a caller‑supplied
//! [`Context`].  Operands and arguments are always evaluated left to right.
//! The only non‑local transfer of control is `return`, which travels upward
//! as [`Flow::Returning`] until the enclosing method call unwraps it.

use std::io::Write;

use log::{debug, info};

use crate::ast::{LiteralValue, Statement};
use crate::context::Context;
use crate::environment::Closure;
use crate::error::{MythonError, Result};
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::token::Token;
use crate::value::{ClassInstance, Object, ObjectHolder, ADD_METHOD, INIT_METHOD};

/// Outcome of executing one node.
#[derive(Debug, Clone)]
pub enum Flow {
    /// The node completed; the handle is its value.
    Normal(ObjectHolder),

    /// A `return` is unwinding with this value.
    Returning(ObjectHolder),
}

impl Flow {
    pub fn into_value(self) -> ObjectHolder {
        match self {
            Flow::Normal(value) | Flow::Returning(value) => value,
        }
    }

    pub fn is_returning(&self) -> bool {
        matches!(self, Flow::Returning(_))
    }
}

impl Statement {
    /// Evaluate the node and return its value.  A `return` reaching this
    /// point is treated as the node's value.
    pub fn evaluate(&self, closure: &mut Closure, context: &mut dyn Context) -> Result<ObjectHolder> {
        Ok(self.execute(closure, context)?.into_value())
    }

    /// Execute the node, reporting whether a `return` is in flight.
    pub fn execute(&self, closure: &mut Closure, context: &mut dyn Context) -> Result<Flow> {
        let value = match self {
            Statement::Literal(literal) => match literal {
                LiteralValue::Number(n) => ObjectHolder::number(*n),
                LiteralValue::Str(s) => ObjectHolder::string(s.clone()),
                LiteralValue::Bool(b) => ObjectHolder::boolean(*b),
                LiteralValue::None => ObjectHolder::none(),
            },

            Statement::VariableValue(path) => resolve_path(path, closure)?,

            Statement::Assignment { name, value } => {
                let value = value.evaluate(closure, context)?;
                debug!("Assigning {:?} to '{}'", value, name);
                closure.define(name, value.share());
                value
            }

            Statement::FieldAssignment {
                object,
                field,
                value,
            } => {
                let object = object.evaluate(closure, context)?;
                let value = value.evaluate(closure, context)?;
                let instance = object.as_instance().ok_or_else(|| {
                    MythonError::type_error(format!(
                        "cannot assign field '{}' on a {} value",
                        field,
                        object.kind_name()
                    ))
                })?;
                debug!("Assigning {:?} to field '{}'", value, field);
                instance.fields_mut().define(field, value.share());
                value
            }

            Statement::Print(args) => {
                for (i, arg) in args.iter().enumerate() {
                    let value = arg.evaluate(closure, context)?;
                    let text = value.to_text(context)?;
                    let out = context.output();
                    if i > 0 {
                        out.write_all(b" ")?;
                    }
                    out.write_all(text.as_bytes())?;
                }
                context.output().write_all(b"\n")?;
                ObjectHolder::none()
            }

            Statement::Stringify(arg) => {
                let value = arg.evaluate(closure, context)?;
                context.begin_render()?;
                ObjectHolder::string(value.to_text(context)?)
            }

            Statement::Add(lhs, rhs) => {
                let lhs = lhs.evaluate(closure, context)?;
                let rhs = rhs.evaluate(closure, context)?;
                add(lhs, rhs, context)?
            }

            Statement::Sub(lhs, rhs) => {
                let (a, b) = numbers("subtract", lhs, rhs, closure, context)?;
                ObjectHolder::number(a.wrapping_sub(b))
            }

            Statement::Mult(lhs, rhs) => {
                let (a, b) = numbers("multiply", lhs, rhs, closure, context)?;
                ObjectHolder::number(a.wrapping_mul(b))
            }

            Statement::Div(lhs, rhs) => {
                let (a, b) = numbers("divide", lhs, rhs, closure, context)?;
                if b == 0 {
                    debug!("Division of {} by zero", a);
                    return Err(MythonError::DivisionByZero);
                }
                ObjectHolder::number(a.wrapping_div(b))
            }

            Statement::And(lhs, rhs) => {
                let (a, b) = booleans("and", lhs, rhs, closure, context)?;
                ObjectHolder::boolean(a && b)
            }

            Statement::Or(lhs, rhs) => {
                let (a, b) = booleans("or", lhs, rhs, closure, context)?;
                ObjectHolder::boolean(a || b)
            }

            Statement::Not(arg) => {
                let value = arg.evaluate(closure, context)?;
                let b = value.as_bool().ok_or_else(|| {
                    MythonError::operands("negate", format!("a {} value", value.kind_name()))
                })?;
                ObjectHolder::boolean(!b)
            }

            Statement::Comparison {
                comparator,
                lhs,
                rhs,
            } => {
                let lhs = lhs.evaluate(closure, context)?;
                let rhs = rhs.evaluate(closure, context)?;
                ObjectHolder::boolean(comparator.apply(&lhs, &rhs, context)?)
            }

            Statement::NewInstance { class, args } => {
                let class = class.upgrade().ok_or_else(|| {
                    MythonError::type_error("instantiated class is no longer defined")
                })?;

                let instance = ObjectHolder::own(Object::Instance(ClassInstance::new(class)));
                let has_init = instance
                    .as_instance()
                    .is_some_and(|i| i.has_method(INIT_METHOD, args.len()));

                if has_init {
                    let args = evaluate_args(args, closure, context)?;
                    instance.call(INIT_METHOD, args, context)?;
                }

                instance
            }

            Statement::MethodCall {
                object,
                method,
                args,
            } => {
                let receiver = object.evaluate(closure, context)?;
                let instance = receiver.as_instance().ok_or_else(|| {
                    MythonError::type_error(format!(
                        "cannot call method '{}' on a {} value",
                        method,
                        receiver.kind_name()
                    ))
                })?;

                if instance.has_method(method, args.len()) {
                    let args = evaluate_args(args, closure, context)?;
                    receiver.call(method, args, context)?
                } else {
                    debug!(
                        "{} has no method '{}' taking {} argument(s); call ignored",
                        instance.class().name(),
                        method,
                        args.len()
                    );
                    ObjectHolder::none()
                }
            }

            Statement::ClassDefinition(class) => {
                info!("Defining class {}", class.name());
                closure.define(class.name(), ObjectHolder::own(Object::Class(class.clone())));
                ObjectHolder::none()
            }

            Statement::IfElse {
                condition,
                if_body,
                else_body,
            } => {
                let value = condition.evaluate(closure, context)?;
                let taken = value.as_bool().ok_or_else(|| {
                    MythonError::type_error(format!(
                        "condition must be a Bool, got {}",
                        value.kind_name()
                    ))
                })?;

                debug!("Condition is {}", taken);

                return match (taken, else_body) {
                    (true, _) => if_body.execute(closure, context),
                    (false, Some(else_body)) => else_body.execute(closure, context),
                    (false, None) => Ok(Flow::Normal(ObjectHolder::none())),
                };
            }

            Statement::Compound(statements) => {
                for statement in statements {
                    if let flow @ Flow::Returning(_) = statement.execute(closure, context)? {
                        return Ok(flow);
                    }
                }
                ObjectHolder::none()
            }

            Statement::Return(value) => {
                let value = value.evaluate(closure, context)?;
                debug!("Returning {:?}", value);
                return Ok(Flow::Returning(value));
            }
        };

        Ok(Flow::Normal(value))
    }
}

/// Resolve `a.b.c`: the first segment in `closure`, every further segment in
/// the field table of the instance reached so far.
fn resolve_path(path: &[String], closure: &Closure) -> Result<ObjectHolder> {
    let (first, rest) = path
        .split_first()
        .ok_or_else(|| MythonError::UndefinedName(String::new()))?;

    let mut current = closure.lookup(first)?;

    for (i, segment) in rest.iter().enumerate() {
        let next = current
            .as_instance()
            .and_then(|instance| instance.fields().get(segment));

        current = next.ok_or_else(|| {
            debug!("Cannot resolve '{}' in {:?}", segment, current);
            MythonError::UndefinedName(path[..i + 2].join("."))
        })?;
    }

    Ok(current)
}

fn evaluate_args(
    args: &[Statement],
    closure: &mut Closure,
    context: &mut dyn Context,
) -> Result<Vec<ObjectHolder>> {
    args.iter().map(|arg| arg.evaluate(closure, context)).collect()
}

fn add(lhs: ObjectHolder, rhs: ObjectHolder, context: &mut dyn Context) -> Result<ObjectHolder> {
    match (lhs.get(), rhs.get()) {
        (Some(Object::Number(a)), Some(Object::Number(b))) => {
            return Ok(ObjectHolder::number(a.wrapping_add(*b)))
        }
        (Some(Object::Str(a)), Some(Object::Str(b))) => {
            return Ok(ObjectHolder::string(format!("{}{}", a, b)))
        }
        _ => {}
    }

    if lhs.as_instance().is_some_and(|i| i.has_method(ADD_METHOD, 1)) {
        return lhs.call(ADD_METHOD, vec![rhs], context);
    }

    Err(MythonError::operands(
        "add",
        format!("{} and {}", lhs.kind_name(), rhs.kind_name()),
    ))
}

fn numbers(
    op: &'static str,
    lhs: &Statement,
    rhs: &Statement,
    closure: &mut Closure,
    context: &mut dyn Context,
) -> Result<(i64, i64)> {
    let lhs = lhs.evaluate(closure, context)?;
    let rhs = rhs.evaluate(closure, context)?;

    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(MythonError::operands(
            op,
            format!("{} and {}", lhs.kind_name(), rhs.kind_name()),
        )),
    }
}

fn booleans(
    op: &'static str,
    lhs: &Statement,
    rhs: &Statement,
    closure: &mut Closure,
    context: &mut dyn Context,
) -> Result<(bool, bool)> {
    let lhs = lhs.evaluate(closure, context)?;
    let rhs = rhs.evaluate(closure, context)?;

    match (lhs.as_bool(), rhs.as_bool()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(MythonError::operands(
            op,
            format!("{} and {}", lhs.kind_name(), rhs.kind_name()),
        )),
    }
}

/// Owns the global scope of one program run.
pub struct Interpreter {
    globals: Closure,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        Self {
            globals: Closure::new(),
        }
    }

    /// Start from an existing global table.
    pub fn with_globals(globals: Closure) -> Self {
        Self { globals }
    }

    pub fn globals(&self) -> &Closure {
        &self.globals
    }

    /// Executes a program root against the global scope.
    pub fn interpret(
        &mut self,
        program: &Statement,
        context: &mut dyn Context,
    ) -> Result<ObjectHolder> {
        info!("Interpreting program");

        let result = program.execute(&mut self.globals, context)?;

        info!("Interpretation completed successfully");

        Ok(result.into_value())
    }

    /// Lex, parse and run `source`.
    pub fn run_source(&mut self, source: &str, context: &mut dyn Context) -> Result<ObjectHolder> {
        let tokens: Vec<Token<'_>> = Scanner::new(source).collect::<Result<_>>()?;

        debug!("Scanned {} tokens", tokens.len());

        let program = Parser::new(&tokens).parse()?;

        self.interpret(&program, context)
    }
}
