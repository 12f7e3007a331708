//! Runtime object model.
//!
//! Values form a closed set ([`Object`]) and are always reached through an
//! [`ObjectHolder`], a nullable reference‑counted handle.  An empty holder is
//! Mython's `None`.  Instances are mutated in place through their field
//! table, so every holder aliasing an instance observes the same fields.
//!
//! Reference cycles between instances (`a.x = b`, `b.y = a`) are not
//! collected: the instances stay alive until the process exits.

use std::cell::{OnceCell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Comparator, Statement};
use crate::context::Context;
use crate::environment::Closure;
use crate::error::{MythonError, Result};

pub const INIT_METHOD: &str = "__init__";
pub const ADD_METHOD: &str = "__add__";
pub const EQUAL_METHOD: &str = "__eq__";
pub const LESS_METHOD: &str = "__lt__";
pub const STR_METHOD: &str = "__str__";

/// Name under which a method call binds its receiver.
pub const SELF_NAME: &str = "self";

pub enum Object {
    Number(i64),
    Str(String),
    Bool(bool),
    Class(Rc<Class>),
    Instance(ClassInstance),
}

impl Object {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Object::Number(_) => "Number",
            Object::Str(_) => "String",
            Object::Bool(_) => "Bool",
            Object::Class(_) => "Class",
            Object::Instance(_) => "ClassInstance",
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Number(n) => write!(f, "Number({})", n),
            Object::Str(s) => write!(f, "String({:?})", s),
            Object::Bool(b) => write!(f, "Bool({})", b),
            Object::Class(class) => write!(f, "Class({})", class.name()),
            // Fields may point back at this instance; never recurse into them.
            Object::Instance(instance) => write!(f, "ClassInstance({})", instance.class().name()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Nullable, reference‑counted handle to an [`Object`].
///
/// `own` allocates fresh storage; `share` takes another reference to the
/// storage an existing handle points at.  Cloning a holder is the same as
/// sharing it.
#[derive(Clone, Default)]
pub struct ObjectHolder {
    data: Option<Rc<Object>>,
}

impl ObjectHolder {
    /// The empty handle (`None`).
    pub fn none() -> Self {
        ObjectHolder { data: None }
    }

    pub fn own(object: Object) -> Self {
        ObjectHolder {
            data: Some(Rc::new(object)),
        }
    }

    pub fn share(&self) -> Self {
        self.clone()
    }

    pub fn number(n: i64) -> Self {
        Self::own(Object::Number(n))
    }

    pub fn string<S: Into<String>>(s: S) -> Self {
        Self::own(Object::Str(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Self::own(Object::Bool(b))
    }

    pub fn is_none(&self) -> bool {
        self.data.is_none()
    }

    pub fn is_some(&self) -> bool {
        self.data.is_some()
    }

    pub fn get(&self) -> Option<&Object> {
        self.data.as_deref()
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.get() {
            Some(Object::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.get() {
            Some(Object::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.get() {
            Some(Object::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Rc<Class>> {
        match self.get() {
            Some(Object::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&ClassInstance> {
        match self.get() {
            Some(Object::Instance(instance)) => Some(instance),
            _ => None,
        }
    }

    /// `true` when both handles reach the same storage (or both are `None`).
    pub fn ptr_eq(&self, other: &ObjectHolder) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.get().map_or("None", Object::kind_name)
    }

    /// Truthiness: `None` is false, Bool is its value, Number is non‑zero,
    /// String is non‑empty, classes and instances are false.
    pub fn is_truthy(&self) -> bool {
        match self.get() {
            None => false,
            Some(Object::Bool(b)) => *b,
            Some(Object::Number(n)) => *n != 0,
            Some(Object::Str(s)) => !s.is_empty(),
            Some(Object::Class(_)) | Some(Object::Instance(_)) => false,
        }
    }

    /// Append the textual representation of the handle to `out`.  Instances
    /// defining a zero‑argument `__str__` are rendered through it, which may
    /// run arbitrary user code against `context`.
    pub fn print(&self, out: &mut String, context: &mut dyn Context) -> Result<()> {
        match self.get() {
            None => out.push_str("None"),
            Some(Object::Number(n)) => out.push_str(itoa::Buffer::new().format(*n)),
            Some(Object::Str(s)) => out.push_str(s),
            Some(Object::Bool(true)) => out.push_str("True"),
            Some(Object::Bool(false)) => out.push_str("False"),
            Some(Object::Class(class)) => {
                out.push_str("Class ");
                out.push_str(class.name());
            }
            Some(Object::Instance(instance)) => {
                if instance.has_method(STR_METHOD, 0) {
                    let rendered = self.call(STR_METHOD, Vec::new(), context)?;
                    rendered.print(out, context)?;
                } else {
                    let address = self.data.as_ref().map_or(std::ptr::null(), Rc::as_ptr);
                    out.push_str(&format!(
                        "<{} object at {:p}>",
                        instance.class().name(),
                        address
                    ));
                }
            }
        }

        Ok(())
    }

    /// The textual representation as an owned string.
    pub fn to_text(&self, context: &mut dyn Context) -> Result<String> {
        let mut out = String::new();
        self.print(&mut out, context)?;
        Ok(out)
    }

    /// Invoke `method` on the instance behind this handle.
    ///
    /// The method is looked up by name through the class chain and must take
    /// exactly `args.len()` parameters.  The body runs in a fresh scope that
    /// binds the formals positionally plus `self`, aliasing this handle.
    pub fn call(
        &self,
        method: &str,
        args: Vec<ObjectHolder>,
        context: &mut dyn Context,
    ) -> Result<ObjectHolder> {
        let instance = self.as_instance().ok_or_else(|| {
            MythonError::type_error(format!(
                "cannot call method '{}' on a {} value",
                method,
                self.kind_name()
            ))
        })?;

        let class: Rc<Class> = Rc::clone(instance.class());
        let found = class
            .get_method(method)
            .filter(|m| m.formal_params.len() == args.len());

        let Some(found) = found else {
            debug!("Method '{}' with {} argument(s) missing in {}", method, args.len(), class.name());

            return Err(MythonError::MethodNotFound {
                class: class.name().to_string(),
                method: method.to_string(),
                arity: args.len(),
            });
        };

        let mut scope = Closure::new();
        for (param, arg) in found.formal_params.iter().zip(args) {
            scope.define(param, arg);
        }
        scope.define(SELF_NAME, self.share());

        debug!("Calling {}.{}", class.name(), method);

        let result = found.body.execute(&mut scope, context)?.into_value();

        debug!("{}.{} returned {:?}", class.name(), method, result);

        Ok(result)
    }
}

impl fmt::Debug for ObjectHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            None => f.write_str("None"),
            Some(object) => object.fmt(f),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Method {
    pub name: String,
    pub formal_params: Vec<String>,
    pub body: Statement,
}

impl Method {
    pub fn new<S: Into<String>>(name: S, formal_params: Vec<String>, body: Statement) -> Self {
        Method {
            name: name.into(),
            formal_params,
            body,
        }
    }
}

/// A user‑defined class with single inheritance.
pub struct Class {
    name: String,
    methods: OnceCell<Vec<Method>>,
    parent: Option<Rc<Class>>,
}

impl Class {
    pub fn new<S: Into<String>>(name: S, methods: Vec<Method>, parent: Option<Rc<Class>>) -> Self {
        let name: String = name.into();

        info!("Declaring class {} with {} method(s)", name, methods.len());

        Class {
            name,
            methods: OnceCell::from(methods),
            parent,
        }
    }

    /// A class whose method table is supplied later with
    /// [`Class::define_methods`], so that method bodies can refer back to
    /// the class while it is being built.
    pub fn declare<S: Into<String>>(name: S, parent: Option<Rc<Class>>) -> Self {
        let name: String = name.into();

        info!("Declaring class {}", name);

        Class {
            name,
            methods: OnceCell::new(),
            parent,
        }
    }

    pub fn define_methods(&self, methods: Vec<Method>) -> Result<()> {
        self.methods.set(methods).map_err(|_| {
            MythonError::type_error(format!("methods of class {} are already defined", self.name))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<Class>> {
        self.parent.as_ref()
    }

    /// The class's own methods, without inherited ones.
    pub fn methods(&self) -> &[Method] {
        self.methods.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// First method called `name`, searching this class and then its
    /// ancestors.  Arity is not considered.
    pub fn get_method(&self, name: &str) -> Option<&Method> {
        self.methods()
            .iter()
            .find(|m| m.name == name)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get_method(name)))
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field(
                "methods",
                &self.methods().iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            )
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish()
    }
}

pub struct ClassInstance {
    class: Rc<Class>,
    fields: RefCell<Closure>,
}

impl ClassInstance {
    pub fn new(class: Rc<Class>) -> Self {
        debug!("New instance of {}", class.name());

        ClassInstance {
            class,
            fields: RefCell::new(Closure::new()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// `true` iff a method called `method` is reachable and takes exactly
    /// `argument_count` parameters.
    pub fn has_method(&self, method: &str, argument_count: usize) -> bool {
        self.class
            .get_method(method)
            .is_some_and(|m| m.formal_params.len() == argument_count)
    }

    pub fn fields(&self) -> Ref<'_, Closure> {
        self.fields.borrow()
    }

    pub fn fields_mut(&self) -> RefMut<'_, Closure> {
        self.fields.borrow_mut()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Comparison
// ─────────────────────────────────────────────────────────────────────────────

/// Call a one‑argument comparison dunder on `lhs` and insist on a Bool.
fn compare_by_method(
    method: &str,
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool> {
    let result = lhs.call(method, vec![rhs.share()], context)?;

    result.as_bool().ok_or_else(|| {
        MythonError::type_error(format!(
            "{} must return a Bool, got {}",
            method,
            result.kind_name()
        ))
    })
}

fn incomparable(lhs: &ObjectHolder, rhs: &ObjectHolder) -> MythonError {
    debug!("Cannot compare {:?} with {:?}", lhs, rhs);

    MythonError::CannotCompare(format!("{} with {}", lhs.kind_name(), rhs.kind_name()))
}

pub fn equal(lhs: &ObjectHolder, rhs: &ObjectHolder, context: &mut dyn Context) -> Result<bool> {
    if lhs.is_none() && rhs.is_none() {
        return Ok(true);
    }

    if let Some(instance) = lhs.as_instance() {
        if instance.has_method(EQUAL_METHOD, 1) {
            return compare_by_method(EQUAL_METHOD, lhs, rhs, context);
        }
        return Err(incomparable(lhs, rhs));
    }

    match (lhs.get(), rhs.get()) {
        (Some(Object::Bool(a)), Some(Object::Bool(b))) => Ok(a == b),
        (Some(Object::Number(a)), Some(Object::Number(b))) => Ok(a == b),
        (Some(Object::Str(a)), Some(Object::Str(b))) => Ok(a == b),
        _ => Err(incomparable(lhs, rhs)),
    }
}

pub fn less(lhs: &ObjectHolder, rhs: &ObjectHolder, context: &mut dyn Context) -> Result<bool> {
    if let Some(instance) = lhs.as_instance() {
        if instance.has_method(LESS_METHOD, 1) {
            return compare_by_method(LESS_METHOD, lhs, rhs, context);
        }
        return Err(incomparable(lhs, rhs));
    }

    match (lhs.get(), rhs.get()) {
        (Some(Object::Bool(a)), Some(Object::Bool(b))) => Ok(a < b),
        (Some(Object::Number(a)), Some(Object::Number(b))) => Ok(a < b),
        (Some(Object::Str(a)), Some(Object::Str(b))) => Ok(a < b),
        _ => Err(incomparable(lhs, rhs)),
    }
}

pub fn not_equal(lhs: &ObjectHolder, rhs: &ObjectHolder, context: &mut dyn Context) -> Result<bool> {
    Ok(!equal(lhs, rhs, context)?)
}

pub fn greater(lhs: &ObjectHolder, rhs: &ObjectHolder, context: &mut dyn Context) -> Result<bool> {
    Ok(!less(lhs, rhs, context)? && !equal(lhs, rhs, context)?)
}

pub fn less_or_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool> {
    Ok(!greater(lhs, rhs, context)?)
}

pub fn greater_or_equal(
    lhs: &ObjectHolder,
    rhs: &ObjectHolder,
    context: &mut dyn Context,
) -> Result<bool> {
    Ok(!less(lhs, rhs, context)?)
}

impl Comparator {
    pub fn apply(
        self,
        lhs: &ObjectHolder,
        rhs: &ObjectHolder,
        context: &mut dyn Context,
    ) -> Result<bool> {
        match self {
            Comparator::Equal => equal(lhs, rhs, context),
            Comparator::NotEqual => not_equal(lhs, rhs, context),
            Comparator::Less => less(lhs, rhs, context),
            Comparator::Greater => greater(lhs, rhs, context),
            Comparator::LessOrEqual => less_or_equal(lhs, rhs, context),
            Comparator::GreaterOrEqual => greater_or_equal(lhs, rhs, context),
        }
    }
}
