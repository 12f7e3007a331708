use crate::error::{MythonError, Result};
use crate::value::ObjectHolder;
use std::collections::HashMap;

/// One flat variable scope: the global table, a method call's locals, or an
/// instance's fields.  There is no enclosing scope; a name is either here or
/// undefined.
#[derive(Debug, Clone, Default)]
pub struct Closure {
    values: HashMap<String, ObjectHolder>,
}

impl Closure {
    pub fn new() -> Self {
        Closure {
            values: HashMap::new(),
        }
    }

    /// Create or overwrite `name`.
    pub fn define(&mut self, name: &str, value: ObjectHolder) {
        self.values.insert(name.to_string(), value);
    }

    /// Another handle to the value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<ObjectHolder> {
        self.values.get(name).cloned()
    }

    pub fn lookup(&self, name: &str) -> Result<ObjectHolder> {
        self.get(name)
            .ok_or_else(|| MythonError::UndefinedName(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bound names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
