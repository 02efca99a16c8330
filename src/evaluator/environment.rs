//! Lexical scopes.
//!
//! A function call gets a new [`Environment`] enclosed by the function's
//! defining scope. Lookups walk outward; `let` always binds in the innermost
//! scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// Shared handle to an environment. Closures keep their defining environment
/// alive through it.
pub type Env = Rc<RefCell<Environment>>;

/// Variable bindings of one scope, with an optional enclosing scope
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    /// A fresh top-level environment, already behind a shared handle
    pub fn new_global() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A child scope whose lookups fall back to `outer`
    pub fn enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Resolve a name, walking outward through enclosing scopes
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Bind a name in this scope; outer scopes are never written
    pub fn set(&mut self, name: impl Into<String>, value: Object) {
        self.store.insert(name.into(), value);
    }

    /// Get all bindings visible from this scope.
    /// Returns (name, value) pairs sorted by name; inner bindings shadow outer ones.
    pub fn bindings(&self) -> Vec<(String, Object)> {
        let mut bindings: HashMap<String, Object> = match &self.outer {
            Some(outer) => outer.borrow().bindings().into_iter().collect(),
            None => HashMap::new(),
        };

        for (name, value) in &self.store {
            bindings.insert(name.clone(), value.clone());
        }

        let mut result: Vec<_> = bindings.into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}
