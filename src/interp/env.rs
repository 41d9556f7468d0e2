//! Lexical scopes
//!
//! Each scope owns its bindings and shares its parent. Function values hold a
//! reference to the scope they were declared in, which keeps it alive for as
//! long as the function is reachable.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::value::Value;

/// Shared handle to a scope
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    store: FxHashMap<String, Value>,
    outer: Option<EnvRef>,
}

impl Environment {
    /// A top-level scope with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// A child scope of `outer`
    pub fn new_enclosed(outer: EnvRef) -> Self {
        Self {
            store: FxHashMap::default(),
            outer: Some(outer),
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Look `name` up here, then in each enclosing scope
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref()?.borrow().get(name),
        }
    }

    /// Bind `name` in this scope, shadowing any outer binding
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }

    /// Rebind `name` in the innermost scope that already has it, or bind it
    /// here if no scope does
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.store.get_mut(name) {
            *slot = value;
            return;
        }

        let mut scope = self.outer.clone();
        while let Some(env) = scope {
            let mut env = env.borrow_mut();
            if let Some(slot) = env.store.get_mut(name) {
                *slot = value;
                return;
            }
            scope = env.outer.clone();
        }

        self.store.insert(name.to_string(), value);
    }

    /// Whether this scope itself binds `name`
    pub fn contains_local(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_walks_outward() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("x", Value::Integer(1));
        let inner = Environment::new_enclosed(Rc::clone(&global));
        assert_eq!(inner.get("x"), Some(Value::Integer(1)));
        assert_eq!(inner.get("y"), None);
    }

    #[test]
    fn test_define_shadows() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("x", Value::Integer(1));
        let mut inner = Environment::new_enclosed(Rc::clone(&global));
        inner.define("x", Value::Integer(2));
        assert_eq!(inner.get("x"), Some(Value::Integer(2)));
        assert_eq!(global.borrow().get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn test_set_rebinds_in_owning_scope() {
        let global = Environment::new().into_ref();
        global.borrow_mut().define("count", Value::Integer(0));
        let middle = Environment::new_enclosed(Rc::clone(&global)).into_ref();
        let mut inner = Environment::new_enclosed(Rc::clone(&middle));

        inner.set("count", Value::Integer(3));

        assert!(!inner.contains_local("count"));
        assert!(!middle.borrow().contains_local("count"));
        assert_eq!(global.borrow().get("count"), Some(Value::Integer(3)));
    }

    #[test]
    fn test_set_creates_locally_when_unbound() {
        let global = Environment::new().into_ref();
        let mut inner = Environment::new_enclosed(Rc::clone(&global));
        inner.set("fresh", Value::Integer(9));
        assert!(inner.contains_local("fresh"));
        assert_eq!(global.borrow().get("fresh"), None);
    }
}
