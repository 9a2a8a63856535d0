//! Lexical environments

use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::eval::object::Value;

/// Environments are shared: a closure keeps its defining environment alive,
/// and several closures may capture the same one.
pub type SharedEnv = Rc<RefCell<Environment>>;

/// One scope of name bindings, chained to the enclosing scope.
///
/// Lookup walks the chain outward; definition always writes the innermost
/// scope, shadowing any outer binding of the same name.
#[derive(Debug, Default)]
pub struct Environment {
    store: FxHashMap<String, Value>,
    outer: Option<SharedEnv>,
}

impl Environment {
    pub fn shared() -> SharedEnv {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn enclosed(outer: &SharedEnv) -> SharedEnv {
        Rc::new(RefCell::new(Self {
            store: FxHashMap::default(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            Some(value.clone())
        } else {
            self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_and_falls_through() {
        let outer = Environment::shared();
        outer.borrow_mut().set("a", Value::Int(1));
        outer.borrow_mut().set("b", Value::Int(2));

        let inner = Environment::enclosed(&outer);
        inner.borrow_mut().set("a", Value::Int(10));

        assert_eq!(inner.borrow().get("a"), Some(Value::Int(10)));
        assert_eq!(inner.borrow().get("b"), Some(Value::Int(2)));
        assert_eq!(inner.borrow().get("c"), None);

        // writes never leak outward
        assert_eq!(outer.borrow().get("a"), Some(Value::Int(1)));
    }
}
