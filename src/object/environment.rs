use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::Object;

pub type MutEnv = Rc<RefCell<Environment>>;

/// One lexical scope. Lookups walk outward through `outer`; writes always
/// land in this scope's own store.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<MutEnv>,
}

impl Environment {
    pub fn new() -> MutEnv {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_enclosed(outer: MutEnv) -> MutEnv {
        Rc::new(RefCell::new(Self {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    pub fn get(&self, key: &str) -> Option<Object> {
        match self.store.get(key) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(key)),
        }
    }

    pub fn set(&mut self, key: &str, value: Object) {
        self.store.insert(key.to_string(), value);
    }
}
