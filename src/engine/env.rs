use crate::engine::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

pub struct Environment {
    bindings: HashMap<String, Rc<Object>>,
    outer: Option<Rc<RefCell<Environment>>>,
}

// Bindings may hold closures that point back at this environment, so only the
// names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

impl Environment {
    /// Creates a new, empty root environment.
    pub fn new() -> Rc<RefCell<Self>> {
        debug!("Creating new empty root environment");
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: None,
        }))
    }

    /// Creates a new environment that is enclosed by an outer environment.
    pub fn new_enclosed(outer_env: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        trace!("Creating new enclosed environment");
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: Some(outer_env),
        }))
    }

    /// Defines a new variable or redefines an existing one in the current environment.
    pub fn define(&mut self, name: String, value: Rc<Object>) {
        trace!(name = %name, value = %value, "Defining variable in current environment");
        self.bindings.insert(name, value);
    }

    /// Attempts to retrieve a variable's value from the environment.
    /// If not found in the current environment, it searches in outer environments.
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        if let Some(value) = self.bindings.get(name) {
            trace!(name = %name, "Found variable in current environment");
            return Some(Rc::clone(value));
        }
        match &self.outer {
            Some(outer_env) => outer_env.borrow().get(name),
            None => {
                debug!(name = %name, "Variable not found in any environment");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    fn int(value: i64) -> Rc<Object> {
        Rc::new(Object::Integer(value))
    }

    fn get_int(env: &Rc<RefCell<Environment>>, name: &str) -> Option<i64> {
        match env.borrow().get(name).as_deref() {
            Some(Object::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    #[test]
    fn define_and_get_in_root_env() {
        init_test_logging();
        let env = Environment::new();
        env.borrow_mut().define("x".to_string(), int(10));
        assert_eq!(get_int(&env, "x"), Some(10));
    }

    #[test]
    fn get_from_outer_env() {
        init_test_logging();
        let outer_env = Environment::new();
        outer_env.borrow_mut().define("x".to_string(), int(10));

        let inner_env = Environment::new_enclosed(Rc::clone(&outer_env));
        assert_eq!(get_int(&inner_env, "x"), Some(10));
    }

    #[test]
    fn define_in_inner_shadows_outer() {
        init_test_logging();
        let outer_env = Environment::new();
        outer_env.borrow_mut().define("x".to_string(), int(10));

        let inner_env = Environment::new_enclosed(Rc::clone(&outer_env));
        inner_env.borrow_mut().define("x".to_string(), int(20)); // Shadow

        assert_eq!(get_int(&inner_env, "x"), Some(20));
        // Ensure outer environment is not affected
        assert_eq!(get_int(&outer_env, "x"), Some(10));
    }

    #[test]
    fn get_undefined_variable() {
        init_test_logging();
        let env = Environment::new();
        assert!(env.borrow().get("non_existent").is_none());
    }

    #[test]
    fn outer_sees_later_definitions() {
        init_test_logging();
        let outer_env = Environment::new();
        let inner_env = Environment::new_enclosed(Rc::clone(&outer_env));
        assert!(inner_env.borrow().get("late").is_none());

        outer_env.borrow_mut().define("late".to_string(), int(1));
        assert_eq!(get_int(&inner_env, "late"), Some(1));
    }

    #[test]
    fn redefine_variable_in_same_env() {
        init_test_logging();
        let env = Environment::new();
        env.borrow_mut().define("x".to_string(), int(10));
        env.borrow_mut().define("x".to_string(), int(20)); // Redefine
        assert_eq!(get_int(&env, "x"), Some(20));
    }

    #[test]
    fn debug_lists_binding_names() {
        init_test_logging();
        let env = Environment::new();
        env.borrow_mut().define("b".to_string(), int(2));
        env.borrow_mut().define("a".to_string(), int(1));
        let rendered = format!("{:?}", env.borrow());
        assert!(rendered.contains("[\"a\", \"b\"]"), "{}", rendered);
    }
}
