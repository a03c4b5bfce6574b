//! Environment configuration.

use std::collections::HashMap;

/// Named configuration values resolved from the execution environment.
///
/// On the platform these are application variables; locally and in tests
/// they come from a map. Values are read-only for the life of an invocation.
pub trait Environment {
    /// Raw value for `name`, if set.
    fn var(&self, name: &str) -> Option<String>;

    /// Trimmed value for `name`; blank values count as unset.
    fn value(&self, name: &str) -> Option<String> {
        self.var(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// In-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Remove a variable.
    pub fn without(mut self, name: &str) -> Self {
        self.vars.remove(name);
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}
