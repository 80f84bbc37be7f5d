//! Registration table from action key to action factory.

use std::collections::BTreeMap;
use std::fmt;

use crate::action::{builtin, HookAction};

/// Builds a fresh action instance for one dispatch entry.
pub type ActionFactory = Box<dyn Fn() -> Box<dyn HookAction>>;

/// Maps the `Key` half of `"Key::method"` references to action factories.
///
/// Packages register here before dispatch; the dispatcher never looks an
/// action up by any other means.
#[derive(Default)]
pub struct ActionCatalog {
    factories: BTreeMap<String, ActionFactory>,
}

impl ActionCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding the actions shipped with the binary.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        builtin::register_builtins(&mut catalog);
        catalog
    }

    /// Register `factory` under `key`, replacing any earlier registration.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn HookAction> + 'static,
    {
        let key = key.into();
        if self.factories.insert(key.clone(), Box::new(factory)).is_some() {
            tracing::debug!(key = %key, "action factory replaced");
        }
    }

    pub fn resolve(&self, key: &str) -> Option<&ActionFactory> {
        self.factories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for ActionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCatalog")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
