use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::Engine;
use super::minipy::{MINIPY_NAMES, MiniPy};

/// Resolves interpreter names to engines.
///
/// Names are matched exactly and case-sensitively. One engine may be
/// registered under several names.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn Engine>>,
}

impl EngineRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in engines.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(MINIPY_NAMES, Arc::new(MiniPy));
        registry
    }

    /// Registers `engine` under every name in `names`, replacing any engine
    /// previously registered under the same name.
    pub fn register<I, S>(&mut self, names: I, engine: Arc<dyn Engine>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            debug!("Registering engine as '{}'", name);
            self.engines.insert(name, Arc::clone(&engine));
        }
    }

    /// Removes the engine registered under `name`. Other aliases of the same
    /// engine stay registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.engines.remove(name).is_some()
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Engine>> {
        self.engines.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.engines.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("names", &self.names())
            .finish()
    }
}
