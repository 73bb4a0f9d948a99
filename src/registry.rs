use std::borrow::Cow;

use crate::{
    error::GameError,
    policy::{DecisionPolicy, Explorer, Idle},
};

pub const BUILTIN: [&str; 5] = ["scout", "bounded", "thorough", "drifter", "idle"];

type Factory = Box<dyn Fn() -> Result<Box<dyn DecisionPolicy>, GameError> + Send + Sync>;

struct Entry {
    name: Cow<'static, str>,
    factory: Factory,
}

/// The mouse implementations taking part in a game, as zero-argument factories.
#[derive(Default)]
pub struct AgentRegistry {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in explorer plus the idle stand-in.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN {
            registry.register_builtin(name);
        }
        registry
    }

    /// Built-in entries by name, in the order given. Repeats put several copies in play.
    pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Self, GameError> {
        let mut registry = Self::new();
        for name in names {
            if !registry.register_builtin(name.as_ref()) {
                return Err(GameError::AgentConstruction {
                    name: name.as_ref().to_string(),
                    reason: format!("no such mouse, expected one of {}", BUILTIN.join(", ")),
                });
            }
        }
        Ok(registry)
    }

    fn register_builtin(&mut self, name: &str) -> bool {
        match name {
            "scout" => self.register_policy("scout", Explorer::scout),
            "bounded" => self.register_policy("bounded", Explorer::bounded),
            "thorough" => self.register_policy("thorough", Explorer::thorough),
            "drifter" => self.register_policy("drifter", Explorer::drifter),
            "idle" => self.register_policy("idle", || Idle),
            _ => return false,
        }
        true
    }

    /// Registers a factory that may fail; a failing entry is skipped when the game loads.
    pub fn register<F>(&mut self, name: impl Into<Cow<'static, str>>, factory: F)
    where
        F: Fn() -> Result<Box<dyn DecisionPolicy>, GameError> + Send + Sync + 'static,
    {
        self.entries.push(Entry {
            name: name.into(),
            factory: Box::new(factory),
        });
    }

    pub fn register_policy<P, F>(&mut self, name: impl Into<Cow<'static, str>>, factory: F)
    where
        P: DecisionPolicy + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.register(name, move || Ok(Box::new(factory()) as Box<dyn DecisionPolicy>));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| &*e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds one policy per entry, in registration order. Failures are returned alongside
    /// the entry name instead of aborting the whole load.
    pub fn instantiate(&self) -> Vec<(&str, Result<Box<dyn DecisionPolicy>, GameError>)> {
        self.entries
            .iter()
            .map(|e| (&*e.name, (e.factory)()))
            .collect()
    }
}
