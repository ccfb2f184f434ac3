//! Command registry and name resolution.
//!
//! The registry is an insertion-ordered mapping from command name to
//! factory, built once at startup. Names may contain spaces
//! (`"stash list"`); [`CommandRegistry::resolve`] matches the longest
//! registered name that is a prefix of the input tokens and hands back
//! the tokens left over for the command's own parser.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::command::{Command, CommandFactory};

/// Resolution failure: no registered name matches the input.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered command name is a prefix of the given tokens.
    #[error("unknown command: {0:?}")]
    CommandNotFound(String),
}

/// A successful lookup: the factory, the name that matched, and the
/// tokens remaining for the command's own parser.
pub struct Resolution {
    pub factory: CommandFactory,
    pub name: String,
    pub rest: Vec<String>,
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("name", &self.name)
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}

struct Entry {
    name: String,
    words: Vec<String>,
    factory: CommandFactory,
}

/// Ordered mapping from command name to command factory.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<Entry>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command under `name`, replacing any previous
    /// registration with the same name.
    pub fn add<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Command> + 'static,
    {
        let name = name.into();
        let entry = Entry {
            words: name.split_whitespace().map(String::from).collect(),
            factory: Rc::new(factory),
            name,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Resolves a token sequence to a registered command.
    ///
    /// Prefers the longest registered name matching a prefix of `tokens`,
    /// so `"stash list"` wins over `"stash"` for input
    /// `["stash", "list", "-a"]`.
    pub fn resolve(&self, tokens: &[String]) -> Result<Resolution, DispatchError> {
        let mut best: Option<&Entry> = None;
        for entry in &self.entries {
            if entry.words.len() <= tokens.len()
                && entry.words.iter().zip(tokens).all(|(w, t)| w == t)
                && best.is_none_or(|b| entry.words.len() > b.words.len())
            {
                best = Some(entry);
            }
        }
        match best {
            Some(entry) => Ok(Resolution {
                factory: entry.factory.clone(),
                name: entry.name.clone(),
                rest: tokens[entry.words.len()..].to_vec(),
            }),
            None => Err(DispatchError::CommandNotFound(tokens.join(" "))),
        }
    }

    /// Iterates over registered names and factories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandFactory)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.factory))
    }

    /// Iterates over registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
