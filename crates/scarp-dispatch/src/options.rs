//! Per-run global option state.
//!
//! [`GlobalOptions`] is created exactly once per run by the global option
//! parser and treated as immutable after the `init` lifecycle hook has
//! run. Applications that add their own global flags via the
//! `augment_options` hook stash the parsed values in
//! [`GlobalOptions::extensions`] during `init`, and commands read them
//! back through the execution context.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Verbosity level when neither `-v` nor `-q` is given.
pub const DEFAULT_VERBOSITY: usize = 1;

/// Options shared by every command in a run.
#[derive(Debug)]
pub struct GlobalOptions {
    /// Console verbosity level. 0 shows warnings and errors only, 1 adds
    /// info, 2 and up add debug output.
    pub verbosity: usize,
    /// When set, failures are logged in full and propagated to the caller
    /// of `run` instead of being swallowed.
    pub debug: bool,
    /// Application-specific option state, keyed by type.
    pub extensions: Extensions,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            verbosity: DEFAULT_VERBOSITY,
            debug: false,
            extensions: Extensions::new(),
        }
    }
}

/// Type-keyed container for application-specific option state.
///
/// Each inserted value is stored under its `TypeId`; inserting a second
/// value of the same type replaces the first.
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any>>,
}

impl Extensions {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value of the same type if
    /// one was present.
    pub fn insert<T: 'static>(&mut self, val: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Gets a reference to the stored value of type `T`, if any.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Gets a mutable reference to the stored value of type `T`, if any.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Gets a reference to the stored value of type `T`, failing if it was
    /// never inserted.
    pub fn get_required<T: 'static>(&self) -> Result<&T, anyhow::Error> {
        self.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "option extension missing: {} was never inserted",
                std::any::type_name::<T>()
            )
        })
    }

    /// Returns `true` if a value of type `T` is stored.
    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}
