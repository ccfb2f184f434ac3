//! Lifecycle hooks for the dispatch engine.
//!
//! The engine exposes four named callback slots, supplied as a
//! [`Lifecycle`] value with no-op defaults:
//!
//! ```text
//! raw argv
//!   → AUGMENT_OPTIONS ← (extend the global option parser)
//!   → global parse, logging setup
//!   → INIT ← (once per run; may stash option extensions)
//!   → per invocation:
//!       → PREPARE ← (before resolution; open connections etc.)
//!       → resolve, parse, execute
//!       → CLEAN_UP ← (always, exactly once per invocation attempt)
//! ```
//!
//! `clean_up` receives the command instance (when resolution produced
//! one), the result code so far (the fallback `1` when execution never
//! produced one), and the captured failure, if any. A failure raised by
//! `clean_up` itself is reported separately from the failure it was
//! handed; the engine never conflates the two.

use std::fmt;
use std::rc::Rc;

use clap::ArgMatches;
use thiserror::Error;

use crate::command::Command;
use crate::options::GlobalOptions;

/// The stage at which a lifecycle hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    /// Failure in the once-per-run init hook
    Init,
    /// Failure in the per-invocation prepare hook
    Prepare,
    /// Failure in the per-invocation cleanup hook
    CleanUp,
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStage::Init => write!(f, "init"),
            LifecycleStage::Prepare => write!(f, "prepare"),
            LifecycleStage::CleanUp => write!(f, "clean-up"),
        }
    }
}

/// Error returned by a lifecycle hook.
#[derive(Debug, Error)]
#[error("lifecycle error ({stage}): {message}")]
pub struct LifecycleError {
    /// Human-readable error message
    pub message: String,
    /// The stage where the failure occurred
    pub stage: LifecycleStage,
    /// The underlying error, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl LifecycleError {
    /// Creates an error for the init stage.
    pub fn init(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: LifecycleStage::Init,
            source: None,
        }
    }

    /// Creates an error for the prepare stage.
    pub fn prepare(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: LifecycleStage::Prepare,
            source: None,
        }
    }

    /// Creates an error for the clean-up stage.
    pub fn clean_up(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: LifecycleStage::CleanUp,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

/// Type alias for the option-parser augmentation hook.
pub type AugmentOptionsFn = Rc<dyn Fn(clap::Command) -> clap::Command>;

/// Type alias for the once-per-run init hook.
///
/// Receives the parsed global matches (including any flags added by
/// `augment_options`) and mutable access to the options, which are sealed
/// once this hook returns.
pub type InitFn = Rc<dyn Fn(&ArgMatches, &mut GlobalOptions) -> Result<(), LifecycleError>>;

/// Type alias for the per-invocation prepare hook.
pub type PrepareFn = Rc<dyn Fn(&GlobalOptions) -> Result<(), LifecycleError>>;

/// Type alias for the per-invocation cleanup hook.
pub type CleanUpFn =
    Rc<dyn Fn(Option<&dyn Command>, i32, Option<&anyhow::Error>) -> Result<(), LifecycleError>>;

/// The four lifecycle callback slots, each defaulting to a no-op.
#[derive(Clone, Default)]
pub struct Lifecycle {
    augment_options: Option<AugmentOptionsFn>,
    init: Option<InitFn>,
    prepare: Option<PrepareFn>,
    clean_up: Option<CleanUpFn>,
}

impl Lifecycle {
    /// Creates a lifecycle with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook that extends the global option parser with
    /// application-specific flags.
    pub fn augment_options<F>(mut self, f: F) -> Self
    where
        F: Fn(clap::Command) -> clap::Command + 'static,
    {
        self.augment_options = Some(Rc::new(f));
        self
    }

    /// Sets the once-per-run init hook, run after global parsing and
    /// logging setup but before any command.
    pub fn init<F>(mut self, f: F) -> Self
    where
        F: Fn(&ArgMatches, &mut GlobalOptions) -> Result<(), LifecycleError> + 'static,
    {
        self.init = Some(Rc::new(f));
        self
    }

    /// Sets the prepare hook, run before each invocation is resolved.
    pub fn prepare<F>(mut self, f: F) -> Self
    where
        F: Fn(&GlobalOptions) -> Result<(), LifecycleError> + 'static,
    {
        self.prepare = Some(Rc::new(f));
        self
    }

    /// Sets the cleanup hook, run exactly once per invocation attempt
    /// whatever the outcome.
    pub fn clean_up<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&dyn Command>, i32, Option<&anyhow::Error>) -> Result<(), LifecycleError>
            + 'static,
    {
        self.clean_up = Some(Rc::new(f));
        self
    }

    /// Applies the augmentation hook to the global option parser.
    pub fn run_augment_options(&self, parser: clap::Command) -> clap::Command {
        match &self.augment_options {
            Some(f) => f(parser),
            None => parser,
        }
    }

    /// Runs the init hook.
    pub fn run_init(
        &self,
        matches: &ArgMatches,
        options: &mut GlobalOptions,
    ) -> Result<(), LifecycleError> {
        match &self.init {
            Some(f) => f(matches, options),
            None => Ok(()),
        }
    }

    /// Runs the prepare hook.
    pub fn run_prepare(&self, options: &GlobalOptions) -> Result<(), LifecycleError> {
        match &self.prepare {
            Some(f) => f(options),
            None => Ok(()),
        }
    }

    /// Runs the cleanup hook.
    pub fn run_clean_up(
        &self,
        command: Option<&dyn Command>,
        result: i32,
        failure: Option<&anyhow::Error>,
    ) -> Result<(), LifecycleError> {
        match &self.clean_up {
            Some(f) => f(command, result, failure),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("augment_options", &self.augment_options.is_some())
            .field("init", &self.init.is_some())
            .field("prepare", &self.prepare.is_some())
            .field("clean_up", &self.clean_up.is_some())
            .finish()
    }
}
