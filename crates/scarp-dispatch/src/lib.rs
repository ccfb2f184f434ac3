//! Command model and lifecycle hooks for subcommand-style CLIs.
//!
//! `scarp-dispatch` provides the vocabulary the dispatch engine in the
//! `scarp` crate is built on: the [`Command`] trait, the
//! [`CommandRegistry`] that resolves token sequences to commands, the
//! per-run [`GlobalOptions`], and the [`Lifecycle`] hook slots.
//!
//! # Design
//!
//! - **Commands are values, created per invocation**: a [`CommandFactory`]
//!   produces a fresh boxed command for every dispatch; nothing is reused
//!   across invocations.
//! - **Multi-word names**: registry names may contain spaces
//!   (`"stash list"`). Resolution prefers the longest registered name that
//!   is a prefix of the input tokens, so subcommand groups need no nesting.
//! - **Hooks are values, not subclasses**: the embedding application hands
//!   the engine a [`Lifecycle`] with up to four callbacks
//!   (`augment_options`, `init`, `prepare`, `clean_up`), each defaulting
//!   to a no-op.
//!
//! # Single-Threaded Design
//!
//! One invocation is fully resolved, parsed, executed, and cleaned up
//! before the next is considered. Callbacks and factories are stored as
//! `Rc<dyn Fn>`; there is no locking because there is no concurrent
//! access.

mod command;
mod lifecycle;
mod options;
mod registry;

pub use command::{Command, CommandContext, CommandFactory, FAILURE, SUCCESS};

pub use lifecycle::{
    AugmentOptionsFn, CleanUpFn, InitFn, Lifecycle, LifecycleError, LifecycleStage, PrepareFn,
};

pub use options::{Extensions, GlobalOptions, DEFAULT_VERBOSITY};

pub use registry::{CommandRegistry, DispatchError, Resolution};
