//! The command trait and its execution context.
//!
//! A command is one named unit of behavior: it owns its argument grammar
//! (a clap parser built per display name) and an execution body that
//! returns an integer result. Concrete commands are supplied by the
//! embedding application; the engine creates one instance per invocation
//! from a [`CommandFactory`] and drops it once cleanup has run.

use std::rc::Rc;

use clap::ArgMatches;

use crate::options::GlobalOptions;
use crate::registry::CommandRegistry;

/// Result code for a successful invocation.
pub const SUCCESS: i32 = 0;

/// Fallback result code when an invocation fails before producing one.
pub const FAILURE: i32 = 1;

/// A single subcommand: parser construction plus an execution body.
///
/// `build_parser` and `run` are split so the engine can parse the
/// invocation's remaining tokens against the command's own grammar before
/// execution starts, and so help output can be produced without running
/// anything.
pub trait Command {
    /// Builds the argument parser for this command.
    ///
    /// `display_name` is what usage and help output call the command. The
    /// engine passes the bare command name in interactive mode and
    /// `"<program> <name>"` in single-shot mode; implementations should
    /// use it verbatim as the parser name.
    fn build_parser(&self, display_name: &str) -> clap::Command;

    /// Executes the command with its parsed arguments.
    ///
    /// Returns the invocation's result code (0 for success). Failures
    /// raised here are captured by the engine: logged as a single error
    /// line by default, logged in full and propagated when debug mode is
    /// on.
    fn run(&mut self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> anyhow::Result<i32>;
}

/// Creates a fresh command instance for one invocation.
pub type CommandFactory = Rc<dyn Fn() -> Box<dyn Command>>;

/// Borrowed view of the running application, handed to [`Command::run`].
///
/// Commands read the per-run options (and any application-specific
/// extension state stashed in them) through this context instead of
/// holding a reference back to the application itself.
pub struct CommandContext<'a> {
    /// Options parsed once at the start of the run.
    pub options: &'a GlobalOptions,
    /// The registry this command was resolved from. Used by commands that
    /// enumerate or describe other commands, such as the built-in help.
    pub registry: &'a CommandRegistry,
    /// The program name the application was built with.
    pub program: &'a str,
    /// True when the invocation came from the interactive shell.
    pub interactive: bool,
}
