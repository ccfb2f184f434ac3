//! Application harness for multi-command CLI tools.
//!
//! scarp owns the boilerplate every subcommand-style tool repeats: global
//! option parsing with pass-through of everything it does not recognize,
//! dual log sinks (a size-rotated file plus a verbosity-filtered console),
//! command resolution and dispatch, an interactive shell when no command
//! is given, and a cleanup hook that runs exactly once per invocation no
//! matter what failed before it.
//!
//! ## Run lifecycle
//!
//! ```text
//! argv
//!   → global option parse   (--version/-h exit here; unknown tokens pass through)
//!   → logging setup         (file sink at TRACE, console at the mapped level)
//!   → init hook             (once per run, even across interactive lines)
//!   → mode select           (empty remainder → shell; otherwise single shot)
//!   → per invocation: prepare → resolve → parse → execute → clean_up
//! ```
//!
//! Failures from a command body or a hook are captured as values. With
//! debug mode off they are logged as one error line and the invocation
//! settles on result 1; with `--debug` they are logged in full and
//! returned as `Err` from [`App::run`], which also ends an interactive
//! session. A failure inside `clean_up` is reported under its own message
//! and never replaces the failure it was handed.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use scarp::{App, Command, CommandContext, Lifecycle, SUCCESS};
//!
//! struct Greet;
//!
//! impl Command for Greet {
//!     fn build_parser(&self, display_name: &str) -> clap::Command {
//!         clap::Command::new(display_name.to_owned()).about("Say hello")
//!     }
//!
//!     fn run(&mut self, _ctx: &CommandContext<'_>, _m: &clap::ArgMatches) -> anyhow::Result<i32> {
//!         println!("hello");
//!         Ok(SUCCESS)
//!     }
//! }
//!
//! let mut app = App::builder()
//!     .name("mytool")
//!     .version("1.0.0")
//!     .command("greet", || Box::new(Greet))
//!     .build();
//!
//! let code = app.run(std::env::args().skip(1))?;
//! std::process::exit(code);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Key types
//!
//! - [`App`] / [`AppBuilder`]: the dispatch engine and its configuration
//! - [`Command`]: one named unit of behavior (parser + execution body)
//! - [`CommandRegistry`]: name → factory mapping with multi-word names
//! - [`Lifecycle`]: the four hook slots (`augment_options`, `init`,
//!   `prepare`, `clean_up`)
//! - [`GlobalOptions`]: per-run verbosity, debug flag, and extension state

mod app;
mod builder;
mod help;
mod logging;
mod options;
mod shell;

pub use app::App;
pub use builder::AppBuilder;
pub use help::HelpCommand;

// Re-export the command model from scarp-dispatch.
pub use scarp_dispatch::{
    Command, CommandContext, CommandFactory, CommandRegistry, DispatchError, Extensions,
    GlobalOptions, Lifecycle, LifecycleError, LifecycleStage, Resolution, DEFAULT_VERBOSITY,
    FAILURE, SUCCESS,
};
