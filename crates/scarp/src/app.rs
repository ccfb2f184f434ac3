//! The dispatch engine.
//!
//! [`App`] owns the run lifecycle: parse global options, configure
//! logging, run the one-time init hook, then hand control to either the
//! interactive shell or a single-shot dispatch of the leftover argument
//! vector. Every invocation attempt ends with exactly one `clean_up`
//! call, whatever happened before it.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, error};

use scarp_dispatch::{
    Command, CommandContext, CommandRegistry, GlobalOptions, Lifecycle, FAILURE,
};

use crate::builder::AppBuilder;
use crate::{logging, options, shell};

/// The application harness. Construct with [`App::builder`].
pub struct App {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) version: String,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) registry: CommandRegistry,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) input: Option<Box<dyn BufRead>>,
    pub(crate) options: GlobalOptions,
    pub(crate) interactive_mode: bool,
}

impl App {
    /// Creates a builder for constructing an App.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// The program name used for log files, prompts, and display names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The options parsed by the current run.
    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    /// The command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Runs the application with the given arguments (without the program
    /// name) and returns the final result code.
    ///
    /// `--version`, `-h/--help`, and malformed global flags are reported
    /// by the parsing layer itself and terminate the process before any
    /// later stage runs. An empty remainder enters the interactive shell;
    /// anything else is dispatched as a single command invocation.
    ///
    /// Returns `Err` only when debug mode is on and a command, prepare, or
    /// cleanup failure was captured, or when the init hook itself fails.
    pub fn run<I, T>(&mut self, argv: I) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();

        let parser = self.lifecycle.run_augment_options(options::build_parser(
            &self.name,
            &self.description,
            &self.version,
        ));
        let (globals, remainder) = options::split_args(&parser, &argv);
        let matches =
            match parser.try_get_matches_from(std::iter::once(self.name.clone()).chain(globals)) {
                Ok(matches) => matches,
                Err(err) => err.exit(),
            };
        let mut options = options::from_matches(&matches);

        let log_file = self
            .log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.log", self.name)));
        logging::configure(&log_file, options.verbosity)?;

        // Once per process run, even when the shell dispatches many
        // invocations afterwards. Options are sealed when it returns.
        self.lifecycle.run_init(&matches, &mut options)?;
        self.options = options;

        if remainder.is_empty() {
            self.interact()
        } else {
            self.run_invocation(&remainder)
        }
    }

    fn interact(&mut self) -> Result<i32> {
        self.interactive_mode = true;
        let input: Box<dyn BufRead> = match self.input.take() {
            Some(input) => input,
            None => Box::new(std::io::stdin().lock()),
        };
        shell::run(self, input)
    }

    /// Dispatches one command invocation: prepare → resolve → parse →
    /// execute → clean_up, in that order, with clean_up unconditional.
    pub(crate) fn run_invocation(&self, argv: &[String]) -> Result<i32> {
        let mut command: Option<Box<dyn Command>> = None;
        let mut result = FAILURE;
        let mut failure: Option<anyhow::Error> = None;

        match self.execute(argv, &mut command) {
            Ok(code) => result = code,
            Err(err) => {
                if self.options.debug {
                    error!("{:?}", err);
                } else {
                    error!("ERROR: {}", err);
                }
                failure = Some(err);
            }
        }

        let mut cleanup_failure: Option<anyhow::Error> = None;
        if let Err(err) = self
            .lifecycle
            .run_clean_up(command.as_deref(), result, failure.as_ref())
        {
            let err = anyhow::Error::from(err);
            if self.options.debug {
                error!("{:?}", err);
                cleanup_failure = Some(err);
            } else {
                error!("Could not clean up: {}", err);
            }
        }

        if self.options.debug {
            // The original failure wins; a cleanup failure never replaces it.
            if let Some(err) = failure {
                return Err(err);
            }
            if let Some(err) = cleanup_failure {
                return Err(err);
            }
        }
        Ok(result)
    }

    /// Resolves and executes one invocation, parking the command instance
    /// in `slot` so cleanup can see it even when a later step fails.
    fn execute(&self, argv: &[String], slot: &mut Option<Box<dyn Command>>) -> Result<i32> {
        self.lifecycle.run_prepare(&self.options)?;

        let resolved = match self.registry.resolve(argv) {
            Ok(resolved) => resolved,
            Err(err) => {
                // Resolution failures stay local even in debug mode.
                error!("{}", err);
                return Ok(FAILURE);
            }
        };

        let display_name = if self.interactive_mode {
            resolved.name.clone()
        } else {
            format!("{} {}", self.name, resolved.name)
        };

        let command = slot.insert((resolved.factory)());
        let parser = command.build_parser(&display_name);
        let matches = parser
            .try_get_matches_from(std::iter::once(display_name).chain(resolved.rest.clone()))?;

        let ctx = CommandContext {
            options: &self.options,
            registry: &self.registry,
            program: &self.name,
            interactive: self.interactive_mode,
        };
        debug!("running command '{}'", resolved.name);
        command.run(&ctx, &matches)
    }
}
