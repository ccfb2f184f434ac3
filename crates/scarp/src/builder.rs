//! Builder for [`App`].

use std::io::BufRead;
use std::path::{Path, PathBuf};

use scarp_dispatch::{Command, CommandRegistry, GlobalOptions, Lifecycle};

use crate::app::App;
use crate::help::HelpCommand;

/// Configures and constructs an [`App`].
///
/// A `help` command is registered up front; application commands are
/// added with [`AppBuilder::command`] and may shadow it.
pub struct AppBuilder {
    name: Option<String>,
    description: String,
    version: String,
    log_file: Option<PathBuf>,
    registry: CommandRegistry,
    lifecycle: Lifecycle,
    input: Option<Box<dyn BufRead>>,
}

impl AppBuilder {
    pub(crate) fn new() -> Self {
        let mut registry = CommandRegistry::new();
        registry.add("help", || Box::new(HelpCommand));
        Self {
            name: None,
            description: String::new(),
            version: String::new(),
            log_file: None,
            registry,
            lifecycle: Lifecycle::new(),
            input: None,
        }
    }

    /// Sets the program name. Defaults to the executable's file stem.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// One-liner explaining the program's purpose, shown in `--help`.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Version string printed by `--version`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Overrides the log file location. Defaults to `<name>.log` in the
    /// current working directory.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Registers a command. `name` may contain spaces for multi-word
    /// command names (`"stash list"`).
    pub fn command<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Command> + 'static,
    {
        self.registry.add(name, factory);
        self
    }

    /// Supplies the lifecycle hook slots.
    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Replaces the interactive shell's input stream. Defaults to stdin;
    /// tests feed a cursor.
    pub fn input(mut self, input: impl BufRead + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Builds the application.
    pub fn build(self) -> App {
        App {
            name: self.name.unwrap_or_else(program_name),
            description: self.description,
            version: self.version,
            log_file: self.log_file,
            registry: self.registry,
            lifecycle: self.lifecycle,
            input: self.input,
            options: GlobalOptions::default(),
            interactive_mode: false,
        }
    }
}

/// The executable's file stem, or "app" when argv is empty.
fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_stem)
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| "app".to_owned())
}
