//! notes: a tiny note-taking CLI showing the scarp harness end to end.
//!
//! Run `notes add "buy milk"` for a single shot, or bare `notes` for the
//! interactive shell. `notes --file other.txt list` shows an
//! application-specific global flag flowing through the lifecycle hooks.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Arg, ArgAction, ArgMatches};
use scarp::{App, Command, CommandContext, Lifecycle, SUCCESS};
use tracing::{debug, info};

const DEFAULT_NOTES_FILE: &str = "notes.txt";

/// Where notes are stored; stashed in the option extensions by the init
/// hook so every command reads the same location.
struct NotesFile(PathBuf);

impl NotesFile {
    fn read_lines(&self) -> Result<Vec<String>> {
        if !self.0.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.0)
            .with_context(|| format!("cannot read {}", self.0.display()))?;
        Ok(contents.lines().map(str::to_owned).collect())
    }
}

struct Add;

impl Command for Add {
    fn build_parser(&self, display_name: &str) -> clap::Command {
        clap::Command::new(display_name.to_owned())
            .about("Append a note")
            .arg(
                Arg::new("text")
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .required(true)
                    .help("The note text"),
            )
    }

    fn run(&mut self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let file = ctx.options.extensions.get_required::<NotesFile>()?;
        let text = matches
            .get_many::<String>("text")
            .expect("required")
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        let mut lines = file.read_lines()?;
        lines.push(text);
        fs::write(&file.0, lines.join("\n") + "\n")
            .with_context(|| format!("cannot write {}", file.0.display()))?;
        info!("added note {}", lines.len());
        Ok(SUCCESS)
    }
}

struct List;

impl Command for List {
    fn build_parser(&self, display_name: &str) -> clap::Command {
        clap::Command::new(display_name.to_owned()).about("List all notes")
    }

    fn run(&mut self, ctx: &CommandContext<'_>, _matches: &ArgMatches) -> Result<i32> {
        let file = ctx.options.extensions.get_required::<NotesFile>()?;
        for (i, line) in file.read_lines()?.iter().enumerate() {
            println!("{:>3}  {}", i + 1, line);
        }
        Ok(SUCCESS)
    }
}

struct ClearAll;

impl Command for ClearAll {
    fn build_parser(&self, display_name: &str) -> clap::Command {
        clap::Command::new(display_name.to_owned()).about("Delete every note")
    }

    fn run(&mut self, ctx: &CommandContext<'_>, _matches: &ArgMatches) -> Result<i32> {
        let file = ctx.options.extensions.get_required::<NotesFile>()?;
        if file.0.exists() {
            fs::remove_file(&file.0)
                .with_context(|| format!("cannot remove {}", file.0.display()))?;
        }
        info!("cleared all notes");
        Ok(SUCCESS)
    }
}

fn lifecycle() -> Lifecycle {
    Lifecycle::new()
        .augment_options(|cmd| {
            cmd.arg(
                Arg::new("file")
                    .long("file")
                    .action(ArgAction::Set)
                    .help("Notes file to operate on"),
            )
        })
        .init(|matches, options| {
            let path = matches
                .get_one::<String>("file")
                .map(String::as_str)
                .unwrap_or(DEFAULT_NOTES_FILE);
            options.extensions.insert(NotesFile(PathBuf::from(path)));
            Ok(())
        })
        .clean_up(|command, result, failure| {
            debug!(
                "invocation finished: command={} result={} failure={}",
                command.is_some(),
                result,
                failure.is_some()
            );
            Ok(())
        })
}

fn main() -> Result<()> {
    let mut app = App::builder()
        .name("notes")
        .description("Tiny note-taking CLI built on scarp")
        .version(env!("CARGO_PKG_VERSION"))
        .lifecycle(lifecycle())
        .command("add", || Box::new(Add))
        .command("list", || Box::new(List))
        .command("clear all", || Box::new(ClearAll))
        .build();

    let code = app.run(std::env::args().skip(1))?;
    std::process::exit(code);
}
