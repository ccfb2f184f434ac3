//! The built-in help command.
//!
//! Registered under `help` in every registry the builder creates. With no
//! arguments it lists the registered commands with their one-line abouts;
//! given a command name (multi-word names work) it prints that command's
//! own rendered help.

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches};
use tracing::error;

use scarp_dispatch::{Command, CommandContext, FAILURE, SUCCESS};

pub struct HelpCommand;

impl Command for HelpCommand {
    fn build_parser(&self, display_name: &str) -> clap::Command {
        clap::Command::new(display_name.to_owned())
            .about("Print help for a command, or list all commands")
            .arg(
                Arg::new("command")
                    .action(ArgAction::Append)
                    .num_args(0..)
                    .help("Name of the command to describe"),
            )
    }

    fn run(&mut self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<i32> {
        let tokens: Vec<String> = matches
            .get_many::<String>("command")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        if !tokens.is_empty() {
            // Stays local like any other resolution failure, even in
            // debug mode.
            let resolved = match ctx.registry.resolve(&tokens) {
                Ok(resolved) => resolved,
                Err(err) => {
                    error!("{}", err);
                    return Ok(FAILURE);
                }
            };
            let command = (resolved.factory)();
            let display_name = if ctx.interactive {
                resolved.name
            } else {
                format!("{} {}", ctx.program, resolved.name)
            };
            let help = command.build_parser(&display_name).render_long_help();
            println!("{}", help);
            return Ok(SUCCESS);
        }

        let mut entries: Vec<(String, String)> = ctx
            .registry
            .iter()
            .map(|(name, factory)| {
                let about = factory()
                    .build_parser(name)
                    .get_about()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                (name.to_owned(), about)
            })
            .collect();
        entries.sort_unstable();

        println!("Commands:");
        for (name, about) in entries {
            println!("  {:<16} {}", name, about);
        }
        Ok(SUCCESS)
    }
}
