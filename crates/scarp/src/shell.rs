//! The interactive shell: a read-dispatch loop over the engine.
//!
//! Each line is tokenized and re-enters the single-shot dispatch path, so
//! hooks, resolution, and failure handling behave identically in both
//! modes. The loop ends on end-of-input or an explicit quit line with
//! result 0; a failed invocation is reported and the loop reads on,
//! unless debug mode propagates the failure.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::error;

use scarp_dispatch::SUCCESS;

use crate::app::App;

const QUIT_COMMANDS: &[&str] = &["quit", "exit"];

pub(crate) fn run(app: &App, mut input: Box<dyn BufRead>) -> Result<i32> {
    let prompt = format!("({}) ", app.name());
    let mut line = String::new();
    loop {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&trimmed) {
            break;
        }
        let Some(tokens) = shlex::split(trimmed) else {
            error!("ERROR: unbalanced quoting: {}", trimmed);
            continue;
        };
        if tokens.is_empty() {
            continue;
        }
        // The result code is already settled and reported per line; only
        // a debug-mode failure (Err) ends the session here.
        let _ = app.run_invocation(&tokens)?;
    }
    Ok(SUCCESS)
}
