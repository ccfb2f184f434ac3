//! Global option parsing.
//!
//! The raw argument vector is split at the first token the global parser
//! does not own: the head is parsed by a clap command built here
//! (optionally extended by the `augment_options` hook), the tail is the
//! untouched remainder, later interpreted as a command invocation. Help,
//! version, and malformed-global diagnostics are all rendered by clap
//! itself and terminate the process before any later lifecycle stage.

use std::collections::HashMap;

use clap::{Arg, ArgAction, ArgMatches};

use scarp_dispatch::{GlobalOptions, DEFAULT_VERBOSITY};

/// Builds the parser for the global flag set.
pub(crate) fn build_parser(name: &str, description: &str, version: &str) -> clap::Command {
    clap::Command::new(name.to_owned())
        .about(description.to_owned())
        .version(version.to_owned())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase verbosity of output. Can be repeated."),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress output except warnings and errors"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Show full error details and propagate failures"),
        )
}

/// Splits argv into (global flags, remainder).
///
/// The recognized flag set is derived from `parser` so flags added by the
/// `augment_options` hook are split correctly too. The remainder starts
/// at the first unrecognized token and is preserved verbatim, so
/// subcommand arguments pass through untouched.
pub(crate) fn split_args(parser: &clap::Command, args: &[String]) -> (Vec<String>, Vec<String>) {
    let mut spec = parser.clone();
    spec.build();

    let mut longs: HashMap<&str, bool> = HashMap::new();
    let mut shorts: HashMap<char, bool> = HashMap::new();
    for arg in spec.get_arguments() {
        let takes_value = matches!(arg.get_action(), ArgAction::Set | ArgAction::Append);
        if let Some(long) = arg.get_long() {
            longs.insert(long, takes_value);
        }
        if let Some(short) = arg.get_short() {
            shorts.insert(short, takes_value);
        }
    }

    let mut cut = 0;
    while cut < args.len() {
        let token = &args[cut];
        let consumed = if let Some(body) = token.strip_prefix("--") {
            let name = body.split_once('=').map_or(body, |(name, _)| name);
            match longs.get(name) {
                // "--flag=value" carries its value inline; a bare
                // value-taking flag consumes the next token too.
                Some(&takes_value) => {
                    if takes_value && !body.contains('=') {
                        2
                    } else {
                        1
                    }
                }
                None => break,
            }
        } else if let Some(body) = token.strip_prefix('-').filter(|b| !b.is_empty()) {
            match scan_short_cluster(body, &shorts) {
                Some(consumed) => consumed,
                None => break,
            }
        } else {
            break;
        };
        cut = (cut + consumed).min(args.len());
    }
    (args[..cut].to_vec(), args[cut..].to_vec())
}

/// Returns how many argv tokens a short-flag cluster consumes (2 when its
/// final flag expects a separate value), or `None` when any flag in the
/// cluster is unrecognized.
fn scan_short_cluster(body: &str, shorts: &HashMap<char, bool>) -> Option<usize> {
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        let &takes_value = shorts.get(&c)?;
        if takes_value {
            // "-fVALUE" carries its value in the same token.
            return Some(if chars.as_str().is_empty() { 2 } else { 1 });
        }
    }
    Some(1)
}

/// Builds the per-run options from the parsed global matches.
pub(crate) fn from_matches(matches: &ArgMatches) -> GlobalOptions {
    let verbosity = if matches.get_flag("quiet") {
        0
    } else {
        DEFAULT_VERBOSITY + matches.get_count("verbose") as usize
    };
    GlobalOptions {
        verbosity,
        debug: matches.get_flag("debug"),
        ..GlobalOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn split(argv: &[&str]) -> (Vec<String>, Vec<String>) {
        split_args(&build_parser("prog", "", "0.0.0"), &args(argv))
    }

    fn parse(argv: &[&str]) -> GlobalOptions {
        let matches = build_parser("prog", "", "0.0.0")
            .try_get_matches_from(args(argv))
            .unwrap();
        from_matches(&matches)
    }

    #[test]
    fn split_keeps_subcommand_arguments_untouched() {
        let (globals, remainder) = split(&["-v", "--debug", "serve", "--port", "80"]);
        assert_eq!(globals, args(&["-v", "--debug"]));
        assert_eq!(remainder, args(&["serve", "--port", "80"]));
    }

    #[test]
    fn split_recognizes_clustered_shorts() {
        let (globals, remainder) = split(&["-vv", "foo"]);
        assert_eq!(globals, args(&["-vv"]));
        assert_eq!(remainder, args(&["foo"]));
    }

    #[test]
    fn split_recognizes_help_and_version() {
        let (globals, remainder) = split(&["--version"]);
        assert_eq!(globals, args(&["--version"]));
        assert!(remainder.is_empty());

        let (globals, _) = split(&["-h"]);
        assert_eq!(globals, args(&["-h"]));
    }

    #[test]
    fn split_stops_at_first_unknown_token() {
        let (globals, remainder) = split(&["--unknown", "-v"]);
        assert!(globals.is_empty());
        assert_eq!(remainder, args(&["--unknown", "-v"]));
    }

    #[test]
    fn split_empty_argv() {
        let (globals, remainder) = split(&[]);
        assert!(globals.is_empty());
        assert!(remainder.is_empty());
    }

    #[test]
    fn split_consumes_values_of_augmented_flags() {
        let parser = build_parser("prog", "", "0.0.0").arg(
            Arg::new("data-dir")
                .long("data-dir")
                .action(ArgAction::Set),
        );

        let (globals, remainder) =
            split_args(&parser, &args(&["--data-dir", "/tmp", "list", "--all"]));
        assert_eq!(globals, args(&["--data-dir", "/tmp"]));
        assert_eq!(remainder, args(&["list", "--all"]));

        let (globals, remainder) = split_args(&parser, &args(&["--data-dir=/tmp", "list"]));
        assert_eq!(globals, args(&["--data-dir=/tmp"]));
        assert_eq!(remainder, args(&["list"]));
    }

    #[test]
    fn verbosity_defaults_to_one() {
        let opts = parse(&["prog"]);
        assert_eq!(opts.verbosity, 1);
        assert!(!opts.debug);
    }

    #[test]
    fn repeated_verbose_increments() {
        assert_eq!(parse(&["prog", "-v"]).verbosity, 2);
        assert_eq!(parse(&["prog", "-v", "-v"]).verbosity, 3);
        assert_eq!(parse(&["prog", "-vv"]).verbosity, 3);
    }

    #[test]
    fn quiet_forces_verbosity_to_zero() {
        assert_eq!(parse(&["prog", "-v", "-q"]).verbosity, 0);
    }

    #[test]
    fn debug_flag_is_parsed() {
        assert!(parse(&["prog", "--debug"]).debug);
    }
}
