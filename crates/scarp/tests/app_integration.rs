//! End-to-end tests of the dispatch engine: lifecycle ordering, failure
//! capture, and the interactive shell.

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::rc::Rc;

use clap::{Arg, ArgAction, ArgMatches};
use scarp::{App, AppBuilder, Command, CommandContext, Lifecycle, FAILURE, SUCCESS};

/// Observations shared between test commands/hooks and assertions.
#[derive(Default)]
struct Probe {
    built: Cell<u32>,
    ran: Cell<u32>,
    display_names: RefCell<Vec<String>>,
    cleanups: RefCell<Vec<(bool, i32, bool)>>,
    init_runs: Cell<u32>,
    prepare_runs: Cell<u32>,
    seen_verbosity: Cell<usize>,
}

struct TestCommand {
    probe: Rc<Probe>,
    fail: bool,
}

impl Command for TestCommand {
    fn build_parser(&self, display_name: &str) -> clap::Command {
        self.probe
            .display_names
            .borrow_mut()
            .push(display_name.to_owned());
        clap::Command::new(display_name.to_owned())
            .about("test command")
            .arg(Arg::new("rest").action(ArgAction::Append).num_args(0..))
    }

    fn run(&mut self, _ctx: &CommandContext<'_>, _matches: &ArgMatches) -> anyhow::Result<i32> {
        self.probe.ran.set(self.probe.ran.get() + 1);
        if self.fail {
            anyhow::bail!("boom");
        }
        Ok(SUCCESS)
    }
}

struct StrictParser;

impl Command for StrictParser {
    fn build_parser(&self, display_name: &str) -> clap::Command {
        clap::Command::new(display_name.to_owned()).about("accepts no arguments")
    }

    fn run(&mut self, _ctx: &CommandContext<'_>, _matches: &ArgMatches) -> anyhow::Result<i32> {
        Ok(SUCCESS)
    }
}

fn lifecycle(probe: &Rc<Probe>) -> Lifecycle {
    let init_probe = probe.clone();
    let prepare_probe = probe.clone();
    let cleanup_probe = probe.clone();
    Lifecycle::new()
        .init(move |_matches, options| {
            init_probe.init_runs.set(init_probe.init_runs.get() + 1);
            init_probe.seen_verbosity.set(options.verbosity);
            Ok(())
        })
        .prepare(move |_options| {
            prepare_probe
                .prepare_runs
                .set(prepare_probe.prepare_runs.get() + 1);
            Ok(())
        })
        .clean_up(move |command, result, failure| {
            cleanup_probe
                .cleanups
                .borrow_mut()
                .push((command.is_some(), result, failure.is_some()));
            Ok(())
        })
}

fn builder(dir: &tempfile::TempDir, probe: &Rc<Probe>) -> AppBuilder {
    let ok_probe = probe.clone();
    let bad_probe = probe.clone();
    App::builder()
        .name("tool")
        .description("test harness")
        .version("0.0.0")
        .log_file(dir.path().join("tool.log"))
        .lifecycle(lifecycle(probe))
        .command("greet", move || {
            ok_probe.built.set(ok_probe.built.get() + 1);
            Box::new(TestCommand {
                probe: ok_probe.clone(),
                fail: false,
            })
        })
        .command("boom", move || {
            bad_probe.built.set(bad_probe.built.get() + 1);
            Box::new(TestCommand {
                probe: bad_probe.clone(),
                fail: true,
            })
        })
        .command("strict", || Box::new(StrictParser))
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn successful_command_returns_its_result() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();

    let code = app.run(argv(&["greet"])).unwrap();

    assert_eq!(code, SUCCESS);
    assert_eq!(probe.ran.get(), 1);
    assert_eq!(probe.prepare_runs.get(), 1);
    assert_eq!(*probe.cleanups.borrow(), vec![(true, SUCCESS, false)]);
}

#[test]
fn failing_command_is_swallowed_without_debug() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();

    let code = app.run(argv(&["boom"])).unwrap();

    assert_eq!(code, FAILURE);
    // Cleanup saw the command and the captured failure; the fallback
    // result stood in because execution never produced one.
    assert_eq!(*probe.cleanups.borrow(), vec![(true, FAILURE, true)]);
}

#[test]
fn failing_command_propagates_with_debug() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();

    let err = app.run(argv(&["--debug", "boom"])).unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert_eq!(probe.cleanups.borrow().len(), 1);
}

#[test]
fn unknown_command_fails_locally_even_with_debug() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();

    let code = app.run(argv(&["--debug", "frobnicate"])).unwrap();

    assert_eq!(code, FAILURE);
    assert_eq!(probe.built.get(), 0);
    // Cleanup still ran once, with no command instance and no captured
    // failure.
    assert_eq!(*probe.cleanups.borrow(), vec![(false, FAILURE, false)]);
}

#[test]
fn subcommand_parse_error_is_an_invocation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();

    let code = app.run(argv(&["strict", "--bogus"])).unwrap();

    assert_eq!(code, FAILURE);
    assert_eq!(*probe.cleanups.borrow(), vec![(true, FAILURE, true)]);
}

#[test]
fn cleanup_failure_does_not_change_the_result_without_debug() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let ok_probe = probe.clone();
    let mut app = App::builder()
        .name("tool")
        .version("0.0.0")
        .log_file(dir.path().join("tool.log"))
        .lifecycle(Lifecycle::new().clean_up(|_, _, _| {
            Err(scarp::LifecycleError::clean_up("socket already closed"))
        }))
        .command("greet", move || {
            Box::new(TestCommand {
                probe: ok_probe.clone(),
                fail: false,
            })
        })
        .build();

    let code = app.run(argv(&["greet"])).unwrap();

    assert_eq!(code, SUCCESS);
    assert_eq!(probe.ran.get(), 1);
}

#[test]
fn cleanup_failure_propagates_with_debug() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::builder()
        .name("tool")
        .version("0.0.0")
        .log_file(dir.path().join("tool.log"))
        .lifecycle(Lifecycle::new().clean_up(|_, _, _| {
            Err(scarp::LifecycleError::clean_up("socket already closed"))
        }))
        .command("strict", || Box::new(StrictParser))
        .build();

    let err = app.run(argv(&["--debug", "strict"])).unwrap_err();

    assert!(err.to_string().contains("socket already closed"));
}

#[test]
fn original_failure_wins_over_cleanup_failure() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let bad_probe = probe.clone();
    let mut app = App::builder()
        .name("tool")
        .version("0.0.0")
        .log_file(dir.path().join("tool.log"))
        .lifecycle(Lifecycle::new().clean_up(|_, _, _| {
            Err(scarp::LifecycleError::clean_up("socket already closed"))
        }))
        .command("boom", move || {
            Box::new(TestCommand {
                probe: bad_probe.clone(),
                fail: true,
            })
        })
        .build();

    let err = app.run(argv(&["--debug", "boom"])).unwrap_err();

    assert_eq!(err.to_string(), "boom");
}

#[test]
fn multi_word_command_resolves_through_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let sub_probe = probe.clone();
    let mut app = builder(&dir, &probe)
        .command("foo bar", move || {
            Box::new(TestCommand {
                probe: sub_probe.clone(),
                fail: false,
            })
        })
        .build();

    let code = app.run(argv(&["foo", "bar", "baz"])).unwrap();

    assert_eq!(code, SUCCESS);
    assert_eq!(probe.ran.get(), 1);
    // Single-shot display names carry the program prefix.
    assert_eq!(*probe.display_names.borrow(), vec!["tool foo bar"]);
}

#[test]
fn init_hook_sees_parsed_verbosity() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();
    app.run(argv(&["-v", "-v", "greet"])).unwrap();
    assert_eq!(probe.seen_verbosity.get(), 3);

    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();
    app.run(argv(&["-q", "greet"])).unwrap();
    assert_eq!(probe.seen_verbosity.get(), 0);
}

#[test]
fn augmented_flag_reaches_init_and_commands() {
    struct DataDir(String);

    struct ReadsExtension;

    impl Command for ReadsExtension {
        fn build_parser(&self, display_name: &str) -> clap::Command {
            clap::Command::new(display_name.to_owned())
        }

        fn run(&mut self, ctx: &CommandContext<'_>, _matches: &ArgMatches) -> anyhow::Result<i32> {
            let dir = ctx.options.extensions.get_required::<DataDir>()?;
            assert_eq!(dir.0, "/tmp/x");
            Ok(SUCCESS)
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let mut app = App::builder()
        .name("tool")
        .version("0.0.0")
        .log_file(dir.path().join("tool.log"))
        .lifecycle(
            Lifecycle::new()
                .augment_options(|cmd| {
                    cmd.arg(Arg::new("data-dir").long("data-dir").action(ArgAction::Set))
                })
                .init(|matches, options| {
                    if let Some(value) = matches.get_one::<String>("data-dir") {
                        options.extensions.insert(DataDir(value.clone()));
                    }
                    Ok(())
                }),
        )
        .command("show", || Box::new(ReadsExtension))
        .build();

    let code = app.run(argv(&["--data-dir", "/tmp/x", "show"])).unwrap();
    assert_eq!(code, SUCCESS);
}

#[test]
fn empty_input_interactive_session_returns_success() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).input(Cursor::new("")).build();

    let code = app.run(argv(&[])).unwrap();

    assert_eq!(code, SUCCESS);
    assert_eq!(probe.init_runs.get(), 1);
    // No invocation was ever constructed.
    assert!(probe.cleanups.borrow().is_empty());
}

#[test]
fn interactive_lines_dispatch_like_single_shots() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe)
        .input(Cursor::new("greet\n\ngreet\nquit\n"))
        .build();

    let code = app.run(argv(&[])).unwrap();

    assert_eq!(code, SUCCESS);
    assert_eq!(probe.ran.get(), 2);
    // One fresh instance per line, init once for the whole session,
    // cleanup once per line.
    assert_eq!(probe.built.get(), 2);
    assert_eq!(probe.init_runs.get(), 1);
    assert_eq!(probe.cleanups.borrow().len(), 2);
    // Interactive display names are the short form.
    assert_eq!(*probe.display_names.borrow(), vec!["greet", "greet"]);
}

#[test]
fn interactive_session_survives_failures_without_debug() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe)
        .input(Cursor::new("frobnicate\nboom\ngreet\n"))
        .build();

    let code = app.run(argv(&[])).unwrap();

    assert_eq!(code, SUCCESS);
    // All three lines got their cleanup; the session ended on EOF.
    assert_eq!(probe.cleanups.borrow().len(), 3);
    assert_eq!(probe.ran.get(), 2);
}

#[test]
fn interactive_session_ends_on_debug_failure() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe)
        .input(Cursor::new("boom\ngreet\n"))
        .build();

    let err = app.run(argv(&["--debug"])).unwrap_err();

    assert_eq!(err.to_string(), "boom");
    // The session ended before the second line ran.
    assert_eq!(probe.ran.get(), 1);
    assert_eq!(probe.cleanups.borrow().len(), 1);
}

#[test]
fn quoted_interactive_tokens_stay_whole() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let sub_probe = probe.clone();
    let mut app = builder(&dir, &probe)
        .command("say", move || {
            Box::new(TestCommand {
                probe: sub_probe.clone(),
                fail: false,
            })
        })
        .input(Cursor::new("say \"hello world\"\nexit\n"))
        .build();

    let code = app.run(argv(&[])).unwrap();

    assert_eq!(code, SUCCESS);
    assert_eq!(probe.ran.get(), 1);
}

#[test]
fn help_command_lists_and_describes() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();

    assert_eq!(app.run(argv(&["help"])).unwrap(), SUCCESS);

    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();
    assert_eq!(app.run(argv(&["help", "greet"])).unwrap(), SUCCESS);

    // Asking for help on an unknown name is a resolution failure.
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();
    assert_eq!(app.run(argv(&["help", "frobnicate"])).unwrap(), FAILURE);
}

#[test]
fn help_on_unknown_name_stays_local_with_debug() {
    let dir = tempfile::tempdir().unwrap();
    let probe = Rc::new(Probe::default());
    let mut app = builder(&dir, &probe).build();

    // Like direct resolution failures, this never propagates as Err.
    let code = app.run(argv(&["--debug", "help", "frobnicate"])).unwrap();

    assert_eq!(code, FAILURE);
    // The help command itself ran and returned the failure code; nothing
    // was captured as a failure for cleanup.
    assert_eq!(*probe.cleanups.borrow(), vec![(true, FAILURE, false)]);
}
