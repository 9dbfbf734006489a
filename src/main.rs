//! Purpose: `joinery` CLI entry point; prints a greeting built with `join_strings`.
//! Role: Binary crate root; parses args, gathers fragments, emits the joined line on stdout.
//! Invariants: With no arguments stdout is exactly `Hello, World\n` and the exit code is 0.
//! Invariants: Non-interactive errors are emitted as JSON on stderr; stdout carries output only.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Write};

use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use joinery::api::{Error, ErrorKind, join_strings, to_exit_code};

const DEFAULT_GREETING: [&str; 2] = ["Hello", "World"];

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `joinery --help`."),
                    color_mode_from_args(&args),
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;

    execute(cli)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "joinery",
    version,
    about = "Join text fragments with \", \" and print the result",
    long_about = None,
    after_help = r#"EXAMPLES
  $ joinery                          # Hello, World
  $ joinery one two three            # one, two, three
  $ printf 'a\nb\n' | joinery --stdin
  $ joinery --json Hello World       # {"joined":"Hello, World","fragments":2}"#
)]
struct Cli {
    #[arg(
        value_name = "FRAGMENT",
        help = "Fragments to join in order (default: Hello World)"
    )]
    fragments: Vec<String>,
    #[arg(
        long,
        conflicts_with = "fragments",
        help = "Read fragments from stdin, one per line"
    )]
    stdin: bool,
    #[arg(long, help = "Emit {\"joined\", \"fragments\"} JSON instead of plain text")]
    json: bool,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        long,
        value_name = "SHELL",
        value_enum,
        conflicts_with_all = ["fragments", "stdin", "json"],
        help = "Print a shell completion script and exit"
    )]
    completion: Option<Shell>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

// Best-effort `--color` lookup for errors raised before clap finishes parsing.
fn color_mode_from_args(args: &[OsString]) -> ColorMode {
    let mut mode = ColorMode::Auto;
    let mut iter = args.iter().skip(1).filter_map(|arg| arg.to_str());
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        let value = match arg.strip_prefix("--color") {
            Some("") => iter.next(),
            Some(rest) => rest.strip_prefix('='),
            None => None,
        };
        if let Some(parsed) = value.and_then(|value| ColorMode::from_str(value, true).ok()) {
            mode = parsed;
        }
    }
    mode
}

#[derive(Serialize)]
struct JoinOutput<'a> {
    joined: &'a str,
    fragments: usize,
}

fn execute(cli: Cli) -> Result<RunOutcome, Error> {
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        let mut script = Vec::new();
        clap_complete::aot::generate(shell, &mut cmd, "joinery", &mut script);
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(&script)
            .and_then(|()| stdout.flush())
            .map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to write completion script")
                    .with_source(err)
            })?;
        return Ok(RunOutcome::ok());
    }

    let (fragments, source) = if cli.stdin {
        (read_fragments(io::stdin().lock())?, "stdin")
    } else if cli.fragments.is_empty() {
        (
            DEFAULT_GREETING.iter().map(|s| s.to_string()).collect(),
            "default",
        )
    } else {
        (cli.fragments, "args")
    };

    let joined = join_strings(&fragments);
    debug!(fragments = fragments.len(), source, bytes = joined.len(), "joined fragments");

    if cli.json {
        let value = serde_json::to_value(JoinOutput {
            joined: &joined,
            fragments: fragments.len(),
        })
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode json output")
                .with_source(err)
        })?;
        emit_json(value)?;
    } else {
        write_stdout_line(&joined)?;
    }
    Ok(RunOutcome::ok())
}

fn read_fragments<R: BufRead>(reader: R) -> Result<Vec<String>, Error> {
    let mut fragments = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read fragments from stdin")
                .with_source(err)
        })?;
        fragments.push(line);
    }
    Ok(fragments)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: Value) -> Result<(), Error> {
    let encoded = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    let json = encoded.map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode json output")
            .with_source(err)
    })?;
    write_stdout_line(&json)
}

fn write_stdout_line(line: &str) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}")
        .and_then(|()| stdout.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write output")
                .with_source(err)
        })
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("I/O error. Check that stdin is readable UTF-8 and stdout is still open.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share the command if it persists.",
    )
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    debug!(kind = ?err.kind(), "command failed");
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, ColorMode, Error, ErrorKind, add_internal_hint, add_io_hint, clap_error_summary,
        color_mode_from_args, error_json, error_text, read_fragments,
    };
    use clap::{CommandFactory, Parser};
    use std::ffi::OsString;
    use std::io::{self, Cursor};

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_accepts_empty_string_fragments() {
        let cli = Cli::try_parse_from(["joinery", "", "x"]).expect("parse");
        assert_eq!(cli.fragments, vec!["".to_string(), "x".to_string()]);
        assert!(!cli.stdin);
    }

    #[test]
    fn stdin_conflicts_with_positional_fragments() {
        let err = match Cli::try_parse_from(["joinery", "--stdin", "a"]) {
            Ok(_) => panic!("expected conflict"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(clap_error_summary(&err).contains("--stdin"));
    }

    #[test]
    fn read_fragments_splits_lines_and_strips_crlf() {
        let fragments = read_fragments(Cursor::new("one\r\ntwo\n\nthree")).expect("read");
        assert_eq!(fragments, vec!["one", "two", "", "three"]);
    }

    #[test]
    fn read_fragments_empty_input_is_empty() {
        let fragments = read_fragments(Cursor::new("")).expect("read");
        assert!(fragments.is_empty());
    }

    #[test]
    fn read_fragments_rejects_invalid_utf8() {
        let err = read_fragments(Cursor::new(vec![0xff, b'\n'])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn color_mode_respects_tty() {
        assert!(ColorMode::Auto.use_color(true));
        assert!(!ColorMode::Auto.use_color(false));
        assert!(ColorMode::Always.use_color(false));
        assert!(!ColorMode::Never.use_color(true));
    }

    #[test]
    fn color_mode_is_recovered_from_unparsed_args() {
        let never = color_mode_from_args(&os_args(&["joinery", "--color", "never", "--bogus"]));
        assert!(matches!(never, ColorMode::Never));

        let always = color_mode_from_args(&os_args(&["joinery", "--bogus", "--color=always"]));
        assert!(matches!(always, ColorMode::Always));

        let invalid = color_mode_from_args(&os_args(&["joinery", "--color", "sometimes"]));
        assert!(matches!(invalid, ColorMode::Auto));

        let after_separator = color_mode_from_args(&os_args(&["joinery", "--", "--color=never"]));
        assert!(matches!(after_separator, ColorMode::Auto));

        let missing_value = color_mode_from_args(&os_args(&["joinery", "--color"]));
        assert!(matches!(missing_value, ColorMode::Auto));
    }

    #[test]
    fn hints_only_fill_matching_kinds() {
        let io_err = add_io_hint(Error::new(ErrorKind::Io));
        assert!(io_err.hint().is_some());

        let usage = add_io_hint(Error::new(ErrorKind::Usage));
        assert!(usage.hint().is_none());

        let kept = add_internal_hint(Error::new(ErrorKind::Internal).with_hint("custom"));
        assert_eq!(kept.hint(), Some("custom"));
    }

    #[test]
    fn error_json_has_kind_message_hint_and_causes() {
        let err = Error::new(ErrorKind::Io)
            .with_message("failed to write output")
            .with_hint("check stdout")
            .with_source(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        let value = error_json(&err);
        let inner = value.get("error").expect("error object");
        assert_eq!(inner["kind"], "Io");
        assert_eq!(inner["message"], "failed to write output");
        assert_eq!(inner["hint"], "check stdout");
        assert_eq!(inner["causes"][0], "pipe closed");
    }

    #[test]
    fn error_json_falls_back_to_kind_message() {
        let value = error_json(&Error::new(ErrorKind::Usage));
        assert_eq!(value["error"]["message"], "usage error");
        assert!(value["error"].get("hint").is_none());
        assert!(value["error"].get("causes").is_none());
    }

    #[test]
    fn error_text_plain_has_no_ansi() {
        let err = Error::new(ErrorKind::Usage)
            .with_message("bad input")
            .with_hint("Try `joinery --help`.");
        let text = error_text(&err, false);
        assert_eq!(text, "error: bad input\nhint: Try `joinery --help`.");
    }

    #[test]
    fn error_text_colored_wraps_labels() {
        let err = Error::new(ErrorKind::Internal).with_message("boom");
        let text = error_text(&err, true);
        assert!(text.starts_with("\u{1b}[31merror:\u{1b}[0m boom"));
    }
}
