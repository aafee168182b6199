// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Zenith CLI - lexer and parser driver.

mod commands;
mod help;
mod output;

use std::env;
use std::fs;
use std::process;
use std::thread;

use zenith_diagnostics::{formatter::DiagnosticFormatter, json, Diagnostic};

/// How diagnostics are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

/// Options shared by every file command.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub format: Format,
    pub verbose: bool,
    pub tokens: bool,
}

/// The parser recurses once per nesting level; debug builds need room.
const STACK_SIZE: usize = 32 * 1024 * 1024;

fn main() {
    output::init();

    let worker = thread::Builder::new()
        .name("zenith".to_string())
        .stack_size(STACK_SIZE)
        .spawn(run);
    match worker {
        Ok(handle) => {
            if handle.join().is_err() {
                process::exit(101);
            }
        }
        Err(e) => {
            eprintln!("{}: cannot start worker thread: {}", output::error_label(), e);
            process::exit(1);
        }
    }
}

fn run() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        help::print_usage();
        return;
    }

    let (opts, positional) = parse_options(&args[2..]);

    match args[1].as_str() {
        "lex" => commands::phase::cmd_lex(require_file("lex", &positional), opts),
        "parse" => commands::phase::cmd_parse(require_file("parse", &positional), opts),
        "check" => commands::phase::cmd_check(require_file("check", &positional), opts),
        "explain" => commands::tools::cmd_explain(positional.first().map(String::as_str)),
        "help" | "--help" | "-h" => match positional.first() {
            Some(cmd) => {
                if !help::print_command_help(cmd) {
                    eprintln!("{}: unknown command: {}", output::error_label(), cmd);
                    process::exit(1);
                }
            }
            None => help::print_usage(),
        },
        "version" | "--version" | "-V" => {
            println!("zenith {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            // Treat as filename
            if other.ends_with(".zn") {
                let (opts, _) = parse_options(&args[1..]);
                commands::phase::cmd_check(other, opts);
            } else {
                eprintln!("{}: unknown command: {}", output::error_label(), other);
                help::print_usage();
                process::exit(1);
            }
        }
    }
}

/// Split flags from positional arguments. Exits on a malformed flag.
fn parse_options(args: &[String]) -> (Options, Vec<String>) {
    let mut opts = Options {
        format: Format::Human,
        verbose: env::var("ZENITH_VERBOSE").map(|v| v != "0").unwrap_or(false),
        tokens: false,
    };
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--format" => {
                let value = iter.next().map(String::as_str).unwrap_or("");
                opts.format = parse_format(value);
            }
            "--json" => opts.format = Format::Json,
            "--no-color" => output::disable_color(),
            "--verbose" | "-v" => opts.verbose = true,
            "--tokens" => opts.tokens = true,
            other if other.starts_with("--format=") => {
                opts.format = parse_format(&other["--format=".len()..]);
            }
            other if other.starts_with("--") => {
                eprintln!("{}: unknown option: {}", output::error_label(), other);
                process::exit(1);
            }
            other => positional.push(other.to_string()),
        }
    }

    (opts, positional)
}

fn parse_format(value: &str) -> Format {
    match value {
        "human" => Format::Human,
        "json" => Format::Json,
        other => {
            eprintln!(
                "{}: unknown format '{}' (expected 'human' or 'json')",
                output::error_label(),
                other
            );
            process::exit(1);
        }
    }
}

fn require_file<'a>(cmd: &str, positional: &'a [String]) -> &'a str {
    match positional.first() {
        Some(path) => path.as_str(),
        None => {
            eprintln!("Usage: zenith {} <file.zn>", cmd);
            process::exit(1);
        }
    }
}

/// Read a source file, exiting with status 1 if it cannot be read.
pub fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: reading {}: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    }
}

/// Write diagnostics in the requested format.
///
/// Human output goes to stderr; JSON goes to stdout so it can be piped.
pub fn show_diagnostics(diags: &[Diagnostic], source: &str, path: &str, phase: &str, format: Format) {
    match format {
        Format::Human => {
            let formatter = DiagnosticFormatter::new(source).with_file_name(path);
            for diag in diags {
                eprintln!("{}", formatter.format(diag));
            }
        }
        Format::Json => {
            let report = json::to_json_report(diags, source, path, phase);
            println!("{}", json::to_json_string(&report));
        }
    }
}
