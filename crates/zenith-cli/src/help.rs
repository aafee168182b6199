// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text for CLI commands.

use colored::Colorize;
use crate::output;

pub fn print_usage() {
    println!(
        "{} {} - front-end for the Zenith language",
        output::title("Zenith"),
        output::version(env!("CARGO_PKG_VERSION"))
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("zenith"),
        output::arg("<command>"),
        output::arg("[args]")
    );
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {} {}       Tokenize a file and print tokens", output::command("lex"), output::arg("<file>"));
    println!("  {} {}     Parse a file and print the AST", output::command("parse"), output::arg("<file>"));
    println!("  {} {}     Report diagnostics only", output::command("check"), output::arg("<file>"));
    println!("  {} {}   Explain an error code", output::command("explain"), output::arg("<code>"));
    println!("  {} {}      Show help for a command", output::command("help"), output::arg("[cmd]"));
    println!("  {}          Show version", output::command("version"));

    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {}  Diagnostic output format (default: human)", output::arg("--format human|json"));
    println!("  {}          Disable colored output", output::arg("--no-color"));
    println!("  {}           Print phase progress to stderr", output::arg("--verbose"));
    println!("  {}            lex: show whitespace and comment ranges", output::arg("--tokens"));
}

/// Help for a single command. Returns false for unknown commands.
pub fn print_command_help(cmd: &str) -> bool {
    let (summary, usage, details): (&str, &str, &[&str]) = match cmd {
        "lex" => (
            "Tokenize a file and print one token per line.",
            "<file.zn> [--tokens] [--format human|json]",
            &["With --tokens, each token also shows the byte range of the",
              "whitespace and comments skipped before it."],
        ),
        "parse" => (
            "Parse a file and print the syntax tree.",
            "<file.zn> [--format human|json]",
            &["In JSON mode the output is an object with the tree under \"ast\"",
              "and the diagnostic report under \"report\"."],
        ),
        "check" => (
            "Lex and parse a file, printing only diagnostics.",
            "<file.zn> [--format human|json]",
            &["Exits with status 1 when any error is reported."],
        ),
        "explain" => (
            "Show the title, category and explanation of an error code.",
            "[code]",
            &["Without a code, lists every known code."],
        ),
        _ => return false,
    };

    println!("{}", output::section_header(&capitalize(cmd)));
    println!();
    println!("{}", summary);
    println!();
    println!("{}: {} {} {}", "Usage".yellow(),
        output::command("zenith"),
        output::command(cmd),
        output::arg(usage));
    println!();
    for line in details {
        println!("{}", line);
    }
    true
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
