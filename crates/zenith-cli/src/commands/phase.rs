// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Front-end phase commands: lex, parse, check.

use colored::Colorize;
use serde::Serialize;
use std::process;
use std::time::Instant;

use zenith_ast::decl::Program;
use zenith_ast::walk;
use zenith_ast::ErrorReporter;
use zenith_diagnostics::convert::from_reporter;
use zenith_diagnostics::json::{self, DiagnosticReport};

use crate::{output, read_source, show_diagnostics, Format, Options};

pub fn cmd_lex(path: &str, opts: Options) {
    let source = read_source(path);

    let start = Instant::now();
    let result = zenith_lexer::Lexer::new(&source).tokenize(path);
    if opts.verbose {
        output::verbose(&format!(
            "lexed {} tokens in {:.2?}",
            result.tokens.len(),
            start.elapsed()
        ));
    }

    let diags = from_reporter(&result.reporter);
    if opts.format == Format::Json {
        show_diagnostics(&diags, &source, path, "lex", opts.format);
        exit_on_errors(&result.reporter);
        return;
    }

    if !diags.is_empty() {
        show_diagnostics(&diags, &source, path, "lex", opts.format);
    }

    if result.is_ok() {
        println!("{}\n", output::section(&format!("Tokens ({})", result.tokens.len())));
        for tok in &result.tokens {
            let span = tok.span();
            if opts.tokens {
                println!(
                    "{:4}:{:<3} {:?} {}",
                    span.start,
                    span.end,
                    tok.kind,
                    format!("trivia {}..{}", tok.leading_trivia.start, tok.leading_trivia.end).dimmed()
                );
            } else {
                println!("{:4}:{:<3} {:?}", span.start, span.end, tok.kind);
            }
        }
        println!("\n{}", output::banner_ok(&format!("Lex: {} tokens", result.tokens.len())));
    } else {
        eprintln!("\n{}", output::banner_fail("Lex", result.reporter.error_count()));
        process::exit(1);
    }
}

/// Parse output in JSON mode.
#[derive(Serialize)]
struct ParseOutput<'a> {
    ast: &'a Program,
    report: DiagnosticReport,
}

pub fn cmd_parse(path: &str, opts: Options) {
    let source = read_source(path);

    let start = Instant::now();
    let result = zenith_parser::parse(&source, path);
    if opts.verbose {
        report_progress(&result.program, &result.reporter, start);
    }

    let diags = from_reporter(&result.reporter);
    if opts.format == Format::Json {
        let out = ParseOutput {
            ast: &result.program,
            report: json::to_json_report(&diags, &source, path, "parse"),
        };
        match serde_json::to_string_pretty(&out) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("{}: serializing syntax tree: {}", output::error_label(), e);
                process::exit(1);
            }
        }
        exit_on_errors(&result.reporter);
        return;
    }

    if !diags.is_empty() {
        show_diagnostics(&diags, &source, path, "parse", opts.format);
    }
    if result.reporter.had_errors() {
        eprintln!("\n{}", output::banner_fail("Parse", result.reporter.error_count()));
        process::exit(1);
    }

    println!(
        "{}\n",
        output::section(&format!("AST ({} declarations)", result.program.decls.len()))
    );
    for (i, decl) in result.program.decls.iter().enumerate() {
        println!("--- Declaration {} ---", i + 1);
        println!("{:#?}", decl);
        println!();
    }
    println!("{}", output::banner_ok("Parse"));
}

pub fn cmd_check(path: &str, opts: Options) {
    let source = read_source(path);

    let start = Instant::now();
    let result = zenith_parser::parse(&source, path);
    if opts.verbose {
        report_progress(&result.program, &result.reporter, start);
    }

    let diags = from_reporter(&result.reporter);
    if opts.format == Format::Json {
        show_diagnostics(&diags, &source, path, "parse", opts.format);
        exit_on_errors(&result.reporter);
        return;
    }

    if !diags.is_empty() {
        show_diagnostics(&diags, &source, path, "parse", opts.format);
    }
    if result.reporter.had_errors() {
        eprintln!("\n{}", output::banner_fail("Check", result.reporter.error_count()));
        process::exit(1);
    }
    println!("{}", output::banner_ok("Check"));
}

fn report_progress(program: &Program, reporter: &ErrorReporter, start: Instant) {
    output::verbose(&format!(
        "parsed {} declarations ({} nodes, {} error nodes) in {:.2?}",
        program.decls.len(),
        walk::node_count(program),
        walk::error_nodes(program).len(),
        start.elapsed()
    ));
    output::verbose(&format!(
        "{} errors, {} warnings",
        reporter.error_count(),
        reporter.warning_count()
    ));
}

fn exit_on_errors(reporter: &ErrorReporter) {
    if reporter.had_errors() {
        process::exit(1);
    }
}
