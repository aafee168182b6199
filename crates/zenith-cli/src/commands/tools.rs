// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tool commands: explain.

use colored::Colorize;
use std::process;

use zenith_diagnostics::codes::ErrorCodeRegistry;

use crate::output;

pub fn cmd_explain(code: Option<&str>) {
    let registry = ErrorCodeRegistry::default();

    let Some(code) = code else {
        let mut all: Vec<_> = registry.all().collect();
        all.sort_by_key(|info| info.code);
        for info in all {
            println!("{}  {:<8} {}", info.code.red().bold(), info.category.to_string(), info.title);
        }
        return;
    };

    let code = code.to_uppercase();
    if let Some(info) = registry.get(&code) {
        println!(
            "{}[{}]: {}",
            "error".red().bold(),
            info.code.red().bold(),
            info.title.bold()
        );
        println!();
        println!("  Category: {}", info.category);
        println!();
        for line in info.explanation.lines() {
            println!("  {}", line);
        }
        println!();
        println!("  Run `zenith check <file>` to see this error in context.");
    } else {
        eprintln!("{}: unknown error code: {}", output::error_label(), code);
        eprintln!("Run `zenith explain` to list every code.");
        process::exit(1);
    }
}
