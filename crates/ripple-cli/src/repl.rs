//! Interactive REPL for the Ripple language
//!
//! Wraps the core interpreter with line editing, multi-line block
//! collection, and a few dot-commands for inspecting bindings.

use anyhow::Result;
use ripple_core::{Interpreter, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub fn run(mut interp: Interpreter) -> Result<()> {
    println!("Ripple v{}", ripple_core::VERSION);
    println!("Type .help for commands, .quit to exit");

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("ripple> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                if line.starts_with('.') {
                    if !handle_command(&interp, &line) {
                        break;
                    }
                    continue;
                }
                let Some(source) = collect_block(&mut rl, line)? else {
                    continue;
                };
                match interp.run(&source, "<repl>") {
                    Ok(Value::Null) => {}
                    Ok(value) => println!("=> {value}"),
                    Err(err) => println!("Error: {err:#}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("(interrupted)");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    println!("Goodbye!");
    Ok(())
}

/// Reads continuation lines until every open block is closed.
fn collect_block(rl: &mut DefaultEditor, first: String) -> Result<Option<String>> {
    let mut source = first;
    source.push('\n');
    while needs_more(&source) {
        match rl.readline("   ...> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.trim());
                source.push_str(&line);
                source.push('\n');
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("(input abandoned)");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(Some(source))
}

fn needs_more(source: &str) -> bool {
    let mut depth = 0i32;
    let mut last = "";
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.split_whitespace().next().unwrap_or("") {
            "fn" | "if" | "while" => depth += 1,
            "endfn" | "endif" | "endwhile" => depth -= 1,
            _ => {}
        }
        last = trimmed;
    }
    depth > 0 || last.starts_with('@')
}

/// Handles a dot-command; returns false when the REPL should exit.
fn handle_command(interp: &Interpreter, line: &str) -> bool {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or("");
    match command {
        ".help" => {
            println!(".help           Show this help");
            println!(".lowered NAME   Show the (lowered) source of a function");
            println!(".quit           Exit the REPL");
            true
        }
        ".lowered" => {
            match parts.next().map(str::trim) {
                None | Some("") => println!("Usage: .lowered NAME"),
                Some(name) => match interp.get_global(name) {
                    Some(Value::Function(func)) => print!("{}", func.source()),
                    Some(other) => println!("{name} is a {}", other.type_name()),
                    None => println!("No binding named {name}"),
                },
            }
            true
        }
        ".quit" | ".exit" => false,
        other => {
            println!("Unknown command: {other} (try .help)");
            true
        }
    }
}
