//! lispet - interactive interpreter and script runner
//!
//! # Usage
//!
//! ```bash
//! # Interactive REPL
//! lispet
//!
//! # Run a source file
//! lispet program.lispet
//!
//! # Evaluate a single expression
//! lispet -e "(+ 1 2)"
//!
//! # Trace every evaluation step to stderr
//! lispet -t program.lispet
//! ```

use std::env;
use std::fs;
use std::process;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use lispet::{Interpreter, set_trace_hook};

fn print_usage() {
    eprintln!("lispet - a minimal Lisp interpreter");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  lispet                 Start the interactive REPL");
    eprintln!("  lispet <file>          Evaluate a source file");
    eprintln!("  lispet -e <expr>       Evaluate an expression and print the result");
    eprintln!("  lispet -t [...]        Trace every evaluated form to stderr");
    eprintln!("  lispet --help          Show this help");
    eprintln!("  lispet --version       Show version");
}

fn print_version() {
    eprintln!("lispet {}", env!("CARGO_PKG_VERSION"));
}

fn repl(interp: &mut Interpreter) -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;

    println!("lispet {}", env!("CARGO_PKG_VERSION"));
    println!("Type expressions to evaluate, or (exit) to quit");
    println!();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input == "(exit)" || input == "exit" {
                    break;
                }
                let _ = editor.add_history_entry(input);

                match interp.eval_top_level(input) {
                    Ok(result) => println!("{result}"),
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn run_file(interp: &mut Interpreter, filename: &str) -> Result<(), String> {
    let contents =
        fs::read_to_string(filename).map_err(|e| format!("failed to read '{filename}': {e}"))?;
    let result = interp
        .eval_top_level(&contents)
        .map_err(|e| e.to_string())?;
    println!("{result}");
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut trace = false;
    let mut expr: Option<String> = None;
    let mut file: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--version" | "-V" => {
                print_version();
                return;
            }
            "--trace" | "-t" => trace = true,
            "--eval" | "-e" => match iter.next() {
                Some(text) => expr = Some(text.clone()),
                None => {
                    eprintln!("Error: -e requires an expression");
                    process::exit(1);
                }
            },
            other if other.starts_with('-') => {
                eprintln!("Error: unknown option: {other}");
                print_usage();
                process::exit(1);
            }
            other => file = Some(other.to_string()),
        }
    }

    if trace {
        set_trace_hook(Some(Box::new(|form, _env| {
            eprintln!("trace: {form}");
        })));
    }

    let mut interp = match Interpreter::new() {
        Ok(interp) => interp,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let outcome = match (expr, file) {
        (Some(text), _) => interp
            .eval_top_level(&text)
            .map(|result| println!("{result}"))
            .map_err(|e| e.to_string()),
        (None, Some(path)) => run_file(&mut interp, &path),
        (None, None) => repl(&mut interp).map_err(|e| e.to_string()),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
