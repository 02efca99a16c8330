//! Monkey interpreter CLI
//!
//! `monkey FILE` runs a whole source file once and prints the result;
//! `monkey` with no file starts the interactive REPL.

use clap::Parser;
use monkey::Error;
use monkey::builtinops::get_builtin_ops;
use monkey::object::Object;
use monkey::session::Session;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs;
use std::panic;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "monkey")]
#[command(version)]
#[command(about = "Tree-walking interpreter for the Monkey language", long_about = None)]
struct Cli {
    /// Source file to run; starts the REPL when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Do not print the REPL banner
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let quiet = cli.quiet;
    let code = match cli.file {
        Some(path) => guarded("run", || run_file(&path)),
        None => guarded("REPL", || {
            run_repl(quiet);
            0
        }),
    };
    process::exit(code);
}

/// Run `task`, turning an interpreter panic into a message and exit code 1
fn guarded(what: &str, task: impl FnOnce() -> i32 + panic::UnwindSafe) -> i32 {
    panic::catch_unwind(task).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        eprintln!("monkey: {what} aborted: {reason}");
        1
    })
}

/// Evaluate a whole file; returns the process exit code
fn run_file(path: &PathBuf) -> i32 {
    let result = fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("failed to read {}: {e}", path.display())))
        .and_then(|source| Session::new().eval_source(&source));

    match result {
        Ok(value @ Object::Error(_)) => {
            eprintln!("{value}");
            1
        }
        Ok(value) => {
            println!("{value}");
            0
        }
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

fn run_repl(quiet: bool) {
    if !quiet {
        println!("Monkey programming language");
        println!("Enter expressions like: let add = fn(a, b) {{ a + b }}; add(1, 2)");
        println!("Type :help for more commands, or Ctrl+C to exit.");
        println!();
    }

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Could not initialize REPL: {err}");
            process::exit(1);
        }
    };
    let mut session = Session::new();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&session);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                match session.eval_source(line) {
                    Ok(result) => println!("{result}"),
                    Err(e) => println!("{e}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("Monkey REPL commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Language:");
    println!("  Values: 42, true, \"text\", [1, 2], {{\"key\": 1}}");
    println!("  Bindings: let x = 5;");
    println!("  Functions: let add = fn(a, b) {{ a + b }}; add(1, 2)");
    println!("  Conditionals: if (x > 1) {{ \"big\" }} else {{ \"small\" }}");
    println!("  Macros: let unless = macro(c, t, f) {{ quote(if (!(unquote(c))) {{ unquote(t) }} else {{ unquote(f) }}) }};");
    println!();
    println!("Every line is evaluated in the same session, so bindings and macros persist.");
    println!();
}

fn print_environment(session: &Session) {
    let builtins: Vec<&str> = get_builtin_ops().iter().map(|op| op.name).collect();
    println!("Built-in functions ({}):", builtins.len());
    println!("  {}", builtins.join("  "));
    println!();

    let macros = session.macro_names();
    if !macros.is_empty() {
        println!("Macros ({}):", macros.len());
        println!("  {}", macros.join("  "));
        println!();
    }

    let bindings = session.env().borrow().bindings();
    if bindings.is_empty() {
        println!("No user-defined values.");
        return;
    }

    println!("User-defined values ({}):", bindings.len());
    for (name, value) in bindings {
        println!("  {name} = {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_exit_codes() {
        assert_eq!(guarded("run", || 0), 0);
        assert_eq!(guarded("run", || 1), 1);
        assert_eq!(guarded("run", || panic!("interpreter bug")), 1);
        assert_eq!(guarded("run", || panic!("{} bug", "formatted")), 1);
    }
}
