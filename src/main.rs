use log::info;
use minilisp::{Error, GlobalTable, Procedure, Value, create_global_env, eval};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use std::fs;
use std::panic;
use std::process;

const USAGE: &str = "\
Usage: minilisp [FILE]

Evaluates each non-empty line of FILE in order, printing every result.
Without FILE, starts an interactive session.

Options:
  -h, --help    Show this message

Set RUST_LOG=debug (or trace) to log evaluation steps to stderr.";

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();

    let result = panic::catch_unwind(|| match args.as_slice() {
        [] => run_repl(),
        [flag] if flag == "-h" || flag == "--help" => {
            println!("{USAGE}");
            Ok(())
        }
        [path] => run_file(path),
        _ => Err(format!("expected at most one FILE argument\n\n{USAGE}")),
    });

    match result {
        Ok(Ok(())) => {}
        Ok(Err(message)) => {
            eprintln!("Error: {message}");
            process::exit(2);
        }
        Err(panic_info) => {
            eprintln!("The interpreter encountered an unexpected error and must exit.");

            if let Some(msg) = panic_info.downcast_ref::<&str>() {
                eprintln!("Error: {msg}");
            } else if let Some(msg) = panic_info.downcast_ref::<String>() {
                eprintln!("Error: {msg}");
            } else {
                eprintln!("Error: Unknown panic occurred");
            }

            process::exit(1);
        }
    }
}

/// Evaluate one line and print its outcome. Failures never stop the caller.
fn evaluate_line(line: &str, globals: &mut GlobalTable) {
    match eval(line, globals) {
        // define and set! produce nothing to show
        Ok(result) if result.is_unspecified() => {}
        Ok(result) => println!("{result}"),
        Err(err) => report(&err),
    }
}

fn report(err: &Error) {
    if err.is_syntax_error() {
        println!("{err}");
    } else {
        println!("Error: {err}");
    }
}

fn run_file(path: &str) -> Result<(), String> {
    let source = fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let mut globals = create_global_env();
    info!("evaluating {path}");

    for line in source.lines().map(str::trim).filter(|line| !line.is_empty()) {
        evaluate_line(line, &mut globals);
    }
    Ok(())
}

fn run_repl() -> Result<(), String> {
    println!("minilisp - a minimal S-expression evaluator");
    println!("Enter expressions like: (define square (lambda (x) (* x x)))");
    println!("Type :help for more commands, or Ctrl+D to exit.");
    println!();

    let mut rl = DefaultEditor::new().map_err(|e| format!("could not initialize line editor: {e}"))?;
    let mut globals = create_global_env();
    info!("global table ready with {} bindings", globals.len());

    loop {
        match rl.readline("minilisp> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => print_help(),
                    ":env" => print_environment(&globals),
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => evaluate_line(line, &mut globals),
                }
            }

            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => return Err(format!("reading input failed: {err}")),
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show global bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C/D   - Exit the interpreter");
    println!();
    println!("Special forms:");
    println!("  (define name expr)      bind a new global name");
    println!("  (set! name expr)        overwrite the nearest existing binding");
    println!("  (if test then else)     evaluate one branch");
    println!("  (quote expr)            expr as data");
    println!("  (lambda (params) body)  make a procedure");
    println!();
    println!("Values: numbers (42, -1.5, 2e3), #t, #f, nil, lists via quote or list");
    println!("Primitives: + - * / < <= > >= = abs expt max min car cdr cons list");
    println!("            equal? not null? pi");
    println!();
    println!("Examples:");
    println!("  (define square (lambda (x) (* x x)))");
    println!("  (square 5)");
    println!("  ((lambda (x y) (+ x y)) 3 4)");
    println!("  (car (quote (1 2 3)))");
    println!();
}

fn print_environment(globals: &GlobalTable) {
    let bindings = globals.get_all_bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Global bindings ({} total):", bindings.len());
    println!();

    let mut primitives = Vec::new();
    let mut user_defined = Vec::new();

    for (name, value) in bindings {
        match value {
            Value::Procedure(Procedure::Primitive(_)) => primitives.push(name),
            _ => user_defined.push((name, value)),
        }
    }

    if !primitives.is_empty() {
        println!("Primitives ({}):", primitives.len());
        // Four columns
        for row in primitives.chunks(4) {
            let line: String = row.iter().map(|name| format!("  {name:<10}")).collect();
            println!("{}", line.trim_end());
        }
        println!();
    }

    if !user_defined.is_empty() {
        println!("Values ({}):", user_defined.len());
        for (name, value) in user_defined {
            println!("  {name} = {value}");
        }
    }
}
