//! REPL and file runner

use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
};

use colored::Colorize;

use base::ln::LineTable;
use monkey::{
    compile,
    eval::{self, env::Environment, expand},
    syntax::parse,
    vm::Vm,
};

const PROMPT: &str = ">> ";

enum Engine {
    Eval,
    Vm,
}

fn main() -> ExitCode {
    env_logger::init();

    let mut engine = Engine::Eval;
    let mut path = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--vm" => engine = Engine::Vm,
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            arg if arg.starts_with('-') => {
                eprintln!("unknown option: {}", arg);
                print_usage();
                return ExitCode::FAILURE;
            }
            arg => path = Some(arg.to_string()),
        }
    }

    match path {
        Some(path) => run_file(&path, engine),
        None => repl(engine),
    }
}

fn print_usage() {
    eprintln!("usage: monkey [--vm] [FILE]");
    eprintln!("  --vm    run on the bytecode VM instead of the evaluator");
}

fn run_file(path: &str, engine: Engine) -> ExitCode {
    let src = match std::fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("{}: {}: {}", "error".red().bold(), path, err);
            return ExitCode::FAILURE;
        }
    };

    let (program, errors) = parse::parse(&src);
    if !errors.is_empty() {
        let table = LineTable::new(&src);
        for err in &errors {
            let pos = table.line_column(err.span.start);
            eprintln!("{}:{}: {}: {}", path, pos, "parse error".red().bold(), err);
        }
        return ExitCode::FAILURE;
    }

    // macros expand before either backend sees the program
    let mut program = program;
    let macro_env = Environment::shared();
    expand::define_macros(&mut program, &macro_env);
    let program = match expand::expand_macros(program, &macro_env) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}: {}", "macro expansion failed".red().bold(), err);
            return ExitCode::FAILURE;
        }
    };

    match engine {
        Engine::Vm => {
            let chunk = match compile::compile(&program) {
                Ok(chunk) => chunk,
                Err(err) => {
                    eprintln!("{}: {}", "compilation failed".red().bold(), err);
                    return ExitCode::FAILURE;
                }
            };
            let mut vm = Vm::new(chunk);
            if let Err(err) = vm.run() {
                eprintln!("{}: {}", "bytecode execution failed".red().bold(), err);
                return ExitCode::FAILURE;
            }
            println!("{}", vm.last_popped());
        }
        Engine::Eval => {
            let env = Environment::shared();
            let out = eval::eval_program(&program, &env);
            if out.is_error() {
                eprintln!("{}", out.to_string().red());
                return ExitCode::FAILURE;
            }
            println!("{}", out);
        }
    }

    ExitCode::SUCCESS
}

/// Line-at-a-time REPL. Definitions and macros persist across lines; parse
/// or runtime errors report and keep the session going.
fn repl(engine: Engine) -> ExitCode {
    let env = Environment::shared();
    let macro_env = Environment::shared();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", PROMPT);
        if stdout.flush().is_err() {
            return ExitCode::FAILURE;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return ExitCode::SUCCESS,
            Ok(_) => {}
            Err(err) => {
                eprintln!("{}: {}", "error".red().bold(), err);
                return ExitCode::FAILURE;
            }
        }

        let (program, errors) = parse::parse(&line);
        if !errors.is_empty() {
            let table = LineTable::new(&line);
            for err in &errors {
                let pos = table.line_column(err.span.start);
                eprintln!("{} at {}: {}", "parse error".red().bold(), pos, err);
            }
            continue;
        }

        // the macro registry persists across lines on both engines
        let mut program = program;
        expand::define_macros(&mut program, &macro_env);
        let program = match expand::expand_macros(program, &macro_env) {
            Ok(program) => program,
            Err(err) => {
                eprintln!("{}: {}", "macro expansion failed".red().bold(), err);
                continue;
            }
        };

        match engine {
            Engine::Vm => {
                let chunk = match compile::compile(&program) {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        eprintln!("{}: {}", "compilation failed".red().bold(), err);
                        continue;
                    }
                };
                let mut vm = Vm::new(chunk);
                if let Err(err) = vm.run() {
                    eprintln!("{}: {}", "bytecode execution failed".red().bold(), err);
                    continue;
                }
                println!("{}", vm.last_popped());
            }
            Engine::Eval => {
                let out = eval::eval_program(&program, &env);
                if out.is_error() {
                    eprintln!("{}", out.to_string().red());
                    continue;
                }
                println!("{}", out);
            }
        }
    }
}
