//! CLI command implementations.

use std::fs;
use std::io;

use ir1_common::Program;
use ir1_interp::{Config, ProgramIndex, RuntimeError};
use tracing::debug;

/// Parse, index and execute a program. Program output goes to stdout.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: ir1 run <file.ir> [--entry NAME] [--max-depth N] [--max-heap N]");
        return Err(1);
    }

    let input = &args[0];
    let config = parse_run_flags(&args[1..])?;
    let program = read_program(input)?;
    debug!(?config, "run");

    let stdout = io::stdout();
    match ir1_interp::run_with_config(&program, config, stdout.lock()) {
        Ok(_) => Ok(()),
        Err(e) => Err(report(&e)),
    }
}

/// Parse and index a program without running it.
pub fn check(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: check requires an input file");
        eprintln!("Usage: ir1 check <file.ir>");
        return Err(1);
    }

    let input = &args[0];
    let program = read_program(input)?;
    ProgramIndex::build(&program).map_err(|e| report(&e))?;

    println!(
        "OK: {input} ({} functions, {} instructions)",
        program.funcs.len(),
        program.instruction_count()
    );
    Ok(())
}

/// Print the canonical text of a program.
pub fn fmt(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: fmt requires an input file");
        eprintln!("Usage: ir1 fmt <file.ir>");
        return Err(1);
    }

    let program = read_program(&args[0])?;
    print!("{}", ir1_parser::print(&program));
    Ok(())
}

// ---- Helpers ----

fn parse_run_flags(args: &[String]) -> Result<Config, i32> {
    let mut config = Config::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--entry" => {
                let name = flag_value(args, i, "--entry")?;
                config = config.with_entry(name);
                i += 2;
            }
            "--max-depth" => {
                let value = flag_value(args, i, "--max-depth")?;
                let limit = value.parse::<usize>().map_err(|_| {
                    eprintln!("error: invalid --max-depth value '{value}'");
                    1
                })?;
                config = config.with_max_call_depth(limit);
                i += 2;
            }
            "--max-heap" => {
                let value = flag_value(args, i, "--max-heap")?;
                let limit = value.parse::<usize>().map_err(|_| {
                    eprintln!("error: invalid --max-heap value '{value}'");
                    1
                })?;
                config = config.with_max_heap_cells(limit);
                i += 2;
            }
            other => {
                eprintln!("error: unknown argument '{other}'");
                return Err(1);
            }
        }
    }
    Ok(config)
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, i32> {
    args.get(i + 1).map(String::as_str).ok_or_else(|| {
        eprintln!("error: {flag} requires a value");
        1
    })
}

fn read_program(path: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;
    ir1_parser::parse(&text).map_err(|e| {
        eprintln!("error: {path}: {e}");
        1
    })
}

/// Print an engine error and pick its exit code.
fn report(e: &RuntimeError) -> i32 {
    if e.is_startup() {
        eprintln!("error: {e}");
        2
    } else {
        eprintln!("runtime error: {e}");
        3
    }
}
