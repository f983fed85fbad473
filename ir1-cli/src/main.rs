//! IR1 CLI: run, check and format IR1 programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage, I/O or parse error
//! - 2: Startup error (duplicate label or function, missing entry)
//! - 3: Runtime error
//!
//! Set `IR1_LOG` (e.g. `IR1_LOG=ir1_interp=trace`) to log to stderr.

mod commands;

use std::process;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "check" => commands::check(&args[2..]),
        "fmt" => commands::fmt(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Install a stderr subscriber when `IR1_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Ok(filter) = EnvFilter::try_from_env("IR1_LOG") {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    }
}

fn print_usage() {
    eprintln!("Usage: ir1 <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.ir> [--entry NAME] [--max-depth N] [--max-heap N]");
    eprintln!("                                   Execute a program");
    eprintln!("  check <file.ir>                  Parse and index a program");
    eprintln!("  fmt <file.ir>                    Print canonical text");
}
