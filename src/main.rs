use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use west::{evaluator::Evaluator, repl, WestError};

/// Interpreter for the west language. Runs a source file, or starts a REPL
/// when no file is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Start the interactive REPL even if a file is given.
    #[arg(short = 'd', long = "repl")]
    repl: bool,

    /// Source file to run.
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    west::init_tracing();
    let args = Args::parse();
    let evaluator = Evaluator::new();
    let mut stdout = io::stdout();

    match args.file {
        Some(path) if !args.repl => match repl::run_file(&path, &mut stdout, &evaluator) {
            Ok(()) => ExitCode::SUCCESS,
            Err(WestError::Parse(errors)) => {
                let mut stderr = io::stderr();
                let _ = writeln!(stderr, "Parser errors:");
                let _ = repl::print_parser_errors(&mut stderr, &errors);
                ExitCode::FAILURE
            }
            Err(WestError::Io(err)) => {
                eprintln!("Error: could not run {}: {}", path.display(), err);
                ExitCode::FAILURE
            }
        },
        _ => {
            let stdin = io::stdin();
            match repl::start(stdin.lock(), &mut stdout, &evaluator) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
