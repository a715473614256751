use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use crate::{
    evaluator::Evaluator,
    object::{environment::Environment, Object},
    parse, lex,
    parser::ParserError,
    run, WestError,
};

const PROMPT: &str = ">> ";

/// Interactive loop: one line per program, bindings kept across lines.
/// Returns when `input` reaches end of file.
pub fn start<I: BufRead, O: Write>(
    mut input: I,
    output: &mut O,
    evaluator: &Evaluator,
) -> io::Result<()> {
    let env = Environment::new();
    tracing::info!("repl started");

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let mut buf = String::new();
        if input.read_line(&mut buf)? == 0 {
            break;
        }

        let (program, errors) = parse(lex(buf.trim_end()));
        if !errors.is_empty() {
            print_parser_errors(output, &errors)?;
            continue;
        }

        if let Some(result) = evaluator.eval(&program, &env) {
            print_result(output, &result)?;
        }
    }

    tracing::info!("repl finished");
    Ok(())
}

/// Runs a whole file in one fresh environment and prints its final value.
pub fn run_file<O: Write>(
    path: &Path,
    output: &mut O,
    evaluator: &Evaluator,
) -> Result<(), WestError> {
    let source = fs::read_to_string(path)?;
    tracing::info!(path = %path.display(), bytes = source.len(), "running file");

    let env = Environment::new();
    if let Some(result) = run(&source, evaluator, &env)? {
        print_result(output, &result)?;
    }

    Ok(())
}

pub fn print_parser_errors<O: Write>(output: &mut O, errors: &[ParserError]) -> io::Result<()> {
    for error in errors {
        writeln!(output, "\t{}", error)?;
    }
    Ok(())
}

fn print_result<O: Write>(output: &mut O, result: &Object) -> io::Result<()> {
    if matches!(result, Object::Void) {
        return Ok(());
    }
    writeln!(output, "{}", result.inspect())
}
