//! # west
//!
//! A tree-walking interpreter for a small Monkey-style language: integers,
//! booleans, strings, arrays, first-class functions with closures, `let`
//! bindings, conditionals and a handful of built-ins.
//!
//! Source text flows through [`lexer::Lexer`], [`parser::Parser`] and
//! [`evaluator::Evaluator`]:
//!
//! ```
//! use west::{evaluator::Evaluator, object::environment::Environment, run};
//!
//! let evaluator = Evaluator::new();
//! let env = Environment::new();
//! let result = run("let double = fn(x) { x * 2 }; double(21)", &evaluator, &env).unwrap();
//! assert_eq!(result.unwrap().inspect(), "42");
//! ```
//!
//! Evaluation is plain recursion, so stack depth follows AST nesting depth.
//! There is no step limit or timeout; hosts running untrusted input must
//! enforce their own.

use std::sync::Once;

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod token;

use crate::{
    ast::Program,
    evaluator::Evaluator,
    lexer::Lexer,
    object::{environment::MutEnv, Object},
    parser::{Parser, ParserError},
};

#[derive(Debug, thiserror::Error)]
pub enum WestError {
    #[error("{} parser error(s)", .0.len())]
    Parse(Vec<ParserError>),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn lex(source: &str) -> Lexer {
    Lexer::new(source)
}

/// Parses everything the lexer yields. A non-empty error list means the
/// program is partial and must not be evaluated.
pub fn parse(lexer: Lexer) -> (Program, Vec<ParserError>) {
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();
    (program, parser.into_errors())
}

/// Lex, parse and evaluate `source` in `env`, refusing to evaluate when
/// parsing reported errors.
pub fn run(source: &str, evaluator: &Evaluator, env: &MutEnv) -> Result<Option<Object>, WestError> {
    let (program, errors) = parse(lex(source));
    if !errors.is_empty() {
        return Err(WestError::Parse(errors));
    }

    Ok(evaluator.eval(&program, env))
}

static TRACING_INIT: Once = Once::new();

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
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
    });
}
