use std::{io::Write, rc::Rc};

use pretty_assertions::assert_eq;
use west::{
    evaluator::Evaluator,
    lex,
    object::{environment::Environment, output::Output, Object},
    parse, repl, run,
    token::TokenKind,
    WestError,
};

fn evaluator() -> (Evaluator, Rc<Output>) {
    let output = Rc::new(Output::buffer());
    (Evaluator::with_output(output.clone()), output)
}

fn inspect(source: &str) -> String {
    let (evaluator, _) = evaluator();
    run(source, &evaluator, &Environment::new())
        .expect("program should parse")
        .map(|object| object.inspect())
        .unwrap_or_default()
}

#[test]
fn canonical_rendering() {
    let tests = [
        ("a + b * c", "(a + (b * c))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        ("!-a == b", "((!(-a)) == b)"),
        ("let f = fn(x, y) { x }", "let f = fn(x, y) x;"),
    ];

    for (source, expected) in tests {
        let (program, errors) = parse(lex(source));
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(program.to_string(), expected);
    }
}

#[test]
fn arithmetic_and_conditionals() {
    assert_eq!(inspect("5 + 5 + 5 + 5 - 10"), "10");
    assert_eq!(inspect("50 / 2 * 2 + 10"), "60");
    assert_eq!(inspect("if (1) { 10 }"), "10");
    assert_eq!(inspect("if (false) { 10 }"), "null");
}

#[test]
fn runtime_errors_are_values() {
    assert_eq!(inspect("5 + true;"), "ERROR: type mismatch: INTEGER + BOOLEAN");
    assert_eq!(inspect("true + false;"), "ERROR: unknown operator: BOOLEAN + BOOLEAN");
}

#[test]
fn closures_keep_their_scope() {
    let source = "
        let newAdder = fn(x) { fn(y) { x + y } };
        let addTwo = newAdder(2);
        addTwo(2);";
    assert_eq!(inspect(source), "4");
}

#[test]
fn higher_order_functions() {
    let source = "
        let map = fn(arr, f) {
            let iter = fn(arr, acc) {
                if (len(arr) == 0) { acc } else { iter(pop(arr), push(acc, f(first(arr)))) }
            };
            iter(arr, []);
        };
        map([1, 2, 3], fn(x) { x * x });";
    assert_eq!(inspect(source), "[1, 4, 9]");
}

#[test]
fn arrays_are_copy_on_write() {
    assert_eq!(inspect("let a = [1, 2]; push(a, 3); len(a);"), "2");
    assert_eq!(inspect("[1, 2, 3][5]"), "null");
}

#[test]
fn eof_is_idempotent() {
    let mut lexer = lex("1");
    assert_eq!(lexer.next_token().kind, TokenKind::Int);
    for _ in 0..3 {
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Eof);
        assert_eq!(token.literal, "");
    }
}

#[test]
fn parse_errors_block_evaluation() {
    let (evaluator, output) = evaluator();
    let result = run(r#"println("side effect"); let = 1;"#, &evaluator, &Environment::new());

    match result {
        Err(WestError::Parse(errors)) => {
            assert_eq!(errors[0].to_string(), "expected next token to be IDENT, got ASSIGN instead");
        }
        other => panic!("expected parse errors, got {:?}", other),
    }
    assert_eq!(output.contents(), "");
}

#[test]
fn print_goes_to_injected_output() {
    let (evaluator, output) = evaluator();
    let result = run(r#"print("x=", 1, "\n"); println([true, "s"])"#, &evaluator, &Environment::new())
        .unwrap();

    assert_eq!(result, Some(Object::Void));
    assert_eq!(output.contents(), "x=1\n[true, s]\n");
}

#[test]
fn run_file_prints_final_value() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "let x = 20;\nlet y = x + 1;\ny * 2\n").unwrap();

    let (evaluator, _) = evaluator();
    let mut out = Vec::new();
    repl::run_file(file.path(), &mut out, &evaluator).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "42\n");
}

#[test]
fn run_file_reports_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "let x 1;").unwrap();

    let (evaluator, _) = evaluator();
    let mut out = Vec::new();
    let err = repl::run_file(file.path(), &mut out, &evaluator).unwrap_err();

    assert!(matches!(err, WestError::Parse(ref errors) if errors.len() == 1));
    assert!(out.is_empty());
}

#[test]
fn run_file_missing_file_is_io_error() {
    let (evaluator, _) = evaluator();
    let mut out = Vec::new();
    let err = repl::run_file(
        std::path::Path::new("/definitely/not/here.west"),
        &mut out,
        &evaluator,
    )
    .unwrap_err();

    assert!(matches!(err, WestError::Io(_)));
}
