use std::collections::HashMap;

use crate::evaluator::EvaluatorError;

use super::{output::Output, Object, ObjectType, NULL};

pub type BuiltinFunction = fn(&[Object], &Output) -> Result<Object, EvaluatorError>;

/// Host functions visible to programs by name. Built once and never mutated
/// while an evaluator holds it.
#[derive(Clone)]
pub struct Builtins {
    table: HashMap<&'static str, BuiltinFunction>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

impl Builtins {
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn standard() -> Self {
        Self::empty()
            .register("len", LEN)
            .register("print", PRINT)
            .register("println", PRINTLN)
            .register("first", FIRST)
            .register("last", LAST)
            .register("pop", POP)
            .register("push", PUSH)
    }

    pub fn register(mut self, name: &'static str, function: BuiltinFunction) -> Self {
        self.table.insert(name, function);
        self
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.table
            .get_key_value(name)
            .map(|(name, function)| Object::Builtin {
                name: *name,
                function: *function,
            })
    }
}

fn check_arity(args: &[Object], want: usize) -> Result<(), EvaluatorError> {
    if args.len() != want {
        return Err(EvaluatorError::WrongNumberOfArguments {
            got: args.len(),
            want,
        });
    }
    Ok(())
}

fn array_arg<'a>(name: &str, arg: &'a Object) -> Result<&'a [Object], EvaluatorError> {
    match arg {
        Object::Array(elements) => Ok(elements),
        other => Err(EvaluatorError::ArgumentMustBe {
            name: name.into(),
            expected: ObjectType::Array,
            got: other.object_type(),
        }),
    }
}

fn concat_inspected(args: &[Object]) -> String {
    args.iter().map(Object::inspect).collect()
}

fn output_error(err: std::io::Error) -> EvaluatorError {
    EvaluatorError::Output(err.to_string())
}

const LEN: BuiltinFunction = |args, _| {
    check_arity(args, 1)?;

    match &args[0] {
        Object::Str(s) => Ok(Object::Integer(s.len() as i64)),
        Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
        other => Err(EvaluatorError::ArgumentNotSupported {
            name: "len".into(),
            got: other.object_type(),
        }),
    }
};

// Literal `\r` and `\n` sequences in the assembled text become real control
// characters.
const PRINT: BuiltinFunction = |args, output| {
    let text = concat_inspected(args)
        .replace("\\r", "\r")
        .replace("\\n", "\n");
    output.print(&text).map_err(output_error)?;
    Ok(Object::Void)
};

const PRINTLN: BuiltinFunction = |args, output| {
    output
        .println(&concat_inspected(args))
        .map_err(output_error)?;
    Ok(Object::Void)
};

const FIRST: BuiltinFunction = |args, _| {
    check_arity(args, 1)?;
    let elements = array_arg("first", &args[0])?;
    Ok(elements.first().cloned().unwrap_or(NULL))
};

const LAST: BuiltinFunction = |args, _| {
    check_arity(args, 1)?;
    let elements = array_arg("last", &args[0])?;
    Ok(elements.last().cloned().unwrap_or(NULL))
};

// Returns everything but the first element, and reports itself as `rest`.
// Existing programs depend on both, so they stay despite the name.
const POP: BuiltinFunction = |args, _| {
    check_arity(args, 1)?;
    let elements = array_arg("rest", &args[0])?;
    match elements.split_first() {
        Some((_, rest)) => Ok(Object::Array(rest.to_vec())),
        None => Ok(NULL),
    }
};

const PUSH: BuiltinFunction = |args, _| {
    check_arity(args, 2)?;
    let elements = array_arg("push", &args[0])?;
    let mut pushed = elements.to_vec();
    pushed.push(args[1].clone());
    Ok(Object::Array(pushed))
};

#[cfg(test)]
mod test_builtin {
    use super::*;
    use crate::object::TRUE;

    fn call(name: &str, args: &[Object]) -> Result<Object, EvaluatorError> {
        let output = Output::buffer();
        match Builtins::standard().get(name) {
            Some(Object::Builtin { function, .. }) => function(args, &output),
            other => panic!("no builtin {}: {:?}", name, other),
        }
    }

    fn ints(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    #[test]
    fn test_standard_names() {
        let standard = Builtins::standard();
        for name in ["first", "last", "len", "pop", "print", "println", "push"] {
            match standard.get(name) {
                Some(Object::Builtin { name: found, .. }) => assert_eq!(found, name),
                other => panic!("no builtin {}: {:?}", name, other),
            }
        }
        assert!(standard.get("rest").is_none());
        assert!(Builtins::empty().get("len").is_none());
    }

    #[test]
    fn test_len() {
        assert_eq!(call("len", &[Object::Str("four".into())]), Ok(Object::Integer(4)));
        assert_eq!(call("len", &[ints(&[1, 2, 3])]), Ok(Object::Integer(3)));
        assert_eq!(
            call("len", &[Object::Integer(1)]).unwrap_err().to_string(),
            "argument to `len` not supported, got INTEGER"
        );
        assert_eq!(
            call("len", &[]).unwrap_err().to_string(),
            "wrong number of arguments. got=0, want=1"
        );
    }

    #[test]
    fn test_array_builtins() {
        assert_eq!(call("first", &[ints(&[1, 2, 3])]), Ok(Object::Integer(1)));
        assert_eq!(call("first", &[ints(&[])]), Ok(NULL));
        assert_eq!(call("last", &[ints(&[1, 2, 3])]), Ok(Object::Integer(3)));
        assert_eq!(call("last", &[ints(&[])]), Ok(NULL));
        assert_eq!(call("pop", &[ints(&[1, 2, 3])]), Ok(ints(&[2, 3])));
        assert_eq!(call("pop", &[ints(&[1])]), Ok(ints(&[])));
        assert_eq!(call("pop", &[ints(&[])]), Ok(NULL));
        assert_eq!(
            call("push", &[ints(&[1]), Object::Integer(2)]),
            Ok(ints(&[1, 2]))
        );
    }

    #[test]
    fn test_array_builtins_reject_non_arrays() {
        for (name, reported) in [("first", "first"), ("last", "last"), ("pop", "rest")] {
            assert_eq!(
                call(name, &[Object::Integer(1)]).unwrap_err().to_string(),
                format!("argument to `{}` must be ARRAY, got INTEGER", reported)
            );
        }
        assert_eq!(
            call("push", &[Object::Str("a".into()), Object::Integer(1)])
                .unwrap_err()
                .to_string(),
            "argument to `push` must be ARRAY, got STRING"
        );
        assert_eq!(
            call("push", &[ints(&[])]).unwrap_err().to_string(),
            "wrong number of arguments. got=1, want=2"
        );
    }

    #[test]
    fn test_single_argument_arity() {
        let tests = [
            ("first", vec![], "wrong number of arguments. got=0, want=1"),
            ("first", vec![ints(&[1]), ints(&[2])], "wrong number of arguments. got=2, want=1"),
            ("last", vec![], "wrong number of arguments. got=0, want=1"),
            ("last", vec![ints(&[1]), Object::Integer(2)], "wrong number of arguments. got=2, want=1"),
            ("pop", vec![], "wrong number of arguments. got=0, want=1"),
            ("pop", vec![ints(&[1]), ints(&[1])], "wrong number of arguments. got=2, want=1"),
            ("len", vec![ints(&[1]), ints(&[1])], "wrong number of arguments. got=2, want=1"),
            ("push", vec![], "wrong number of arguments. got=0, want=2"),
        ];

        for (name, args, expected) in tests {
            assert_eq!(
                call(name, &args).unwrap_err().to_string(),
                expected,
                "{}({} args)",
                name,
                args.len()
            );
        }
    }

    #[test]
    fn test_print_unescapes_and_println_appends_newline() {
        let output = Output::buffer();
        let builtins = Builtins::standard();

        let Some(Object::Builtin { function: print, .. }) = builtins.get("print") else {
            panic!("print missing");
        };
        let Some(Object::Builtin { function: println, .. }) = builtins.get("println") else {
            panic!("println missing");
        };

        let result = print(
            &[Object::Str(r"a\nb".into()), Object::Integer(1), Object::Str(r"\r".into())],
            &output,
        );
        assert_eq!(result, Ok(Object::Void));
        assert_eq!(output.contents(), "a\nb1\r");

        output.clear();
        println(&[Object::Str(r"x\n".into()), TRUE], &output).unwrap();
        assert_eq!(output.contents(), "x\\ntrue\n");
    }
}
