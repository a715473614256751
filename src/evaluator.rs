use std::rc::Rc;

use crate::{
    ast::{BlockStatement, Expression, Identifier, Program, Statement},
    object::{
        builtin::Builtins,
        environment::{Environment, MutEnv},
        output::Output,
        Object, ObjectType, NULL,
    },
};

type R<T> = Result<T, EvaluatorError>;

/// Runtime failures. The `Display` text is the message programs observe
/// through `Object::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluatorError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: String,
        right: ObjectType,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator { operator: String, right: ObjectType },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: String,
        right: ObjectType,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow: {left} {operator} {right}")]
    IntegerOverflow {
        left: i64,
        operator: String,
        right: i64,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongNumberOfArguments { got: usize, want: usize },
    #[error("argument to `{name}` not supported, got {got}")]
    ArgumentNotSupported { name: String, got: ObjectType },
    #[error("argument to `{name}` must be {expected}, got {got}")]
    ArgumentMustBe {
        name: String,
        expected: ObjectType,
        got: ObjectType,
    },
    #[error("output error: {0}")]
    Output(String),
}

/// Tree-walking evaluator. Owns the built-in table and the sink that
/// `print`/`println` write to; scopes are passed in per call so a REPL can
/// keep one environment alive across inputs.
pub struct Evaluator {
    builtins: Builtins,
    output: Rc<Output>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_output(Rc::new(Output::stdout()))
    }

    pub fn with_output(output: Rc<Output>) -> Self {
        Self::with_builtins(Builtins::standard(), output)
    }

    pub fn with_builtins(builtins: Builtins, output: Rc<Output>) -> Self {
        Self { builtins, output }
    }

    /// Evaluates a whole program. Runtime errors come back as
    /// `Object::Error`; `None` means the last statement produced no value.
    pub fn eval(&self, program: &Program, env: &MutEnv) -> Option<Object> {
        match self.eval_program(program, env) {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(error = %err, "runtime error");
                Some(Object::Error(err))
            }
        }
    }

    fn eval_program(&self, program: &Program, env: &MutEnv) -> R<Option<Object>> {
        let mut result = None;

        for stmt in &program.statements {
            match self.eval_statement(stmt, env)? {
                Some(Object::Return(value)) => return Ok(Some(*value)),
                other => result = other,
            }
        }

        Ok(result)
    }

    // A `Return` stays wrapped here so the enclosing call can tell an early
    // return from falling off the end of the block.
    fn eval_block_statement(&self, block: &BlockStatement, env: &MutEnv) -> R<Object> {
        let mut result = Object::Void;

        for stmt in &block.statements {
            match self.eval_statement(stmt, env)? {
                Some(returned @ Object::Return(_)) => return Ok(returned),
                Some(object) => result = object,
                None => result = Object::Void,
            }
        }

        Ok(result)
    }

    fn eval_statement(&self, statement: &Statement, env: &MutEnv) -> R<Option<Object>> {
        match statement {
            Statement::Expression { value, .. } => self.eval_expression(value, env).map(Some),
            Statement::Return { value, .. } => {
                let value = self.eval_expression(value, env)?;
                Ok(Some(Object::Return(Box::new(value))))
            }
            Statement::Let { name, value, .. } => {
                let value = self.eval_expression(value, env)?;
                env.borrow_mut().set(&name.name, value);
                Ok(None)
            }
        }
    }

    fn eval_expression(&self, expression: &Expression, env: &MutEnv) -> R<Object> {
        match expression {
            Expression::Integer { value, .. } => Ok(Object::Integer(*value)),
            Expression::Boolean { value, .. } => Ok(Object::from_native_bool(*value)),
            Expression::Str { value, .. } => Ok(Object::Str(value.clone())),
            Expression::Identifier(ident) => self.eval_identifier(ident, env),
            Expression::Prefix {
                operator, right, ..
            } => {
                let right = self.eval_expression(right, env)?;
                eval_prefix_expression(operator, right)
            }
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                eval_infix_expression(operator, left, right)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expression(condition, env)?;
                if condition.is_truthy() {
                    self.eval_block_statement(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block_statement(alternative, env)
                } else {
                    Ok(NULL)
                }
            }
            Expression::Function {
                parameters, body, ..
            } => Ok(Object::Function {
                parameters: Rc::clone(parameters),
                body: Rc::clone(body),
                env: Rc::clone(env),
            }),
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                tracing::trace!(callee = %function.token(), "call");
                let function = self.eval_expression(function, env)?;
                let arguments = self.eval_expressions(arguments, env)?;
                self.apply_function(function, arguments)
            }
            Expression::Array { elements, .. } => {
                Ok(Object::Array(self.eval_expressions(elements, env)?))
            }
            Expression::Index { left, index, .. } => {
                let left = self.eval_expression(left, env)?;
                let index = self.eval_expression(index, env)?;
                eval_index_expression(left, index)
            }
        }
    }

    /// Left to right, stopping at the first error.
    fn eval_expressions(&self, expressions: &[Expression], env: &MutEnv) -> R<Vec<Object>> {
        expressions
            .iter()
            .map(|expression| self.eval_expression(expression, env))
            .collect()
    }

    fn eval_identifier(&self, ident: &Identifier, env: &MutEnv) -> R<Object> {
        if let Some(value) = env.borrow().get(&ident.name) {
            return Ok(value);
        }

        self.builtins
            .get(&ident.name)
            .ok_or_else(|| EvaluatorError::IdentifierNotFound(ident.name.clone()))
    }

    fn apply_function(&self, function: Object, arguments: Vec<Object>) -> R<Object> {
        match function {
            Object::Function {
                parameters,
                body,
                env,
            } => {
                tracing::trace!(
                    parameters = parameters.len(),
                    arguments = arguments.len(),
                    "applying function"
                );
                let extended = extend_function_env(&parameters, env, arguments)?;
                let evaluated = self.eval_block_statement(&body, &extended)?;
                Ok(unwrap_return_value(evaluated))
            }
            Object::Builtin { name, function } => {
                tracing::trace!(builtin = name, arguments = arguments.len(), "calling builtin");
                function(&arguments, &self.output)
            }
            other => Err(EvaluatorError::NotAFunction(other.object_type())),
        }
    }
}

// Missing arguments are an error; surplus arguments are evaluated and then
// dropped.
fn extend_function_env(
    parameters: &[Identifier],
    env: MutEnv,
    arguments: Vec<Object>,
) -> R<MutEnv> {
    if arguments.len() < parameters.len() {
        return Err(EvaluatorError::WrongNumberOfArguments {
            got: arguments.len(),
            want: parameters.len(),
        });
    }

    let extended = Environment::new_enclosed(env);
    {
        let mut scope = extended.borrow_mut();
        for (param, arg) in parameters.iter().zip(arguments) {
            scope.set(&param.name, arg);
        }
    }

    Ok(extended)
}

fn unwrap_return_value(object: Object) -> Object {
    match object {
        Object::Return(value) => *value,
        other => other,
    }
}

fn eval_prefix_expression(operator: &str, right: Object) -> R<Object> {
    match operator {
        "!" => Ok(Object::from_native_bool(!right.is_truthy())),
        "-" => match right {
            Object::Integer(value) => value.checked_neg().map(Object::Integer).ok_or_else(|| {
                EvaluatorError::IntegerOverflow {
                    left: 0,
                    operator: "-".into(),
                    right: value,
                }
            }),
            other => Err(EvaluatorError::UnknownPrefixOperator {
                operator: operator.into(),
                right: other.object_type(),
            }),
        },
        _ => Err(EvaluatorError::UnknownPrefixOperator {
            operator: operator.into(),
            right: right.object_type(),
        }),
    }
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> R<Object> {
    if left.object_type() != right.object_type() {
        return Err(EvaluatorError::TypeMismatch {
            left: left.object_type(),
            operator: operator.into(),
            right: right.object_type(),
        });
    }

    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Object::Str(l), Object::Str(r)) => match operator {
            "+" => Ok(Object::Str(format!("{}{}", l, r))),
            _ => Err(unknown_infix_operator(operator, &left, &right)),
        },
        _ => match operator {
            "==" => Ok(Object::from_native_bool(left == right)),
            "!=" => Ok(Object::from_native_bool(left != right)),
            _ => Err(unknown_infix_operator(operator, &left, &right)),
        },
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> R<Object> {
    let overflow = || EvaluatorError::IntegerOverflow {
        left,
        operator: operator.into(),
        right,
    };

    let value = match operator {
        "+" => left.checked_add(right).ok_or_else(overflow)?,
        "-" => left.checked_sub(right).ok_or_else(overflow)?,
        "*" => left.checked_mul(right).ok_or_else(overflow)?,
        "/" => {
            if right == 0 {
                return Err(EvaluatorError::DivisionByZero);
            }
            left.checked_div(right).ok_or_else(overflow)?
        }
        "<" => return Ok(Object::from_native_bool(left < right)),
        ">" => return Ok(Object::from_native_bool(left > right)),
        "==" => return Ok(Object::from_native_bool(left == right)),
        "!=" => return Ok(Object::from_native_bool(left != right)),
        _ => {
            return Err(EvaluatorError::UnknownInfixOperator {
                left: ObjectType::Integer,
                operator: operator.into(),
                right: ObjectType::Integer,
            })
        }
    };

    Ok(Object::Integer(value))
}

fn unknown_infix_operator(operator: &str, left: &Object, right: &Object) -> EvaluatorError {
    EvaluatorError::UnknownInfixOperator {
        left: left.object_type(),
        operator: operator.into(),
        right: right.object_type(),
    }
}

// Out-of-range indexes yield `null` rather than an error.
fn eval_index_expression(left: Object, index: Object) -> R<Object> {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(i)
            .ok()
            .and_then(|i| elements.get(i).cloned())
            .unwrap_or(NULL)),
        (left, _) => Err(EvaluatorError::IndexNotSupported(left.object_type())),
    }
}
