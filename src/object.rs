use std::{fmt::Display, rc::Rc};

use crate::{
    ast::{csv_str, BlockStatement, Identifier},
    evaluator::EvaluatorError,
};

use self::{builtin::BuiltinFunction, environment::MutEnv};

pub mod builtin;
pub mod environment;
pub mod output;

/// Runtime type tag, rendered in error messages.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ObjectType {
    Integer,
    Str,
    Boolean,
    Array,
    Function,
    Builtin,
    ReturnValue,
    Error,
    Null,
    Void,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Str => "STRING",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Array => "ARRAY",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
            ObjectType::Null => "NULL",
            ObjectType::Void => "VOID",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Array(Vec<Object>),
    Function {
        parameters: Rc<[Identifier]>,
        body: Rc<BlockStatement>,
        env: MutEnv,
    },
    Builtin {
        name: &'static str,
        function: BuiltinFunction,
    },
    Return(Box<Object>),
    Error(EvaluatorError),
    Null,
    Void,
}

impl Object {
    pub fn from_native_bool(b: bool) -> Object {
        if b {
            TRUE
        } else {
            FALSE
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Str(_) => ObjectType::Str,
            Object::Array(_) => ObjectType::Array,
            Object::Function { .. } => ObjectType::Function,
            Object::Builtin { .. } => ObjectType::Builtin,
            Object::Return(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
            Object::Null => ObjectType::Null,
            Object::Void => ObjectType::Void,
        }
    }

    pub fn inspect(&self) -> String {
        self.to_string()
    }

    /// `null` and `false` are falsy, everything else (including `0`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }
}

// Functions compare by identity: same body node and same captured scope.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (
                Object::Function { body: a, env: ea, .. },
                Object::Function { body: b, env: eb, .. },
            ) => Rc::ptr_eq(a, b) && Rc::ptr_eq(ea, eb),
            (Object::Builtin { name: a, .. }, Object::Builtin { name: b, .. }) => a == b,
            (Object::Return(a), Object::Return(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::Null, Object::Null) | (Object::Void, Object::Void) => true,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Object::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Object::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Object::Array(elements) => f.debug_tuple("Array").field(elements).finish(),
            // The captured environment may contain this very function.
            Object::Function { .. } => write!(f, "Function({})", self),
            Object::Builtin { name, .. } => f.debug_tuple("Builtin").field(name).finish(),
            Object::Return(object) => f.debug_tuple("Return").field(object).finish(),
            Object::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Object::Null => f.write_str("Null"),
            Object::Void => f.write_str("Void"),
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(i) => write!(f, "{}", i),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::Str(s) => f.write_str(s),
            Object::Array(e) => write!(f, "[{}]", csv_str(e)),
            Object::Function {
                parameters,
                body,
                env: _,
            } => write!(f, "fn({}) {{\n{}\n}}", csv_str(parameters), body),
            Object::Builtin { name, .. } => write!(f, "builtin function: {}", name),
            Object::Return(object) => write!(f, "{}", object),
            Object::Error(err) => write!(f, "ERROR: {}", err),
            Object::Null => f.write_str("null"),
            Object::Void => Ok(()),
        }
    }
}

pub const NULL: Object = Object::Null;
pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
