//! Runtime values

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHasher};

use crate::{
    eval::env::SharedEnv,
    syntax::ast::{Block, Expr},
};

/// Signature shared by all built-in functions. Argument errors come back as
/// [`Value::Error`], same as every other runtime error.
pub type BuiltinFn = fn(Vec<Value>) -> Value;

/// Every value the interpreter can produce.
///
/// `Return` and `Error` are ordinary values that bubble up through statement
/// lists until something unwraps or reports them. There are no exceptions.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Null,
    Str(String),
    Array(Vec<Value>),
    /// Pairs are keyed by [`HashKey`] but keep the original key value around
    /// for display.
    Hash(FxHashMap<HashKey, (Value, Value)>),
    Func {
        params: Vec<String>,
        body: Block,
        env: SharedEnv,
    },
    Builtin(BuiltinFn),
    Return(Box<Value>),
    Error(String),
    /// An AST fragment produced by `quote`
    Quote(Expr),
    Macro {
        params: Vec<String>,
        body: Block,
        env: SharedEnv,
    },
}

/// Hashable projection of a value, used as the key type of hash literals.
/// Strings hash to an `FxHasher` digest instead of carrying the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKey {
    Int(i64),
    Bool(bool),
    Str(u64),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INTEGER",
            Value::Bool(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Str(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Func { .. } => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
            Value::Quote(_) => "QUOTE",
            Value::Macro { .. } => "MACRO",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Everything but `false` and `null` is truthy, `0` and `""` included.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Null)
    }

    /// `Some` for the three hashable types, `None` for everything else
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(v) => Some(HashKey::Int(*v)),
            Value::Bool(v) => Some(HashKey::Bool(*v)),
            Value::Str(s) => {
                let mut hasher = FxHasher::default();
                s.hash(&mut hasher);
                Some(HashKey::Str(hasher.finish()))
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Structural equality, except that functions and macros compare their
    /// captured environment by pointer. Environments can contain the closure
    /// that captured them, so comparing them by value would not terminate.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (
                Value::Func {
                    params: ap,
                    body: ab,
                    env: ae,
                },
                Value::Func {
                    params: bp,
                    body: bb,
                    env: be,
                },
            )
            | (
                Value::Macro {
                    params: ap,
                    body: ab,
                    env: ae,
                },
                Value::Macro {
                    params: bp,
                    body: bb,
                    env: be,
                },
            ) => ap == bp && ab == bb && std::rc::Rc::ptr_eq(ae, be),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Return(a), Value::Return(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Quote(a), Value::Quote(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    /// Like the derived impl, but functions and macros omit their environment
    /// (which may cyclically contain them).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Null => f.write_str("Null"),
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Value::Hash(v) => f.debug_tuple("Hash").field(v).finish(),
            Value::Func { params, body, .. } => f
                .debug_struct("Func")
                .field("params", params)
                .field("body", body)
                .finish_non_exhaustive(),
            Value::Builtin(_) => f.write_str("Builtin(..)"),
            Value::Return(v) => f.debug_tuple("Return").field(v).finish(),
            Value::Error(v) => f.debug_tuple("Error").field(v).finish(),
            Value::Quote(v) => f.debug_tuple("Quote").field(v).finish(),
            Value::Macro { params, body, .. } => f
                .debug_struct("Macro")
                .field("params", params)
                .field("body", body)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Null => f.write_str("null"),
            Value::Str(v) => f.write_str(v),
            Value::Array(elems) => write!(f, "[{}]", elems.iter().join(", ")),
            Value::Hash(pairs) => {
                let pairs = pairs
                    .values()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Value::Func { params, body, .. } => {
                write!(f, "fn({}) {{\n{}\n}}", params.iter().join(", "), body)
            }
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Return(v) => write!(f, "{}", v),
            Value::Error(msg) => write!(f, "ERROR: {}", msg),
            Value::Quote(node) => write!(f, "QUOTE({})", node),
            Value::Macro { params, body, .. } => {
                write!(f, "macro({}) {{\n{}\n}}", params.iter().join(", "), body)
            }
        }
    }
}
